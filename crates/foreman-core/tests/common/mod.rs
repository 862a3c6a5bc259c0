#![allow(dead_code, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use foreman_agents::RuntimeConfig;
use foreman_core::FleetManager;
use foreman_planner::{CompletionBackend, PlannerError, RenderedPrompt};
use foreman_types::{AgentId, BlockPos, SituationSnapshot, Task, TaskKind};
use foreman_world::{EffectFailure, StructureRegistry, WorldEffects, WorldKnowledge};

/// A world that records calls and hangs on chosen task kinds.
#[derive(Default)]
pub struct ScriptedWorld {
    pub spawned: Mutex<Vec<(AgentId, String, BlockPos)>>,
    pub despawned: Mutex<Vec<AgentId>>,
    pub performed: Mutex<Vec<(AgentId, Task)>>,
    pub hanging: Vec<TaskKind>,
}

impl ScriptedWorld {
    pub fn hanging(kinds: &[TaskKind]) -> Self {
        Self {
            hanging: kinds.to_vec(),
            ..Self::default()
        }
    }

    pub fn performed(&self) -> Vec<(AgentId, Task)> {
        self.performed.lock().unwrap().clone()
    }
}

impl WorldEffects for ScriptedWorld {
    fn spawn_agent(&self, agent: AgentId, name: &str, position: BlockPos) -> Result<(), EffectFailure> {
        self.spawned
            .lock()
            .unwrap()
            .push((agent, name.to_owned(), position));
        Ok(())
    }

    fn despawn_agent(&self, agent: AgentId) {
        self.despawned.lock().unwrap().push(agent);
    }

    async fn perform(
        &self,
        agent: AgentId,
        task: &Task,
        _origin: BlockPos,
    ) -> Result<(), EffectFailure> {
        self.performed.lock().unwrap().push((agent, task.clone()));
        tokio::task::yield_now().await;
        if self.hanging.contains(&task.kind()) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

/// Every agent stands on the same block.
pub struct SameSpot(pub BlockPos);

impl WorldKnowledge for SameSpot {
    fn snapshot(&self, _: AgentId) -> SituationSnapshot {
        SituationSnapshot {
            position: self.0,
            nearby_players: vec!["Alice".to_owned()],
            nearby_entities: "1 zombie".to_owned(),
            nearby_blocks: "grass".to_owned(),
            biome: "plains".to_owned(),
        }
    }
}

pub fn fleet(world: &Arc<ScriptedWorld>) -> FleetManager<ScriptedWorld> {
    FleetManager::new(
        Arc::clone(world),
        Arc::new(SameSpot(BlockPos::new(0, 64, 0))),
        Arc::new(StructureRegistry::new()),
        RuntimeConfig::default(),
    )
}

/// How the scripted backend answers.
pub enum Reply {
    Text(String),
    Fail,
    Hang,
}

/// Answers from a script, one reply per call; the last reply repeats.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    pub prompts: Mutex<Vec<RenderedPrompt>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn text(reply: &str) -> Self {
        Self::new(vec![Reply::Text(reply.to_owned())])
    }

    fn next_reply(&self) -> Option<Result<String, PlannerError>> {
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().map(|r| match r {
                Reply::Text(t) => Reply::Text(t.clone()),
                Reply::Fail => Reply::Fail,
                Reply::Hang => Reply::Hang,
            })
        };
        match reply {
            Some(Reply::Text(text)) => Some(Ok(text)),
            Some(Reply::Fail) | None => Some(Err(PlannerError::LlmBackend("503".to_owned()))),
            Some(Reply::Hang) => None,
        }
    }
}

impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, PlannerError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let reply = self.next_reply();
        match reply {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}
