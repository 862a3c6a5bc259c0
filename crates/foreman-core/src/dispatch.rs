//! Command dispatch: from player text to queued tasks.
//!
//! [`Commander::dispatch`] runs the whole planning pipeline for one
//! command and one agent: snapshot the world, compose the prompt, ask the
//! backend (bounded by the LLM timeout), parse and validate, enqueue. No
//! failure along the way is fatal. A slow, failing, or nonsensical
//! backend produces an empty plan and a diagnostic, and the agent is
//! ready for the next command.

use std::sync::Arc;
use std::time::Duration;

use foreman_agents::{AgentError, AgentHandle};
use foreman_planner::{
    CompletionBackend, ParsedPlan, PlanError, PromptComposer, RenderedPrompt, TaskRejection, parse,
};
use foreman_types::{AgentId, Command, CommandId, TaskPlan};
use foreman_world::WorldKnowledge;
use tracing::{debug, info, warn};

/// What happened to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    /// The command.
    pub command: CommandId,
    /// The agent it was sent to.
    pub agent: AgentId,
    /// The validated plan. Empty when the response was unusable.
    pub plan: TaskPlan,
    /// Tasks appended to the agent's queue.
    pub enqueued: usize,
    /// Tasks dropped by validation.
    pub rejections: Vec<TaskRejection>,
    /// Why no plan could be read at all, if that happened.
    pub diagnostic: Option<PlanError>,
    /// Set when the agent could not take the tasks.
    pub refused: Option<AgentError>,
}

impl std::fmt::Display for CommandReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(refused) = &self.refused {
            return write!(f, "refused: {refused}");
        }
        if let Some(diagnostic) = &self.diagnostic {
            return write!(f, "no plan: {diagnostic}");
        }
        write!(f, "{} task(s) queued", self.enqueued)?;
        if !self.plan.summary.is_empty() {
            write!(f, " ({})", self.plan.summary)?;
        }
        if !self.rejections.is_empty() {
            write!(f, ", {} dropped", self.rejections.len())?;
        }
        Ok(())
    }
}

/// Runs the planning pipeline against one backend.
pub struct Commander<B: CompletionBackend> {
    backend: B,
    composer: PromptComposer,
    knowledge: Arc<dyn WorldKnowledge>,
    llm_timeout: Duration,
}

impl<B: CompletionBackend> Commander<B> {
    /// Create a commander.
    pub fn new(
        backend: B,
        composer: PromptComposer,
        knowledge: Arc<dyn WorldKnowledge>,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            composer,
            knowledge,
            llm_timeout,
        }
    }

    /// The backend in use.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Plan `command` for `agent` and queue the valid tasks in order.
    pub async fn dispatch(&self, agent: &AgentHandle, command: &Command) -> CommandReport {
        let mut report = CommandReport {
            command: command.id,
            agent: agent.id(),
            plan: TaskPlan::empty(),
            enqueued: 0,
            rejections: Vec::new(),
            diagnostic: None,
            refused: None,
        };

        if agent.is_despawned() {
            report.refused = Some(AgentError::Despawned(agent.id()));
            return report;
        }

        let snapshot = self.knowledge.snapshot(agent.id());
        let prompt = self.composer.compose(command, &snapshot);
        debug!(
            command_id = %command.id,
            agent = agent.name(),
            backend = self.backend.name(),
            "requesting plan"
        );

        let parsed = match self.request(&prompt).await.and_then(|raw| parse(&raw)) {
            Ok(parsed) => parsed,
            Err(diagnostic) => {
                warn!(
                    command_id = %command.id,
                    agent = agent.name(),
                    diagnostic = %diagnostic,
                    "no usable plan"
                );
                report.diagnostic = Some(diagnostic);
                ParsedPlan::default()
            }
        };
        report.rejections = parsed.rejections;
        report.plan = parsed.plan;

        if !report.plan.tasks.is_empty() {
            match agent.enqueue(report.plan.tasks.iter().cloned()) {
                Ok(added) => report.enqueued = added,
                Err(e) => {
                    warn!(command_id = %command.id, agent = agent.name(), error = %e, "agent refused plan");
                    report.refused = Some(e);
                }
            }
        }

        info!(
            command_id = %command.id,
            agent = agent.name(),
            command = %command.text,
            enqueued = report.enqueued,
            rejected = report.rejections.len(),
            "command dispatched"
        );
        report
    }

    /// Ask the backend, bounded by the LLM timeout.
    async fn request(&self, prompt: &RenderedPrompt) -> Result<String, PlanError> {
        match tokio::time::timeout(self.llm_timeout, self.backend.complete(prompt)).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(PlanError::malformed(format!("backend failed: {e}"))),
            Err(elapsed) => Err(PlanError::malformed(format!(
                "no response within {} ms ({elapsed})",
                self.llm_timeout.as_millis()
            ))),
        }
    }
}
