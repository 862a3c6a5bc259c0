//! A simulated block world for running the engine without a game host.
//!
//! [`SimulatedWorld`] implements both world traits. Effects take a random
//! amount of (tokio) time and fail with a configurable probability, which
//! is enough to watch queues drain, reservations come and go, and failures
//! get recorded. Pathfind and Follow move the agent's body so later
//! snapshots and build origins reflect where it went.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use foreman_types::{AgentId, BlockPos, SituationSnapshot, Task};
use foreman_world::{EffectFailure, WorldEffects, WorldKnowledge};
use rand::Rng;
use tracing::{debug, info};

/// Default probability that an effect fails.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

/// Radius, in blocks on each axis, within which other agents are "nearby".
const NEARBY_RADIUS: u32 = 16;

/// An agent entity in the simulation.
#[derive(Debug, Clone)]
struct Body {
    name: String,
    position: BlockPos,
}

/// In-process world host.
#[derive(Debug)]
pub struct SimulatedWorld {
    player: String,
    player_position: BlockPos,
    failure_rate: f64,
    bodies: Mutex<BTreeMap<AgentId, Body>>,
}

impl SimulatedWorld {
    /// Create a world with one player standing at `player_position`.
    pub fn new(player: impl Into<String>, player_position: BlockPos) -> Self {
        Self {
            player: player.into(),
            player_position,
            failure_rate: DEFAULT_FAILURE_RATE,
            bodies: Mutex::new(BTreeMap::new()),
        }
    }

    /// Override the failure probability. Values outside `0.0..=1.0`
    /// disable failures.
    #[must_use]
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if (0.0..=1.0).contains(&rate) { rate } else { 0.0 };
        self
    }

    /// The simulated player's name.
    pub fn player(&self) -> &str {
        &self.player
    }

    /// Where the simulated player stands.
    pub const fn player_position(&self) -> BlockPos {
        self.player_position
    }

    /// Current position of an agent's body, if it is spawned.
    pub fn position_of(&self, agent: AgentId) -> Option<BlockPos> {
        self.bodies().get(&agent).map(|b| b.position)
    }

    /// Number of spawned bodies.
    pub fn population(&self) -> usize {
        self.bodies().len()
    }

    fn bodies(&self) -> MutexGuard<'_, BTreeMap<AgentId, Body>> {
        self.bodies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move a body, if it still exists.
    fn relocate(&self, agent: AgentId, position: BlockPos) {
        if let Some(body) = self.bodies().get_mut(&agent) {
            body.position = position;
        }
    }
}

/// How long a task keeps the agent busy, in milliseconds.
fn duration_range(task: &Task) -> std::ops::Range<u64> {
    match task {
        Task::Attack { .. } => 800..2_000,
        Task::Build(_) => 3_000..6_000,
        Task::Mine { .. } => 1_500..4_000,
        Task::Follow { .. } => 500..1_500,
        Task::Pathfind { .. } => 1_000..3_000,
    }
}

/// The reason a simulated effect gives up.
fn failure_reason(task: &Task) -> String {
    match task {
        Task::Attack { .. } => "no hostile mobs in range".to_owned(),
        Task::Build(build) => format!("ran out of {} materials", build.structure),
        Task::Mine { ore, .. } => format!("no {ore} ore found nearby"),
        Task::Follow { player } => format!("lost sight of {player}"),
        Task::Pathfind { target } => format!("no path to {target}"),
    }
}

impl WorldKnowledge for SimulatedWorld {
    fn snapshot(&self, agent: AgentId) -> SituationSnapshot {
        let bodies = self.bodies();
        let Some(me) = bodies.get(&agent) else {
            return SituationSnapshot::default();
        };

        let neighbours: Vec<&str> = bodies
            .iter()
            .filter(|(id, body)| {
                **id != agent
                    && body.position.x.abs_diff(me.position.x) <= NEARBY_RADIUS
                    && body.position.y.abs_diff(me.position.y) <= NEARBY_RADIUS
                    && body.position.z.abs_diff(me.position.z) <= NEARBY_RADIUS
            })
            .map(|(_, body)| body.name.as_str())
            .collect();
        let nearby_entities = if neighbours.is_empty() {
            "none".to_owned()
        } else {
            format!("{} agent(s): {}", neighbours.len(), neighbours.join(", "))
        };

        SituationSnapshot {
            position: me.position,
            nearby_players: vec![self.player.clone()],
            nearby_entities,
            nearby_blocks: "grass_block, dirt, stone, oak_log".to_owned(),
            biome: "plains".to_owned(),
        }
    }
}

impl WorldEffects for SimulatedWorld {
    fn spawn_agent(
        &self,
        agent: AgentId,
        name: &str,
        position: BlockPos,
    ) -> Result<(), EffectFailure> {
        self.bodies().insert(
            agent,
            Body {
                name: name.to_owned(),
                position,
            },
        );
        info!(agent_id = %agent, name, position = %position, "agent entity spawned");
        Ok(())
    }

    fn despawn_agent(&self, agent: AgentId) {
        if let Some(body) = self.bodies().remove(&agent) {
            info!(agent_id = %agent, name = %body.name, "agent entity removed");
        }
    }

    async fn perform(
        &self,
        agent: AgentId,
        task: &Task,
        origin: BlockPos,
    ) -> Result<(), EffectFailure> {
        let (millis, fails) = {
            let mut rng = rand::rng();
            (
                rng.random_range(duration_range(task)),
                rng.random_bool(self.failure_rate),
            )
        };
        debug!(agent_id = %agent, task = %task, origin = %origin, millis, "simulating effect");

        tokio::time::sleep(Duration::from_millis(millis)).await;

        if fails {
            return Err(EffectFailure::new(failure_reason(task)));
        }
        match task {
            Task::Pathfind { target } => self.relocate(agent, *target),
            Task::Follow { .. } => {
                if let Some(beside) = self.player_position.offset(1, 0, 1) {
                    self.relocate(agent, beside);
                }
            }
            Task::Attack { .. } | Task::Build(_) | Task::Mine { .. } => {}
        }
        info!(agent_id = %agent, task = %task, "effect completed");
        Ok(())
    }
}
