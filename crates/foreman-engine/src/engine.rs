//! The running engine: one simulated world, one fleet, one player session.
//!
//! [`Engine::handle`] executes a parsed console line and returns the text
//! to show the operator. Commands addressed to `all` are planned for
//! every agent concurrently.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use foreman_agents::AgentHandle;
use foreman_core::{
    Anchor, CommandReport, Commander, Facing, FleetConfig, FleetManager, FleetSection, Session,
    formation,
};
use foreman_planner::PromptComposer;
use foreman_types::Command;
use foreman_world::{StructureRegistry, WorldKnowledge};
use futures::future::join_all;
use tracing::info;

use crate::console::{ConsoleInput, HELP, Target};
use crate::error::EngineError;
use crate::offline::EngineBackend;
use crate::sim::SimulatedWorld;

/// What the console should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Print this text and read the next line.
    Reply(String),
    /// Stop reading input.
    Quit,
}

/// All long-lived engine state.
pub struct Engine {
    world: Arc<SimulatedWorld>,
    fleet: FleetManager<SimulatedWorld>,
    session: Session,
    commander: Commander<EngineBackend>,
    fleet_section: FleetSection,
    anchor: Anchor,
}

impl Engine {
    /// Wire the world, fleet and planner together. No agents exist until
    /// the player joins.
    pub fn new(
        config: &FleetConfig,
        world: Arc<SimulatedWorld>,
        backend: EngineBackend,
        composer: PromptComposer,
        llm_timeout: Duration,
    ) -> Self {
        let knowledge: Arc<dyn WorldKnowledge> = Arc::<SimulatedWorld>::clone(&world);
        let fleet = FleetManager::new(
            Arc::clone(&world),
            Arc::clone(&knowledge),
            Arc::new(StructureRegistry::new()),
            config.runtime_config(),
        );
        let commander = Commander::new(backend, composer, knowledge, llm_timeout);
        let anchor = Anchor {
            position: world.player_position(),
            facing: Facing::default(),
        };
        Self {
            world,
            fleet,
            session: Session::new(config.fleet.clone()),
            commander,
            fleet_section: config.fleet.clone(),
            anchor,
        }
    }

    /// Execute one console line.
    pub async fn handle(&mut self, input: ConsoleInput) -> Result<Flow, EngineError> {
        let reply = match input {
            ConsoleInput::Empty => String::new(),
            ConsoleInput::Say { target, text } => {
                let reports = self.command(&target, &text).await?;
                reports
                    .iter()
                    .map(|(name, report)| format!("{name}: {report}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            ConsoleInput::Status => self.status(),
            ConsoleInput::Reset => {
                let spawned = self.reset()?;
                format!("fleet reset, {spawned} agent(s) spawned")
            }
            ConsoleInput::Join => match self.join()? {
                Some(spawned) => format!("player joined, {spawned} agent(s) spawned"),
                None => "player rejoined, fleet unchanged".to_owned(),
            },
            ConsoleInput::Leave => {
                let removed = self.leave();
                format!("player left, {removed} agent(s) removed")
            }
            ConsoleInput::Help => HELP.to_owned(),
            ConsoleInput::Quit => return Ok(Flow::Quit),
        };
        Ok(Flow::Reply(reply))
    }

    /// The player joins. Returns how many agents were spawned, or `None`
    /// if this session already has its fleet.
    pub fn join(&mut self) -> Result<Option<usize>, EngineError> {
        let spawned = self.session.on_player_joined(&mut self.fleet, self.anchor)?;
        Ok(spawned.map(|ids| ids.len()))
    }

    /// The player leaves and the fleet is torn down.
    pub fn leave(&mut self) -> usize {
        self.session.on_player_left(&mut self.fleet)
    }

    /// Respawn the configured fleet in formation in front of the player.
    pub fn reset(&mut self) -> Result<usize, EngineError> {
        let specs = formation(
            self.anchor,
            &self.fleet_section.names,
            self.fleet_section.spawn_distance,
            self.fleet_section.spacing,
        )?;
        let ids = self.fleet.reset_fleet(&specs)?;
        info!(agents = ids.len(), "fleet reset from console");
        Ok(ids.len())
    }

    /// Plan `text` for the addressed agents and queue the results.
    ///
    /// Returns one report per agent, in fleet order.
    pub async fn command(
        &self,
        target: &Target,
        text: &str,
    ) -> Result<Vec<(String, CommandReport)>, EngineError> {
        if self.fleet.is_empty() {
            return Err(EngineError::NoFleet);
        }
        let agents: Vec<&AgentHandle> = match target {
            Target::All => self.fleet.agents().iter().collect(),
            Target::Agent(name) => vec![self.fleet.agent_by_name(name).ok_or_else(|| {
                EngineError::UnknownAgent { name: name.clone() }
            })?],
        };

        let commands: Vec<Command> = agents
            .iter()
            .map(|_| Command::new(self.world.player(), text))
            .collect();
        let reports = join_all(
            agents
                .iter()
                .zip(&commands)
                .map(|(agent, command)| self.commander.dispatch(agent, command)),
        )
        .await;

        Ok(agents
            .iter()
            .map(|agent| agent.name().to_owned())
            .zip(reports)
            .collect())
    }

    /// One line per agent plus the live reservations.
    pub fn status(&self) -> String {
        if self.fleet.is_empty() {
            return "no agents".to_owned();
        }
        let mut out = format!("{} agent(s) in the world\n", self.world.population());
        for agent in self.fleet.agents() {
            let status = agent.status();
            let _ = write!(out, "{:<10} {:<9}", status.name, status.state.as_str());
            if let Some(position) = self.world.position_of(status.id) {
                let _ = write!(out, " at {position}");
            }
            if let Some(task) = &status.current {
                let _ = write!(out, " {task}");
            }
            if status.queued > 0 {
                let _ = write!(out, " (+{} queued)", status.queued);
            }
            if let Some(failure) = &status.last_failure {
                let _ = write!(out, " last failure: {failure}");
            }
            out.push('\n');
        }
        let reservations = self.fleet.registry().reservations();
        let _ = write!(out, "{} reservation(s)", reservations.len());
        for reservation in reservations {
            let _ = write!(out, "\n  {} {}", reservation.structure, reservation.volume);
        }
        out
    }
}
