//! The fleet: every live agent runtime, managed as a unit.
//!
//! [`FleetManager::reset_fleet`] is the only way agents come into being.
//! It tears down whatever is running, clears the structure registry, and
//! spawns a fresh runtime per [`SpawnSpec`]. It is safe to call with no
//! agents alive and safe to call repeatedly.

use std::collections::BTreeSet;
use std::sync::Arc;

use foreman_agents::{AgentHandle, AgentRuntime, RuntimeConfig};
use foreman_types::{AgentId, BlockPos};
use foreman_world::{StructureRegistry, WorldEffects, WorldKnowledge};
use tracing::{info, warn};

use crate::error::FleetError;

/// Who to spawn and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    /// Display name, unique within the fleet.
    pub name: String,
    /// Where the world should place the agent.
    pub position: BlockPos,
}

impl SpawnSpec {
    /// Create a spawn spec.
    pub fn new(name: impl Into<String>, position: BlockPos) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Owns every live agent and the shared registry they build against.
pub struct FleetManager<E: WorldEffects> {
    world: Arc<E>,
    knowledge: Arc<dyn WorldKnowledge>,
    registry: Arc<StructureRegistry>,
    runtime: RuntimeConfig,
    agents: Vec<AgentHandle>,
}

impl<E: WorldEffects> FleetManager<E> {
    /// Create an empty fleet.
    pub fn new(
        world: Arc<E>,
        knowledge: Arc<dyn WorldKnowledge>,
        registry: Arc<StructureRegistry>,
        runtime: RuntimeConfig,
    ) -> Self {
        Self {
            world,
            knowledge,
            registry,
            runtime,
            agents: Vec::new(),
        }
    }

    /// Replace the whole fleet.
    ///
    /// Every running agent is despawned (queued and in-flight work is
    /// discarded) and removed from the world, the registry is cleared,
    /// then one agent is spawned per spec, in order. A spec the world
    /// refuses to spawn is skipped with a warning; the others proceed.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::EmptyName`] or [`FleetError::DuplicateName`]
    /// before anything is torn down.
    pub fn reset_fleet(&mut self, specs: &[SpawnSpec]) -> Result<Vec<AgentId>, FleetError> {
        validate_names(specs)?;

        let removed = self.teardown();
        let cleared = self.registry.clear_all();

        let mut spawned = Vec::with_capacity(specs.len());
        for spec in specs {
            let id = AgentId::new();
            let name = spec.name.trim();
            if let Err(e) = self.world.spawn_agent(id, name, spec.position) {
                warn!(agent = name, position = %spec.position, error = %e, "world refused to spawn agent");
                continue;
            }
            let handle = AgentRuntime::spawn(
                id,
                name,
                Arc::clone(&self.world),
                Arc::clone(&self.knowledge),
                Arc::clone(&self.registry),
                self.runtime,
            );
            self.agents.push(handle);
            spawned.push(id);
        }

        info!(
            removed,
            cleared_reservations = cleared,
            spawned = spawned.len(),
            "fleet reset"
        );
        Ok(spawned)
    }

    /// Despawn every agent. Returns how many were removed.
    pub fn teardown(&mut self) -> usize {
        let agents = std::mem::take(&mut self.agents);
        for agent in &agents {
            agent.despawn();
            self.registry.release_agent(agent.id());
            self.world.despawn_agent(agent.id());
        }
        agents.len()
    }

    /// Look up an agent by ID.
    pub fn agent(&self, id: AgentId) -> Option<&AgentHandle> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Look up an agent by display name, ignoring case.
    pub fn agent_by_name(&self, name: &str) -> Option<&AgentHandle> {
        let name = name.trim();
        self.agents
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Every live agent, in spawn order.
    pub fn agents(&self) -> &[AgentHandle] {
        &self.agents
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the fleet is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The registry shared by every agent.
    pub const fn registry(&self) -> &Arc<StructureRegistry> {
        &self.registry
    }

    /// The world view shared by every agent.
    pub const fn knowledge(&self) -> &Arc<dyn WorldKnowledge> {
        &self.knowledge
    }
}

impl<E: WorldEffects> Drop for FleetManager<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Reject blank or repeated names.
fn validate_names(specs: &[SpawnSpec]) -> Result<(), FleetError> {
    let mut seen = BTreeSet::new();
    for spec in specs {
        let name = spec.name.trim();
        if name.is_empty() {
            return Err(FleetError::EmptyName);
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(FleetError::DuplicateName(name.to_owned()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_compared_case_insensitively() {
        let specs = [
            SpawnSpec::new("Steve", BlockPos::default()),
            SpawnSpec::new("steve ", BlockPos::default()),
        ];
        assert_eq!(
            validate_names(&specs),
            Err(FleetError::DuplicateName("steve".to_owned()))
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        let specs = [SpawnSpec::new("  ", BlockPos::default())];
        assert_eq!(validate_names(&specs), Err(FleetError::EmptyName));
    }

    #[test]
    fn distinct_names_pass() {
        let specs = [
            SpawnSpec::new("Steve", BlockPos::default()),
            SpawnSpec::new("Alex", BlockPos::default()),
        ];
        assert_eq!(validate_names(&specs), Ok(()));
        assert_eq!(validate_names(&[]), Ok(()));
    }
}
