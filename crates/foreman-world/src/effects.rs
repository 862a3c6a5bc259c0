//! Traits implemented by the host world.
//!
//! The engine never performs world mechanics itself. It senses through
//! [`WorldKnowledge`] and acts through [`WorldEffects`], and it never
//! inspects how an effect is carried out. A game integration implements
//! both traits; tests implement them with scripted fakes.

use std::future::Future;

use foreman_types::{AgentId, BlockPos, SituationSnapshot, Task};

/// The world host could not carry out an effect.
///
/// The reason is free text reported by the host (target lost, path
/// unreachable, inventory full, ...). It is recorded on the task and
/// shown to the player; the engine does not branch on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct EffectFailure {
    /// Host-supplied description of what went wrong.
    pub reason: String,
}

impl EffectFailure {
    /// Create a failure with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Read-only view of the world around an agent.
pub trait WorldKnowledge: Send + Sync {
    /// Take a fresh snapshot of `agent`'s surroundings.
    ///
    /// For an agent the host does not know about, implementations return
    /// a default snapshot rather than failing.
    fn snapshot(&self, agent: AgentId) -> SituationSnapshot;
}

/// World-mutating operations.
///
/// [`perform`](Self::perform) starts an effect and resolves once the host
/// reports completion or failure. Dropping the returned future cancels
/// the effect; hosts must tolerate that at any await point.
pub trait WorldEffects: Send + Sync + 'static {
    /// Place an agent entity in the world.
    ///
    /// # Errors
    ///
    /// Returns [`EffectFailure`] if the host could not spawn the entity.
    fn spawn_agent(
        &self,
        agent: AgentId,
        name: &str,
        position: BlockPos,
    ) -> Result<(), EffectFailure>;

    /// Remove an agent entity from the world. Unknown agents are ignored.
    fn despawn_agent(&self, agent: AgentId);

    /// Carry out one validated task.
    ///
    /// `origin` is the derived build origin for Build tasks and the
    /// agent's current position for every other kind.
    fn perform(
        &self,
        agent: AgentId,
        task: &Task,
        origin: BlockPos,
    ) -> impl Future<Output = Result<(), EffectFailure>> + Send;
}
