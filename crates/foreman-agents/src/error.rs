//! Error types for the foreman-agents crate.
//!
//! [`AgentError`] is returned to callers of an agent handle. Failures of
//! individual tasks are not errors of the caller; they are recorded on
//! the agent as [`TaskFailure`] and the queue moves on.

use foreman_types::AgentId;
use foreman_world::{EffectFailure, ReservationConflict, WorldError};

use crate::machine::{RunState, TaskEvent};

/// Errors returned by agent handle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The agent was despawned and accepts no more work.
    #[error("agent {0} has been despawned")]
    Despawned(AgentId),

    /// A run-state transition that the state machine does not allow.
    #[error("invalid transition: {event:?} in state {from:?}")]
    InvalidTransition {
        /// State the agent was in.
        from: RunState,
        /// Event that was applied.
        event: TaskEvent,
    },
}

/// Why a task ended in [`RunState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskFailure {
    /// The build volume overlapped another agent's reservation.
    ///
    /// The world was never asked to build.
    #[error("spatial conflict: {0}")]
    SpatialConflict(#[from] ReservationConflict),

    /// The world could not carry out the task, or did not finish in time.
    #[error("execution failed: {reason}")]
    Execution {
        /// Reported reason.
        reason: String,
    },
}

impl From<EffectFailure> for TaskFailure {
    fn from(failure: EffectFailure) -> Self {
        Self::Execution {
            reason: failure.reason,
        }
    }
}

impl From<WorldError> for TaskFailure {
    fn from(error: WorldError) -> Self {
        Self::Execution {
            reason: error.to_string(),
        }
    }
}
