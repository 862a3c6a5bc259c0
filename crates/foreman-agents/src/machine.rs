//! The task execution state machine.
//!
//! ```text
//!            Start              Complete
//!   Idle ───────────▶ Executing ─────────▶ Succeeded ─┐
//!    ▲                    │                            │
//!    │                    └──────────────▶ Failed ─────┤ Settle
//!    │                       Fail                      │
//!    └─────────────────────────────────────────────────┘
//! ```
//!
//! `Abort` returns any state to `Idle`; it is applied on despawn.

use crate::error::AgentError;

/// Run state of one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Waiting for work.
    #[default]
    Idle,
    /// Running the current task.
    Executing,
    /// The last task finished successfully.
    Succeeded,
    /// The last task failed.
    Failed,
}

/// Something that happened to the current task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskEvent {
    /// A task was taken from the queue.
    Start,
    /// The task completed.
    Complete,
    /// The task failed.
    Fail,
    /// The outcome was recorded; ready for the next task.
    Settle,
    /// The agent was despawned.
    Abort,
}

impl RunState {
    /// Apply `event`, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidTransition`] for an event the current
    /// state does not accept.
    pub const fn transition(self, event: TaskEvent) -> Result<Self, AgentError> {
        match (self, event) {
            (Self::Idle, TaskEvent::Start) => Ok(Self::Executing),
            (Self::Executing, TaskEvent::Complete) => Ok(Self::Succeeded),
            (Self::Executing, TaskEvent::Fail) => Ok(Self::Failed),
            (Self::Succeeded | Self::Failed | Self::Idle, TaskEvent::Settle)
            | (_, TaskEvent::Abort) => Ok(Self::Idle),
            (from, event) => Err(AgentError::InvalidTransition { from, event }),
        }
    }

    /// Whether a task is in flight.
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Executing)
    }

    /// Lowercase label for logs and status output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
