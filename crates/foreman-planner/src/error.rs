//! Error types for the planner.
//!
//! [`PlannerError`] covers infrastructure: templates, configuration, and
//! the LLM call. [`PlanError`] covers the content of a response and is
//! reported per plan or per task; it never aborts the process.

use foreman_types::TaskKind;

/// Errors raised while building prompts or talking to an LLM backend.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// A prompt template could not be loaded, compiled, or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Reading a template file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a response, or one task inside it, was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The response is not a single JSON object with a `tasks` array.
    ///
    /// Also used when no response arrived in time.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// What was wrong with the response.
        reason: String,
    },

    /// A task carried an action tag outside the task vocabulary.
    #[error("unknown action type `{action}`")]
    UnknownActionType {
        /// The tag as it appeared in the response.
        action: String,
    },

    /// A task's parameters failed validation.
    #[error("invalid {action} parameter: {reason}")]
    InvalidTaskParameter {
        /// The task kind whose parameters were rejected.
        action: TaskKind,
        /// Which parameter failed and how.
        reason: String,
    },
}

impl PlanError {
    /// Shorthand for [`PlanError::MalformedResponse`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`PlanError::InvalidTaskParameter`].
    pub fn invalid(action: TaskKind, reason: impl Into<String>) -> Self {
        Self::InvalidTaskParameter {
            action,
            reason: reason.into(),
        }
    }
}
