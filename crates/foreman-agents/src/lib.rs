//! Per-agent task execution for the Foreman fleet.
//!
//! Every agent runs as its own tokio task with a private FIFO queue of
//! validated [`Task`](foreman_types::Task)s. The crate provides:
//!
//! - [`machine`] -- the run-state machine ([`RunState`], [`TaskEvent`])
//! - [`runtime`] -- the worker ([`AgentRuntime`]) and its [`AgentHandle`]
//! - [`error`] -- [`AgentError`] and per-task [`TaskFailure`]

pub mod error;
pub mod machine;
pub mod runtime;

pub use error::{AgentError, TaskFailure};
pub use machine::{RunState, TaskEvent};
pub use runtime::{
    AgentHandle, AgentRuntime, AgentStatus, DEFAULT_HISTORY_LIMIT, RuntimeConfig, TaskRecord,
};
