//! Planning for the Foreman agent fleet.
//!
//! Turns a player's command into a validated [`TaskPlan`]:
//!
//! 1. [`PromptComposer`] renders the command and the agent's situation.
//! 2. A [`CompletionBackend`] sends the prompt to a language model.
//! 3. [`parse`] strictly parses the response and validates every task.
//!
//! Nothing here touches agents or the world; the dispatcher in
//! `foreman-core` wires these steps to a runtime.
//!
//! [`TaskPlan`]: foreman_types::TaskPlan

pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;

pub use config::{BackendType, DEFAULT_LLM_TIMEOUT, LlmBackendConfig, PlannerConfig};
pub use error::{PlanError, PlannerError};
pub use llm::{AnthropicBackend, CompletionBackend, LlmBackend, OpenAiBackend, create_backend};
pub use parse::{MAX_BUILD_BLOCKS, MIN_BUILD_BLOCKS, ParsedPlan, TaskRejection, parse};
pub use prompt::{PromptComposer, RenderedPrompt, SYSTEM_PROMPT};
