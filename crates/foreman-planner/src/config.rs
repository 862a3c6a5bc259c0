//! Planner configuration loaded from environment variables.
//!
//! Credentials never live in the YAML config file. Everything here comes
//! from the environment, read through a lookup function so the parsing
//! logic can be exercised without touching the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::PlannerError;

const DEFAULT_LLM_TIMEOUT_MS: u64 = 7000;

/// Default bound on one LLM round trip.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_millis(DEFAULT_LLM_TIMEOUT_MS);

/// Default completion budget per response.
const DEFAULT_MAX_TOKENS: u32 = 512;

/// Complete planner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// LLM backend, or `None` when `LLM_BACKEND` is unset.
    pub backend: Option<LlmBackendConfig>,
    /// Maximum time to wait for a plan.
    pub llm_timeout: Duration,
    /// Directory with `system.j2` and `user.j2` overriding the built-in
    /// prompt templates.
    pub templates_dir: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            backend: None,
            llm_timeout: DEFAULT_LLM_TIMEOUT,
            templates_dir: None,
        }
    }
}

/// Configuration for a single LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmBackendConfig {
    /// The wire protocol to speak.
    pub backend_type: BackendType,
    /// Base API URL (e.g. `https://api.openai.com/v1`).
    pub api_url: String,
    /// API key for authentication. May be empty for local servers.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Completion token budget.
    pub max_tokens: u32,
}

/// Supported LLM wire protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions (`OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

impl BackendType {
    /// Parse a backend name as written in `LLM_BACKEND`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            _ => None,
        }
    }

    /// Base URL used when `LLM_API_URL` is unset.
    pub const fn default_api_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

impl PlannerConfig {
    /// Load configuration from the process environment.
    ///
    /// Variables:
    /// - `LLM_BACKEND` -- `openai`, `deepseek`, `ollama`, `anthropic`;
    ///   unset means no remote backend
    /// - `LLM_MODEL` -- model name (required when `LLM_BACKEND` is set)
    /// - `LLM_API_URL` -- base URL (default depends on the backend)
    /// - `LLM_API_KEY` -- API key (default empty)
    /// - `LLM_MAX_TOKENS` -- completion budget (default 512)
    /// - `LLM_TIMEOUT_MS` -- plan deadline in milliseconds (default 7000)
    /// - `PROMPT_TEMPLATES_DIR` -- prompt template override directory
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Config`] for unknown backends, a missing
    /// model, or unparsable numbers.
    pub fn from_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = var("LLM_BACKEND")
            .map(|name| {
                let backend_type = BackendType::from_name(&name).ok_or_else(|| {
                    PlannerError::Config(format!("unknown LLM_BACKEND: {name}"))
                })?;
                let model = var("LLM_MODEL").ok_or_else(|| {
                    PlannerError::Config("LLM_MODEL is required when LLM_BACKEND is set".to_owned())
                })?;
                let api_url = var("LLM_API_URL")
                    .unwrap_or_else(|| backend_type.default_api_url().to_owned())
                    .trim_end_matches('/')
                    .to_owned();
                let max_tokens = parse_var(var("LLM_MAX_TOKENS"), "LLM_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
                Ok::<_, PlannerError>(LlmBackendConfig {
                    backend_type,
                    api_url,
                    api_key: var("LLM_API_KEY").unwrap_or_default(),
                    model,
                    max_tokens,
                })
            })
            .transpose()?;

        let timeout_ms = parse_var(var("LLM_TIMEOUT_MS"), "LLM_TIMEOUT_MS", DEFAULT_LLM_TIMEOUT_MS)?;

        Ok(Self {
            backend,
            llm_timeout: Duration::from_millis(timeout_ms),
            templates_dir: var("PROMPT_TEMPLATES_DIR").map(PathBuf::from),
        })
    }
}

/// Parse an optional numeric variable, falling back to `default`.
fn parse_var<T>(value: Option<String>, name: &str, default: T) -> Result<T, PlannerError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |v| {
        v.trim()
            .parse()
            .map_err(|e| PlannerError::Config(format!("invalid {name}: {e}")))
    })
}
