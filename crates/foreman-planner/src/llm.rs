//! Model calls for command planning.
//!
//! The commander hands a [`RenderedPrompt`] to a [`CompletionBackend`] and
//! gets back whatever text the model produced; extracting the task plan
//! from that text is the parser's job. [`LlmBackend`] holds the two HTTP
//! wire formats the planner speaks, picked at startup by
//! [`create_backend`].

use std::future::Future;

use serde_json::Value;

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::PlannerError;
use crate::prompt::RenderedPrompt;

/// Value sent in the `anthropic-version` header.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Produces model output for a planning prompt.
///
/// The commander is generic over this so tests and the offline engine can
/// answer without a network.
pub trait CompletionBackend: Send + Sync {
    /// Short label used in log fields.
    fn name(&self) -> &str;

    /// Complete `prompt` and return the model's text untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::LlmBackend`] when the call cannot be made,
    /// the endpoint answers with a non-success status, or the reply holds
    /// no text.
    fn complete(
        &self,
        prompt: &RenderedPrompt,
    ) -> impl Future<Output = Result<String, PlannerError>> + Send;
}

/// A remote model reached over HTTP.
#[derive(Debug)]
pub enum LlmBackend {
    /// `/chat/completions` endpoints.
    OpenAi(OpenAiBackend),
    /// The `/messages` endpoint.
    Anthropic(AnthropicBackend),
}

impl CompletionBackend for LlmBackend {
    fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, PlannerError> {
        match self {
            Self::OpenAi(backend) => backend.complete(prompt).await,
            Self::Anthropic(backend) => backend.complete(prompt).await,
        }
    }
}

/// Pick the wire format named by `config.backend_type`. No request is made
/// until the first command is planned.
pub fn create_backend(config: &LlmBackendConfig) -> LlmBackend {
    match config.backend_type {
        BackendType::OpenAi => LlmBackend::OpenAi(OpenAiBackend::new(config)),
        BackendType::Anthropic => LlmBackend::Anthropic(AnthropicBackend::new(config)),
    }
}

/// Send `body` and decode the reply, turning transport and status failures
/// into [`PlannerError::LlmBackend`] tagged with `label`.
async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    label: &str,
) -> Result<Value, PlannerError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| PlannerError::LlmBackend(format!("could not reach {label}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_owned());
        return Err(PlannerError::LlmBackend(format!(
            "{label} answered {status}: {error_body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| PlannerError::LlmBackend(format!("{label} reply is not JSON: {e}")))
}

/// Chat completions format, spoken by hosted and local servers alike.
///
/// The system and user prompts travel as two messages and the reply is
/// forced into JSON mode, which keeps the parser's extraction step short.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiBackend {
    /// Client for `{api_url}/chat/completions`.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn request_body(&self, prompt: &RenderedPrompt) -> Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "temperature": 0.7,
            "max_tokens": self.max_tokens,
            "response_format": {"type": "json_object"}
        })
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, PlannerError> {
        let url = format!("{}/chat/completions", self.api_url);
        let mut request = self.client.post(&url);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let json = post_json(request, &self.request_body(prompt), "OpenAI").await?;
        extract_openai_content(&json)
    }
}

/// `choices[0].message.content` of a chat completions reply.
fn extract_openai_content(json: &Value) -> Result<String, PlannerError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            PlannerError::LlmBackend("chat completions reply has no message content".to_owned())
        })
}

/// Messages format. The system prompt is a top-level field rather than a
/// message, and authentication uses `x-api-key`.
#[derive(Debug)]
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    /// Client for `{api_url}/messages`.
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn request_body(&self, prompt: &RenderedPrompt) -> Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": prompt.system,
            "messages": [
                {"role": "user", "content": prompt.user}
            ]
        })
    }

    async fn complete(&self, prompt: &RenderedPrompt) -> Result<String, PlannerError> {
        let url = format!("{}/messages", self.api_url);
        let request = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION);
        let json = post_json(request, &self.request_body(prompt), "Anthropic").await?;
        extract_anthropic_content(&json)
    }
}

/// First text block of a messages reply.
fn extract_anthropic_content(json: &Value) -> Result<String, PlannerError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            PlannerError::LlmBackend("messages reply has no text block".to_owned())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn config(backend_type: BackendType) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type,
            api_url: "http://localhost:11434/v1".to_owned(),
            api_key: String::new(),
            model: "test-model".to_owned(),
            max_tokens: 256,
        }
    }

    fn prompt() -> RenderedPrompt {
        RenderedPrompt {
            system: "schema".to_owned(),
            user: "=== PLAYER COMMAND ===\n\"mine iron\"".to_owned(),
        }
    }

    #[test]
    fn chat_reply_text_is_returned_verbatim() {
        let json = serde_json::json!({
            "choices": [{"message": {"content": "{\"tasks\": []}"}}]
        });
        let result = extract_openai_content(&json);
        assert_eq!(result.unwrap_or_default(), "{\"tasks\": []}");
    }

    #[test]
    fn chat_reply_without_choices_is_a_backend_error() {
        let json = serde_json::json!({"error": "rate_limit"});
        let err = extract_openai_content(&json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "LLM backend error: chat completions reply has no message content"
        );
    }

    #[test]
    fn messages_reply_text_is_returned() {
        let json = serde_json::json!({
            "content": [{"type": "text", "text": "{\"tasks\": []}"}]
        });
        assert!(
            extract_anthropic_content(&json)
                .unwrap_or_default()
                .contains("tasks")
        );
    }

    #[test]
    fn messages_reply_without_blocks_is_an_error() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_content(&json).is_err());
    }

    #[test]
    fn openai_body_uses_json_mode_and_both_messages() {
        let backend = OpenAiBackend::new(&config(BackendType::OpenAi));
        let body = backend.request_body(&prompt());
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], prompt().user);
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn anthropic_body_hoists_system() {
        let backend = AnthropicBackend::new(&config(BackendType::Anthropic));
        let body = backend.request_body(&prompt());
        assert_eq!(body["system"], "schema");
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn backend_type_selects_wire_format() {
        assert_eq!(
            create_backend(&config(BackendType::OpenAi)).name(),
            "openai-compatible"
        );
        assert_eq!(
            create_backend(&config(BackendType::Anthropic)).name(),
            "anthropic"
        );
    }
}
