use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use synapse_core::ScenarioPlan;

use crate::config::LlmConfig;
use crate::error::{LlmError, Result};
use crate::prompts::{ExplainInput, explanation_messages, simulation_messages};

const SIMULATION_MAX_TOKENS: u32 = 700;
const EXPLANATION_MAX_TOKENS: u32 = 500;
const EXPLANATION_TEMPERATURE: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: 512,
            temperature: 0.4,
            response_format: ResponseFormat::Text,
        }
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<FormatSpec>,
}

#[derive(Serialize)]
struct FormatSpec {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Pull a human-readable message out of a non-2xx body:
/// `error.message`, then `message`, then the raw text.
fn upstream_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed
            .error
            .and_then(|e| e.message)
            .or(parsed.message)
            .unwrap_or_else(|| "Unknown response body".to_string()),
        Err(_) => body.to_string(),
    }
}

/// OpenRouter chat-completions client. Cheap to clone.
#[derive(Clone, Debug)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    config: Arc<LlmConfig>,
}

impl OpenRouterClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send one completion request and return the trimmed answer text.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let body = RequestBody {
            model: &self.config.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: match request.response_format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(FormatSpec {
                    kind: "json_object",
                }),
            },
        };

        tracing::debug!(
            model = %self.config.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "sending completion request"
        );

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.app_title)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = upstream_error_message(&text);
            tracing::warn!(status = status.as_u16(), "completion request rejected: {message}");
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|error| LlmError::MalformedJson {
                error,
                raw: text.clone(),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(LlmError::EmptyCompletion)
    }

    /// Same as [`complete`](Self::complete) in JSON mode, parsing the answer.
    pub async fn complete_json<T: DeserializeOwned>(&self, request: CompletionRequest) -> Result<T> {
        let request = CompletionRequest {
            response_format: ResponseFormat::JsonObject,
            ..request
        };
        let raw = self.complete(&request).await?;
        serde_json::from_str(&raw).map_err(|error| LlmError::MalformedJson { error, raw })
    }

    /// Ask the model for a scenario plan. `creativity` is the temperature.
    pub async fn simulation_plan(
        &self,
        prompt: &str,
        language_hint: Option<&str>,
        creativity: f64,
    ) -> Result<ScenarioPlan> {
        let request = CompletionRequest {
            temperature: creativity,
            max_tokens: SIMULATION_MAX_TOKENS,
            ..CompletionRequest::new(simulation_messages(prompt, language_hint))
        };
        self.complete_json(request).await
    }

    /// Ask the model to explain why a scenario's concepts fired.
    pub async fn explain(&self, input: &ExplainInput) -> Result<String> {
        let request = CompletionRequest {
            temperature: EXPLANATION_TEMPERATURE,
            max_tokens: EXPLANATION_MAX_TOKENS,
            ..CompletionRequest::new(explanation_messages(input))
        };
        self.complete(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_nested() {
        let body = r#"{"error": {"message": "Rate limited"}, "message": "outer"}"#;
        assert_eq!(upstream_error_message(body), "Rate limited");
    }

    #[test]
    fn test_error_message_falls_back_to_top_level() {
        assert_eq!(upstream_error_message(r#"{"message": "outer"}"#), "outer");
        assert_eq!(upstream_error_message("{}"), "Unknown response body");
    }

    #[test]
    fn test_error_message_raw_text() {
        assert_eq!(upstream_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_request_body_omits_text_format() {
        let messages = vec![ChatMessage::user("hi")];
        let body = RequestBody {
            model: "m",
            messages: &messages,
            max_tokens: 10,
            temperature: 0.4,
            response_format: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("response_format").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = OpenRouterClient::new(LlmConfig {
            api_url: "http://127.0.0.1:9/unreachable".into(),
            ..Default::default()
        })
        .unwrap();
        let err = client
            .complete(&CompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
