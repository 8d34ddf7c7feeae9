//! OpenRouter chat-completion client used by the narrative generators.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "anthropic/claude-3.5-haiku";

#[derive(Debug, Clone, Error)]
pub enum OpenRouterError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
}

impl OpenRouterError {
    /// Returns true if the error is transient and should be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Generation parameters per request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// OpenRouter API client. Cheap to clone; the underlying reqwest client is
/// shared.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    // Bounded so a hanging upstream cannot pin a request forever.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(api_key: String, model: Option<String>) -> Result<Self, OpenRouterError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("coach-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpenRouterError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Send a completion request, retrying transient failures.
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerationOptions,
    ) -> Result<ChatResponse, OpenRouterError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        (|| async { self.send_request(&request).await })
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(15))
                    .with_max_times(2)
                    .with_jitter(),
            )
            .when(|e: &OpenRouterError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    "OpenRouter call failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await
    }

    async fn send_request(&self, request: &ChatRequest) -> Result<ChatResponse, OpenRouterError> {
        let res = self
            .http
            .post(OPENROUTER_API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => res
                .json::<ChatResponse>()
                .await
                .map_err(|e| OpenRouterError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(OpenRouterError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(OpenRouterError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(OpenRouterError::Http { status, body })
            }
        }
    }

    /// Send a prompt and parse the reply as JSON into `T`. The reply may be
    /// wrapped in a markdown code block.
    pub async fn ask_json<T: for<'de> Deserialize<'de>>(
        &self,
        prompt: &str,
        system: Option<&str>,
        options: GenerationOptions,
    ) -> Result<T, OpenRouterError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        let text = self
            .complete(messages, options)
            .await?
            .text()
            .map(|s| s.to_string())
            .ok_or_else(|| OpenRouterError::Serde("no choices in response".to_string()))?;

        if text.trim().is_empty() {
            return Err(OpenRouterError::Serde("empty response".to_string()));
        }

        let json_str = extract_json(&text);
        serde_json::from_str(json_str).map_err(|e| {
            warn!(
                json_error = %e,
                preview = %json_str.chars().take(300).collect::<String>(),
                "failed to parse JSON from model output"
            );
            OpenRouterError::Serde(e.to_string())
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> OpenRouterError {
    if e.is_timeout() {
        OpenRouterError::Timeout
    } else {
        OpenRouterError::Transport(e.to_string())
    }
}

/// Strip a surrounding markdown code fence, if present.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    for fence in ["```json", "```"] {
        if let Some(start) = text.find(fence) {
            let after = start + fence.len();
            // skip a language tag on the opening fence line
            let body_start = text[after..]
                .find('\n')
                .map(|i| after + i + 1)
                .unwrap_or(after);
            if let Some(end) = text[body_start..].find("```") {
                return text[body_start..body_start + end].trim();
            }
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_passes_plain_json_through() {
        let input = r#"{"scores": [1, 2]}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn extract_json_unwraps_json_fence() {
        let input = "Hier is de analyse:\n```json\n{\"ok\": true}\n```";
        assert_eq!(extract_json(input), r#"{"ok": true}"#);
    }

    #[test]
    fn extract_json_unwraps_bare_fence() {
        let input = "```\n{\"ok\": true}\n```";
        assert_eq!(extract_json(input), r#"{"ok": true}"#);
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(OpenRouterError::Timeout.should_retry());
        assert!(OpenRouterError::RateLimited.should_retry());
        assert!(
            OpenRouterError::Http {
                status: 503,
                body: String::new()
            }
            .should_retry()
        );
        assert!(!OpenRouterError::InvalidApiKey.should_retry());
        assert!(
            !OpenRouterError::Http {
                status: 400,
                body: String::new()
            }
            .should_retry()
        );
    }
}
