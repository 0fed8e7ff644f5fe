//! Chat completion client
//!
//! Sends a single user message to an OpenAI-compatible
//! `POST {base}/chat/completions` endpoint and returns the first choice.

use super::{check_status, http_client, ExternalServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default API base
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const SERVICE: &str = "Chat completion";

/// Answers one farmer question
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Returns the assistant reply for a single prompt
    async fn complete(&self, prompt: &str) -> Result<String, ExternalServiceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_reply(self) -> Result<String, ExternalServiceError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ExternalServiceError::InvalidResponse {
                service: SERVICE,
                reason: "no choices in completion".to_string(),
            })
    }
}

/// OpenAI-compatible HTTP client
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiChatClient {
    /// Creates a client for the given key, base URL and model
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ExternalServiceError> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, ExternalServiceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Requesting chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_status(SERVICE, response).await?;
        let body: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ExternalServiceError::InvalidResponse {
                    service: SERVICE,
                    reason: e.to_string(),
                })?;

        body.into_reply()
    }
}

/// Stand-in used when no API key is configured
///
/// Every call fails with [`ExternalServiceError::NotConfigured`], which the
/// chat page renders as a degraded message.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledChatClient;

#[async_trait]
impl ChatClient for DisabledChatClient {
    async fn complete(&self, _prompt: &str) -> Result<String, ExternalServiceError> {
        Err(ExternalServiceError::NotConfigured(SERVICE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::test_server::serve_once;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: [ChatMessage {
                role: "user",
                content: "Why are my tomato leaves yellow?",
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Why are my tomato leaves yellow?");
    }

    #[test]
    fn test_reply_is_first_choice() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Water less."}},
                           {"message":{"role":"assistant","content":"ignored"}}]}"#,
        )
        .unwrap();

        assert_eq!(body.into_reply().unwrap(), "Water less.");
    }

    #[test]
    fn test_empty_choices_is_invalid_response() {
        let body: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            body.into_reply(),
            Err(ExternalServiceError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = OpenAiChatClient::new("sk-secret", DEFAULT_BASE_URL, DEFAULT_MODEL).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_disabled_client_reports_not_configured() {
        let err = DisabledChatClient.complete("hello").await.unwrap_err();
        assert!(matches!(err, ExternalServiceError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_complete_against_local_server() {
        let (url, server) =
            serve_once(200, r#"{"choices":[{"message":{"content":"Use neem oil."}}]}"#).await;

        let client = OpenAiChatClient::new("sk-test", format!("{}/v1/", url), "test-model").unwrap();
        let reply = client.complete("aphids?").await.unwrap();
        assert_eq!(reply, "Use neem oil.");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions "));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""model":"test-model""#));
        assert!(request.contains("aphids?"));
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let (url, _server) = serve_once(429, r#"{"error":"rate limited"}"#).await;

        let client = OpenAiChatClient::new("sk-test", url, DEFAULT_MODEL).unwrap();
        let err = client.complete("hi").await.unwrap_err();

        assert!(matches!(err, ExternalServiceError::Status { status: 429, .. }));
    }
}
