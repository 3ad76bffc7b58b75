// =============================================================================
// Groq Chat Completions Client (OpenAI-compatible API)
// =============================================================================
//
// SECURITY: The API key is never logged or serialised. It is sent only as a
// bearer token on the outbound request.
//
// One attempt per call. Timeouts come from the reqwest client; any transport
// error, non-2xx status, or empty completion is reported as a
// `ModelFailure` for the caller to fall back on.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ModelFailure, TextGenerator};
use crate::types::ChatMessage;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Sampling temperature for every request; low, as answers should be terse.
const TEMPERATURE: f64 = 0.2;

/// Longest error body kept in a `ModelFailure::Status`.
const MAX_ERROR_BODY: usize = 300;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client authenticated with a Groq API key.
#[derive(Clone)]
pub struct GroqClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GroqClient {
    /// Create a new `GroqClient`.
    ///
    /// # Arguments
    /// * `api_key`  — Groq API key (bearer token).
    /// * `model`    — model identifier, e.g. `llama3-8b-8192`.
    /// * `base_url` — API root without the trailing `/chat/completions`.
    /// * `timeout`  — whole-request timeout.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client for the model service")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        debug!(base_url = %base_url, model = %model, "GroqClient initialised");

        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()), name = "groq::complete")]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelFailure> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelFailure::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let mut text = resp.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| text.is_char_boundary(i))
                    .unwrap_or(0);
                text.truncate(cut);
            }
            return Err(ModelFailure::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| ModelFailure::Transport(format!("undecodable completion body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelFailure::EmptyCompletion)?;

        debug!(chars = content.len(), "completion received");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let c = GroqClient::new("k", DEFAULT_MODEL, "http://localhost:9/v1/", Duration::from_secs(1)).unwrap();
        assert_eq!(c.endpoint(), "http://localhost:9/v1/chat/completions");
        assert_eq!(c.model(), DEFAULT_MODEL);
    }

    #[test]
    fn debug_output_hides_the_key() {
        let c = GroqClient::new("super-secret", DEFAULT_MODEL, DEFAULT_BASE_URL, Duration::from_secs(1)).unwrap();
        assert!(!format!("{c:?}").contains("super-secret"));
    }

    #[test]
    fn request_body_shape() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let body = CompletionRequest {
            model: "m",
            messages: &messages,
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_failure() {
        // Port 9 (discard) on localhost is closed in test environments.
        let c = GroqClient::new("k", DEFAULT_MODEL, "http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = c.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, ModelFailure::Transport(_)));
    }
}
