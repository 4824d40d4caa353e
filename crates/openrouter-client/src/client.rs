//! OpenRouter HTTP client

use crate::error::{OpenRouterError, Result};
use crate::types::{ChatMessage, ChatRequest};
use std::time::Duration;
use tracing::{debug, warn};

/// Models tried in order when no explicit model is requested
pub const DEFAULT_MODELS: &[&str] = &[
    "x-ai/grok-4.1-fast:free",
    "x-ai/grok-4.1-fast",
    "kwaipilot/kat-coder-pro:free",
    "nvidia/nemotron-nano-12b-v2-vl:free",
];

/// Connection settings for [`OpenRouterClient`]
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
    /// Sent as `HTTP-Referer` for OpenRouter app attribution
    pub referer: String,
    /// Sent as `X-Title`
    pub title: String,
    pub max_tokens: u32,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: OpenRouterClient::DEFAULT_BASE_URL.to_string(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            referer: "http://localhost:5173".to_string(),
            title: "CryptoPal Dashboard".to_string(),
            max_tokens: 150,
        }
    }
}

/// Chat-completion client with ordered model fallback
pub struct OpenRouterClient {
    http: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://openrouter.ai/api/v1";

    pub fn new(config: OpenRouterConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { http, config }
    }

    pub fn models(&self) -> &[String] {
        &self.config.models
    }

    /// Run a completion, falling through the configured models while they
    /// report themselves unavailable. Returns the raw completion JSON.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<serde_json::Value> {
        let mut last_error = None;

        for model in &self.config.models {
            match self.chat_with_model(model, messages).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_model_unavailable() => {
                    debug!(model = %model, error = %e, "OpenRouter model unavailable, trying next");
                    last_error = Some(e);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "OpenRouter request failed");
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or(OpenRouterError::NoModels))
    }

    /// Run a completion against one specific model
    pub async fn chat_with_model(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<serde_json::Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(OpenRouterError::MissingApiKey)?;

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = ChatRequest {
            model,
            messages,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let fallback = format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Error")
            );
            let text = response.text().await.unwrap_or_default();
            return Err(OpenRouterError::Api {
                status: status.as_u16(),
                message: extract_error_message(&text).unwrap_or(fallback),
            });
        }

        Ok(response.json().await?)
    }
}

/// Pull `error.message` or `message` out of an OpenRouter error body
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn config(base_url: String, models: &[&str]) -> OpenRouterConfig {
        OpenRouterConfig {
            api_key: Some("sk-test".into()),
            base_url,
            models: models.iter().map(|m| m.to_string()).collect(),
            ..OpenRouterConfig::default()
        }
    }

    #[tokio::test]
    async fn test_falls_through_unavailable_models() {
        let mut server = Server::new_async().await;
        let missing = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({"model": "gone/model"})))
            .with_status(404)
            .with_body(json!({"error": {"message": "No endpoints found for gone/model"}}).to_string())
            .create_async()
            .await;
        let working = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({"model": "good/model", "max_tokens": 150})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"content": "Hold."}}]}).to_string())
            .create_async()
            .await;

        let client = OpenRouterClient::new(config(server.url(), &["gone/model", "good/model"]));
        let data = client.chat(&[ChatMessage::user("hi")]).await.unwrap();

        assert_eq!(data["choices"][0]["message"]["content"], "Hold.");
        missing.assert_async().await;
        working.assert_async().await;
    }

    #[tokio::test]
    async fn test_other_errors_stop_immediately() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({"model": "a"})))
            .with_status(401)
            .with_body(json!({"error": {"message": "Invalid key"}}).to_string())
            .create_async()
            .await;
        let second = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({"model": "b"})))
            .with_status(200)
            .with_body("{}")
            .expect(0)
            .create_async()
            .await;

        let client = OpenRouterClient::new(config(server.url(), &["a", "b"]));
        let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "OpenRouter API error (401): Invalid key");
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_model_list() {
        let client = OpenRouterClient::new(config("http://127.0.0.1:9".into(), &[]));
        let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, OpenRouterError::NoModels));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error": {"message": "bad"}}"#).as_deref(),
            Some("bad")
        );
        assert_eq!(
            extract_error_message(r#"{"message": "plain"}"#).as_deref(),
            Some("plain")
        );
        assert_eq!(extract_error_message("not json"), None);
    }
}
