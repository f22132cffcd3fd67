use std::env;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::error::AiError;

pub const DEFAULT_BASE_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub base_url: Url,
    pub api_key: String,
    pub model: String,
}

impl AiConfig {
    /// Build a config from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if `base_url` is not an absolute URL.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Read `BUDDY_AI_*` variables. A missing or blank key disables AI.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("BUDDY_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("BUDDY_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("BUDDY_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        match Self::new(&base_url, api_key, model) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(%base_url, error = %err, "ignoring invalid BUDDY_AI_BASE_URL");
                None
            }
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

/// Thin chat-completions client shared by every AI feature.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    config: Option<AiConfig>,
}

impl AiClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(AiConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<AiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn config(&self) -> Option<&AiConfig> {
        self.config.as_ref()
    }

    /// Send one system + user exchange and return the assistant's text.
    ///
    /// # Errors
    ///
    /// Returns `AiError` when AI is disabled, the gateway rejects the request
    /// (429 and 402 are reported distinctly), or the reply has no content.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, AiError> {
        let config = self.config.as_ref().ok_or(AiError::Disabled)?;

        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature,
        };

        info!(model = %config.model, temperature, "sending AI gateway request");
        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if let Some(err) = status_error(response.status()) {
            warn!(status = %response.status(), "AI gateway rejected request");
            return Err(err);
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

pub(crate) fn status_error(status: StatusCode) -> Option<AiError> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(AiError::RateLimited),
        StatusCode::PAYMENT_REQUIRED => Some(AiError::PaymentRequired),
        s if !s.is_success() => Some(AiError::HttpStatus(s)),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_distinct_errors() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS),
            Some(AiError::RateLimited)
        ));
        assert!(matches!(
            status_error(StatusCode::PAYMENT_REQUIRED),
            Some(AiError::PaymentRequired)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY),
            Some(AiError::HttpStatus(StatusCode::BAD_GATEWAY))
        ));
        assert!(status_error(StatusCode::OK).is_none());
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = AiConfig::new("http://localhost:9000/v1/", "key", DEFAULT_MODEL).unwrap();
        assert_eq!(
            config.completions_url(),
            "http://localhost:9000/v1/chat/completions"
        );
        assert!(AiConfig::new("not a url", "key", DEFAULT_MODEL).is_err());
    }

    #[tokio::test]
    async fn disabled_client_refuses_requests() {
        let client = AiClient::new(None);
        assert!(!client.enabled());
        let result = client.chat("system", "user", 0.5).await;
        assert!(matches!(result, Err(AiError::Disabled)));
    }
}
