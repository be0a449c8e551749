use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::config::ClientConfig;
use crate::domain::{DomainError, Message};

const COMPLETIONS_PATH: &str = "/chat/completions";

/// OpenAI-style chat completion request payload.
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

/// Minimal subset of the chat completion response we care about.
#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for OpenRouter (and any endpoint speaking the OpenAI chat
/// completions API).
///
/// Every request carries the bearer credential plus the `HTTP-Referer` and
/// `X-Title` headers OpenRouter uses to attribute traffic to an application.
/// All failures map to [`DomainError::RemoteCall`]; nothing is retried.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
    referer: String,
    title: String,
}

impl OpenRouterClient {
    pub fn new(config: &ClientConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            url: format!("{}{}", config.base_url.trim_end_matches('/'), COMPLETIONS_PATH),
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            messages,
            temperature,
        };

        debug!(
            "OpenRouterClient: sending {} messages to {} ({})",
            messages.len(),
            self.url,
            self.model
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::remote_call(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("OpenRouterClient: API returned {status}: {body}");
            return Err(DomainError::remote_call(format!("API returned {status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| DomainError::remote_call(format!("failed to parse response: {e}")))?;

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DomainError::remote_call("response contained no message content"))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
