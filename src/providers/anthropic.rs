use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_from_response, http_client, request_error, Provider};
use crate::errors::ProviderError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic messages API
#[derive(Debug)]
pub struct Anthropic {
    /// Shared reqwest client
    client: Client,
    /// Sent as `x-api-key`
    api_key: String,
    /// Base URL; empty means the public API
    endpoint: String,
    /// Model used by the connection check
    model: String,
}

/// Body of a `/v1/messages` call
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// Conversation turns, one user turn per request
    messages: Vec<AnthropicMessage>,

    /// Translator instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Completion token cap, required by the API
    max_tokens: u32,
}

/// One conversation turn
#[derive(Debug, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// "user" or "assistant"
    pub role: String,

    /// Plain text of the turn
    pub content: String,
}

/// Token counts reported by the API
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Prompt side
    pub input_tokens: u32,
    /// Completion side
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// Content blocks, in order
    pub content: Vec<AnthropicContent>,
    /// Token counts reported by the API
    pub usage: TokenUsage,
}

/// One content block; only `text` blocks carry translation output
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The text, absent for non-text blocks
    #[serde(default)]
    pub text: String,
}

impl AnthropicRequest {
    /// Start a request for `model`
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            system: None,
            temperature: None,
            max_tokens,
        }
    }

    /// Append a conversation turn
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(AnthropicMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    /// Build a client; `model` is used for the connection test
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: http_client(timeout_secs),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl Provider for Anthropic {
    type Request = AnthropicRequest;
    type Response = AnthropicResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let response = self
            .client
            .post(self.api_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("Anthropic", e))?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            error!("Anthropic API error: {}", err);
            return Err(err);
        }

        response
            .json::<AnthropicResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Anthropic: {}", e)))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = AnthropicRequest::new(self.model.clone(), 10).add_message("user", "Hello");
        self.complete(request).await?;
        Ok(())
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<String>()
            .trim()
            .to_string()
    }
}
