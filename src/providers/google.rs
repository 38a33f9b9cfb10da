use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use super::{error_from_response, http_client, request_error, Provider};
use crate::errors::ProviderError;

/// Client for the public Google Translate endpoint used by browser extensions.
///
/// No key is needed; the only parameters are the language codes.
#[derive(Debug)]
pub struct Google {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, `https://translate.googleapis.com` unless overridden
    endpoint: String,
}

/// One translation request
#[derive(Debug, Clone)]
pub struct GoogleRequest {
    pub text: String,
    /// Short source code, or "auto"
    pub source_language: String,
    /// Short target code
    pub target_language: String,
}

impl GoogleRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }
}

/// Parsed translation response
#[derive(Debug, Clone, Default)]
pub struct GoogleResponse {
    /// Translated sentences, in order
    pub segments: Vec<String>,
    /// Language detected by the service when the source was "auto"
    pub detected_source_language: Option<String>,
}

impl Google {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: http_client(timeout_secs),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/translate_a/single", self.endpoint.trim_end_matches('/'))
    }

    /// Parse the nested array payload: `[[["translated", "original", ...], ...], null, "en", ...]`
    pub fn parse_response(payload: &Value) -> Result<GoogleResponse, ProviderError> {
        let sentences = payload
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::ParseError("missing sentence array".to_string()))?;

        let segments = sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
            .map(str::to_string)
            .collect();

        let detected_source_language = payload
            .get(2)
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(GoogleResponse {
            segments,
            detected_source_language,
        })
    }
}

#[async_trait]
impl Provider for Google {
    type Request = GoogleRequest;
    type Response = GoogleResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let response = self
            .client
            .post(self.api_url())
            .query(&[
                ("client", "gtx"),
                ("sl", request.source_language.as_str()),
                ("tl", request.target_language.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", request.text.as_str())])
            .send()
            .await
            .map_err(|e| request_error("Google Translate", e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        let parsed = Self::parse_response(&payload)?;
        if let Some(detected) = &parsed.detected_source_language {
            debug!("Google Translate detected source language '{}'", detected);
        }
        Ok(parsed)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.complete(GoogleRequest::new("Hello", "en", "pt")).await?;
        Ok(())
    }

    fn extract_text(response: &Self::Response) -> String {
        response.segments.concat()
    }
}
