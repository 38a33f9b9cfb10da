/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which sends page text
 * to the configured provider and returns the translated text.
 */

use anyhow::{anyhow, Result};
use log::{debug, warn};
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils::{describe_language, to_service_code};
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::google::{Google, GoogleRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of provider requests made
    pub requests: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self::with_provider_info(String::new(), String::new())
    }

    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Add token usage numbers
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Record the usage of one translated text
    pub fn record(&mut self, usage: &RequestUsage) {
        self.add_token_usage(usage.prompt_tokens, usage.completion_tokens);
        self.requests += usage.requests;
        self.api_duration += usage.duration;
    }

    /// Fold another set of stats into this one
    pub fn merge(&mut self, other: &TokenUsageStats) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        self.requests += other.requests;
        self.api_duration += other.api_duration;
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        let api_minutes = self.api_duration.as_secs_f64() / 60.0;

        if self.total_tokens == 0 {
            return format!(
                "Usage Summary:\n\
                 Provider: {}\n\
                 Requests: {}\n\
                 API request time: {:.2} minutes",
                self.provider, self.requests, api_minutes
            );
        }

        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Model: {}\n\
             Requests: {}\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            api_minutes,
            self.tokens_per_minute()
        )
    }
}

/// Usage of a single `translate_text_with_usage` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    /// Provider requests made (0 for whitespace-only text)
    pub requests: u64,
    pub duration: Duration,
}

impl RequestUsage {
    fn add(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        if let Some(pt) = prompt_tokens {
            *self.prompt_tokens.get_or_insert(0) += pt;
        }
        if let Some(ct) = completion_tokens {
            *self.completion_tokens.get_or_insert(0) += ct;
        }
        self.requests += 1;
        self.duration += duration;
    }
}

/// Check an endpoint string is an absolute http(s) URL
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url)
}

/// Split text into pieces of at most `max_chars` characters, preferring line boundaries.
///
/// Lines longer than the limit are cut at the last space before it, or hard at the limit.
/// Joining the segments with `\n` restores the line structure: blank lines that fall on a
/// boundary are kept as leading newlines of the next segment, outside the limit.
pub fn split_into_segments(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    // characters after the leading newlines of `current`
    let mut current_len = 0;

    for line in text.split('\n') {
        for piece in split_long_line(line, max_chars) {
            let piece_len = piece.chars().count();
            // +1 for the newline joining it to the current segment
            if current_len > 0 && current_len + 1 + piece_len > max_chars {
                let body_len = current.trim_end_matches('\n').len();
                let trailing_newlines = current.split_off(body_len);
                segments.push(std::mem::replace(&mut current, trailing_newlines));
                current_len = 0;
            }
            if current_len > 0 || piece.is_empty() {
                current.push('\n');
                current_len += usize::from(current_len > 0);
            }
            current.push_str(piece);
            current_len += piece_len;
        }
    }
    if !current.trim().is_empty() {
        segments.push(current);
    }

    segments.retain(|segment| !segment.trim().is_empty());
    segments
}

fn split_long_line(line: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line;

    while rest.chars().count() > max_chars {
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        let cut = match rest[..limit].rfind(' ') {
            Some(space) if space > 0 => space,
            _ => limit,
        };
        pieces.push(&rest[..cut]);
        rest = rest[cut..].trim_start_matches(' ');
    }
    pieces.push(rest);
    pieces
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Google Translate public endpoint
    Google { client: Google },

    /// Ollama LLM service
    Ollama { client: Ollama },

    /// OpenAI API service
    OpenAI { client: OpenAI },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio { client: OpenAI },

    /// Anthropic API service
    Anthropic { client: Anthropic },

    /// Scripted provider used by tests
    Mock { client: MockProvider },
}

/// Main translation service for page text
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let endpoint = config.get_endpoint();
        parse_endpoint(&endpoint)?;
        let timeout = config.get_timeout_secs();

        let provider = match config.provider {
            ConfigTranslationProvider::Google => TranslationProviderImpl::Google {
                client: Google::new(endpoint, timeout),
            },
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::new(endpoint, timeout),
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), endpoint, timeout),
            },
            ConfigTranslationProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };
                TranslationProviderImpl::LMStudio {
                    client: OpenAI::new(api_key, endpoint, timeout),
                }
            }
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), endpoint, config.get_model(), timeout),
            },
        };

        Ok(Self { provider, config })
    }

    /// Create a service backed by a mock provider
    pub fn with_mock(config: TranslationConfig, client: MockProvider) -> Self {
        Self {
            provider: TranslationProviderImpl::Mock { client },
            config,
        }
    }

    /// Name of the provider, for logs and reports
    pub fn provider_name(&self) -> &'static str {
        match &self.provider {
            TranslationProviderImpl::Google { .. } => "Google Translate",
            TranslationProviderImpl::Ollama { .. } => "Ollama",
            TranslationProviderImpl::OpenAI { .. } => "OpenAI",
            TranslationProviderImpl::LMStudio { .. } => "LM Studio",
            TranslationProviderImpl::Anthropic { .. } => "Anthropic",
            TranslationProviderImpl::Mock { .. } => "Mock",
        }
    }

    /// Fresh usage stats labelled with this service's provider and model
    pub fn new_usage_stats(&self) -> TokenUsageStats {
        let model = match &self.provider {
            TranslationProviderImpl::Mock { .. } => String::new(),
            _ if self.config.provider.is_llm() => self.config.get_model(),
            _ => String::new(),
        };
        TokenUsageStats::with_provider_info(self.provider_name().to_string(), model)
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        debug!("Testing connection to {}", self.provider_name());
        let result = match &self.provider {
            TranslationProviderImpl::Google { client } => client.test_connection().await,
            TranslationProviderImpl::Ollama { client } => client.test_connection().await,
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                client.test_connection().await
            }
            TranslationProviderImpl::Anthropic { client } => client.test_connection().await,
            TranslationProviderImpl::Mock { client } => client.test_connection().await,
        };
        result.map_err(TranslationError::from)
    }

    /// Test translation by translating a simple test phrase
    pub async fn test_translation(
        &self,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        self.translate_text("This is a short test sentence.", source_language, target_language)
            .await
    }

    /// Translate a single text string
    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        let (translated, _) = self
            .translate_text_with_usage(text, source_language, target_language)
            .await?;
        Ok(translated)
    }

    /// Translate text with token usage tracking.
    ///
    /// Whitespace-only text is returned as an empty string without calling the provider.
    /// Text longer than the provider's request limit is sent in several requests, split
    /// at line boundaries, and the translations are joined with newlines.
    pub async fn translate_text_with_usage(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<(String, RequestUsage), TranslationError> {
        let mut usage = RequestUsage::default();
        if text.trim().is_empty() {
            return Ok((String::new(), usage));
        }

        let segments = split_into_segments(text, self.config.get_max_chars_per_request());
        if segments.len() > 1 {
            debug!(
                "Text of {} characters split into {} requests",
                text.chars().count(),
                segments.len()
            );
        }

        let mut translated = Vec::with_capacity(segments.len());
        for segment in &segments {
            let body = segment.trim_start_matches('\n');
            let leading_newlines = &segment[..segment.len() - body.len()];

            let start_time = Instant::now();
            let (output, prompt_tokens, completion_tokens) = self
                .translate_segment(body, source_language, target_language)
                .await?;
            usage.add(prompt_tokens, completion_tokens, start_time.elapsed());

            if output.trim().is_empty() {
                warn!("{} returned an empty translation", self.provider_name());
                return Err(TranslationError::EmptyResponse(self.provider_name().to_string()));
            }
            translated.push(format!("{}{}", leading_newlines, output));
        }

        Ok((translated.join("\n"), usage))
    }

    /// One provider request; returns the text and the reported token counts
    async fn translate_segment(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<(String, Option<u64>, Option<u64>), TranslationError> {
        match &self.provider {
            TranslationProviderImpl::Google { client } => {
                let request = GoogleRequest::new(
                    text,
                    service_code(source_language)?,
                    service_code(target_language)?,
                );
                let response = client.complete(request).await?;
                Ok((Google::extract_text(&response), None, None))
            }
            TranslationProviderImpl::Ollama { client } => {
                let request = GenerationRequest::new(self.config.get_model(), text)
                    .system(self.system_prompt(source_language, target_language))
                    .temperature(self.config.common.temperature);
                let response = client.complete(request).await?;
                Ok((
                    Ollama::extract_text(&response),
                    response.prompt_eval_count,
                    response.eval_count,
                ))
            }
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let model = self.config.get_model();
                let request = OpenAIRequest::new(model.as_str())
                    .add_message("system", self.system_prompt(source_language, target_language))
                    .add_message("user", text)
                    .temperature(self.config.common.temperature)
                    .max_tokens(max_tokens_for_model(&model));
                let response = client.complete(request).await?;
                let (prompt_tokens, completion_tokens) = match response.usage.as_ref() {
                    Some(usage) => (Some(usage.prompt_tokens as u64), Some(usage.completion_tokens as u64)),
                    None => (None, None),
                };
                Ok((OpenAI::extract_text(&response), prompt_tokens, completion_tokens))
            }
            TranslationProviderImpl::Anthropic { client } => {
                let model = self.config.get_model();
                let request = AnthropicRequest::new(model.as_str(), max_tokens_for_model(&model))
                    .system(self.system_prompt(source_language, target_language))
                    .add_message("user", text)
                    .temperature(self.config.common.temperature);
                let response = client.complete(request).await?;
                Ok((
                    Anthropic::extract_text(&response),
                    Some(response.usage.input_tokens as u64),
                    Some(response.usage.output_tokens as u64),
                ))
            }
            TranslationProviderImpl::Mock { client } => {
                let request = MockRequest {
                    text: text.to_string(),
                    source_language: source_language.to_string(),
                    target_language: target_language.to_string(),
                };
                let response = client.complete(request).await?;
                Ok((
                    MockProvider::extract_text(&response),
                    response.prompt_tokens,
                    response.completion_tokens,
                ))
            }
        }
    }

    /// Fill the configured system prompt with language names
    pub fn system_prompt(&self, source_language: &str, target_language: &str) -> String {
        self.config
            .common
            .system_prompt
            .replace("{source_language}", &describe_language(source_language))
            .replace("{target_language}", &describe_language(target_language))
    }
}

fn service_code(code: &str) -> Result<String, TranslationError> {
    to_service_code(code).map_err(|_| TranslationError::UnsupportedLanguage(code.to_string()))
}

/// Get the maximum number of completion tokens for a given model
fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        "gpt-4" | "gpt-4-0613" => 8192,
        "gpt-4o" | "gpt-4o-mini" => 16384,
        "claude-3-5-sonnet-20241022" | "claude-3-5-haiku-20241022" => 8192,
        "claude-3-opus-20240229" | "claude-3-sonnet-20240229" | "claude-3-haiku-20240307" => 4096,
        _ => 4096,
    }
}
