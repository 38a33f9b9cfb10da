use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO) or "auto" for detection by the provider
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Output directory; relative paths are resolved against the input file's folder
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Chunking and output file settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Page layout of the translated documents
    #[serde(default)]
    pub render: RenderConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Translate public endpoint
    #[default]
    Google,
    // @provider: Ollama
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Whether the provider is a language model driven by the system prompt
    pub fn is_llm(&self) -> bool {
        !matches!(self, Self::Google)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name (unused by Google)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max chars per request, longer page texts are split at line boundaries
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            max_chars_per_request: default_max_chars_for(&provider_type),
            timeout_secs: default_timeout_for(&provider_type),
        }
    }
}

/// Chunking and output naming
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Maximum number of source pages per chunk file
    #[serde(default = "default_max_pages_per_chunk")]
    pub max_pages_per_chunk: usize,

    /// File name of the assembled document inside the output directory
    #[serde(default = "default_final_file_name")]
    pub final_file_name: String,

    /// Keep the `_part` and `_translated` files after assembly
    #[serde(default = "default_true")]
    pub keep_intermediate_files: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_pages_per_chunk: default_max_pages_per_chunk(),
            final_file_name: default_final_file_name(),
            keep_intermediate_files: true,
        }
    }
}

/// Layout of the rendered pages, in PDF points
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    #[serde(default = "default_page_width")]
    pub page_width: f32,

    #[serde(default = "default_page_height")]
    pub page_height: f32,

    /// Margin applied on all four sides
    #[serde(default = "default_margin")]
    pub margin: f32,

    /// Body text size
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Size of the "Page N" heading
    #[serde(default = "default_heading_font_size")]
    pub heading_font_size: f32,

    /// Baseline distance between body lines
    #[serde(default = "default_line_height")]
    pub line_height: f32,

    /// Heading text; `{page}` is replaced with the page number
    #[serde(default = "default_heading_template")]
    pub heading_template: String,

    /// Whether heading numbers restart in every chunk or follow the source document
    #[serde(default)]
    pub heading_numbering: HeadingNumbering,
}

/// Numbering of the "Page N" headings
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeadingNumbering {
    /// Restart at 1 in every chunk
    #[default]
    Chunk,
    /// Use the page's number in the source document
    Document,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_width: default_page_width(),
            page_height: default_page_height(),
            margin: default_margin(),
            font_size: default_font_size(),
            heading_font_size: default_heading_font_size(),
            line_height: default_line_height(),
            heading_template: default_heading_template(),
            heading_numbering: HeadingNumbering::default(),
        }
    }
}

impl RenderConfig {
    /// Heading text for a source page
    pub fn heading_for(&self, page_number: u32) -> String {
        self.heading_template.replace("{page}", &page_number.to_string())
    }

    /// Number of the first heading of a chunk whose first page is `first_source_page`
    pub fn first_heading_number(&self, first_source_page: u32) -> u32 {
        match self.heading_numbering {
            HeadingNumbering::Chunk => 1,
            HeadingNumbering::Document => first_source_page,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to the LLM providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Source language value that lets the provider detect the language
pub const AUTO_LANGUAGE: &str = "auto";

fn default_source_language() -> String {
    AUTO_LANGUAGE.to_string()
}

fn default_target_language() -> String {
    "pt".to_string()
}

fn default_output_dir() -> String {
    "documents_translated".to_string()
}

fn default_max_pages_per_chunk() -> usize {
    10
}

fn default_final_file_name() -> String {
    "arquivo_traduzido_final.pdf".to_string()
}

// A4
fn default_page_width() -> f32 {
    595.28
}

fn default_page_height() -> f32 {
    841.89
}

// 15 mm
fn default_margin() -> f32 {
    42.5
}

fn default_font_size() -> f32 {
    12.0
}

fn default_heading_font_size() -> f32 {
    16.0
}

fn default_line_height() -> f32 {
    14.0
}

fn default_heading_template() -> String {
    "Page {page}".to_string()
}

fn default_max_chars_per_request() -> usize {
    4000
}

fn default_max_chars_for(provider: &TranslationProvider) -> usize {
    match provider {
        // The public endpoint refuses much larger payloads
        TranslationProvider::Google => 5000,
        TranslationProvider::Anthropic => 8000,
        _ => default_max_chars_per_request(),
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_timeout_for(provider: &TranslationProvider) -> u64 {
    match provider {
        TranslationProvider::Google => default_timeout_secs(),
        _ => 120,
    }
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Google => "https://translate.googleapis.com".to_string(),
        TranslationProvider::Ollama => "http://localhost:11434".to_string(),
        TranslationProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        TranslationProvider::Anthropic => "https://api.anthropic.com".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        TranslationProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Google => String::new(),
        TranslationProvider::Ollama => "llama3.2:3b".to_string(),
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        TranslationProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following document page from {source_language} to {target_language}. Keep the line breaks. Only respond with the translated text, without any explanations or notes.".to_string()
}

impl Config {
    /// Load the configuration from a JSON file, writing the defaults first when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        if self.source_language != AUTO_LANGUAGE {
            crate::language_utils::validate_language_code(&self.source_language)
                .context("Invalid source language")?;
        }
        if self.target_language == AUTO_LANGUAGE {
            return Err(anyhow!("Target language cannot be '{}'", AUTO_LANGUAGE));
        }
        crate::language_utils::validate_language_code(&self.target_language)
            .context("Invalid target language")?;
        if crate::language_utils::language_codes_match(&self.source_language, &self.target_language) {
            warn!("Source and target language are both '{}'", self.target_language);
        }

        if self.pipeline.max_pages_per_chunk == 0 {
            return Err(anyhow!("max_pages_per_chunk must be at least 1"));
        }

        let final_name = self.pipeline.final_file_name.trim();
        if final_name.is_empty() || !final_name.to_lowercase().ends_with(".pdf") {
            return Err(anyhow!("final_file_name must be a .pdf file name, got '{}'", self.pipeline.final_file_name));
        }

        self.render.validate()?;

        // Validate API key for the hosted LLM providers
        match self.translation.provider {
            TranslationProvider::OpenAI | TranslationProvider::Anthropic => {
                if self.translation.get_api_key().is_empty() {
                    return Err(anyhow!(
                        "Translation API key is required for {} provider",
                        self.translation.provider.display_name()
                    ));
                }
            },
            _ => {}
        }

        Ok(())
    }

    /// Resolve the output directory for an input file, or for an input directory
    pub fn resolve_output_dir(&self, input_path: &Path) -> PathBuf {
        let output_dir = PathBuf::from(&self.output_dir);
        if output_dir.is_absolute() {
            return output_dir;
        }
        if input_path.is_dir() {
            return input_path.join(output_dir);
        }
        input_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(output_dir)
    }
}

impl RenderConfig {
    /// Check that the page geometry leaves room for a heading and at least one body line
    pub fn validate(&self) -> Result<()> {
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(anyhow!("Page size must be positive"));
        }
        if self.font_size <= 0.0 || self.heading_font_size <= 0.0 || self.line_height <= 0.0 {
            return Err(anyhow!("Font sizes and line height must be positive"));
        }
        if self.margin < 0.0 {
            return Err(anyhow!("Margin cannot be negative"));
        }
        let writable_width = self.page_width - 2.0 * self.margin;
        let writable_height = self.page_height - 2.0 * self.margin;
        if writable_width <= self.font_size
            || writable_height < self.heading_font_size + 2.0 * self.line_height
        {
            return Err(anyhow!("Margins leave no writable area on the page"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            output_dir: default_output_dir(),
            pipeline: PipelineConfig::default(),
            render: RenderConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created with defaults when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }
        default_model(&self.provider)
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }
        default_endpoint(&self.provider)
    }

    /// Get the max chars per request for the active provider
    pub fn get_max_chars_per_request(&self) -> usize {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.max_chars_per_request > 0 {
                return provider_config.max_chars_per_request;
            }
        }
        default_max_chars_for(&self.provider)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }
        default_timeout_for(&self.provider)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Google),
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
