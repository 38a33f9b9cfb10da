// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use pdf_chunk_translator::app_config::{self, Config, TranslationProvider};
use pdf_chunk_translator::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a PDF file or a directory of PDFs (default command)
    Translate(TranslateArgs),

    /// Check that the configured provider is reachable and can translate
    Check(CommonArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that loads the configuration
#[derive(clap::Args, Debug, Clone)]
struct CommonArgs {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation (LLM providers)
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the provider
    #[arg(long, env = "PDF_TRANSLATOR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr', or 'auto')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'pt', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(clap::Args, Debug, Clone)]
struct TranslateArgs {
    /// Input PDF file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

#[derive(clap::Args, Debug, Clone)]
struct TranslateOptions {
    /// Output directory (relative paths resolve against the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Maximum number of pages per chunk
    #[arg(short = 'k', long)]
    max_pages: Option<usize>,

    /// Extract page text without translation
    #[arg(short, long)]
    extract_only: bool,

    /// Delete chunk and translated part files after the final document is written
    #[arg(long)]
    clean: bool,

    #[command(flatten)]
    common: CommonArgs,
}

/// pdf-chunk-translator - page-by-page PDF translation
///
/// Splits a PDF into chunks of pages, translates the text of every page and
/// assembles the translated pages into one document.
#[derive(Parser, Debug)]
#[command(name = "pdf-chunk-translator")]
#[command(version)]
#[command(about = "Translate PDF documents page by page, in chunks")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "pdf-chunk-translator splits a PDF into chunks of pages, translates the text of each page and assembles the result.

EXAMPLES:
    pdf-chunk-translator report.pdf                     # Translate to Portuguese with Google Translate
    pdf-chunk-translator -t es -k 5 report.pdf          # Spanish, 5 pages per chunk
    pdf-chunk-translator -p ollama -m llama3.2:3b a.pdf # Use a local LLM
    pdf-chunk-translator -e report.pdf                  # Extract page text only
    pdf-chunk-translator --clean /papers/               # Every PDF of a directory, no intermediates
    pdf-chunk-translator check -p openai                # Test the provider connection
    pdf-chunk-translator completions bash > pct.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google    - Google Translate public endpoint, no key (default)
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input PDF file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The max level set through `log::set_max_level` is the effective filter
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the configured level is applied once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pdf-chunk-translator", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Check(args)) => run_check(args).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - the top-level args are the translate args
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(TranslateArgs {
                input_path,
                options: cli.options,
            })
            .await
        }
    }
}

/// Load the config file, apply command line overrides, validate and set the log level
fn load_config(options: &CommonArgs) -> Result<Config> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }

    Ok(config)
}

fn apply_config(config: &Config) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());
    Ok(())
}

async fn run_check(options: CommonArgs) -> Result<()> {
    let config = load_config(&options)?;
    apply_config(&config)?;

    let controller = Controller::with_config(config)?;
    controller.check_connection().await?;
    Ok(())
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let options = args.options;
    let mut config = load_config(&options.common)?;
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.to_string_lossy().to_string();
    }
    if let Some(max_pages) = options.max_pages {
        config.pipeline.max_pages_per_chunk = max_pages;
    }
    if options.clean {
        config.pipeline.keep_intermediate_files = false;
    }
    apply_config(&config)?;

    let input_path = args.input_path;
    if !input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }
    let output_dir = config.resolve_output_dir(&input_path);
    let controller = Controller::with_config(config)?;

    if options.extract_only {
        if input_path.is_dir() {
            return Err(anyhow!("--extract-only takes a single PDF file"));
        }
        controller.extract_only(&input_path, &output_dir, options.force_overwrite)?;
        return Ok(());
    }

    if input_path.is_dir() {
        let summary = controller
            .run_folder(&input_path, &output_dir, options.force_overwrite)
            .await?;
        if summary.failed > 0 && summary.succeeded == 0 && summary.skipped == 0 {
            return Err(anyhow!("No file could be translated"));
        }
    } else if let Some(report) = controller
        .run(input_path, output_dir, options.force_overwrite)
        .await?
    {
        info!(
            "{} source page(s), {} output page(s), {} chunk(s)",
            report.source_pages,
            report.final_pages,
            report.chunk_paths.len()
        );
    }

    Ok(())
}
