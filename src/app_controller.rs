use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::{FileManager, FileType};
use crate::pdf::{extract_page_texts, merge_pdfs, split_pdf, write_translated_pdf};
use crate::translation::{PageTranslator, TokenUsageStats, TranslationService};

// @module: Application controller for the chunked PDF translation pipeline

/// Files and figures produced by one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Chunk files, in page order
    pub chunk_paths: Vec<PathBuf>,
    /// Translated chunk files, one per chunk
    pub translated_paths: Vec<PathBuf>,
    /// The assembled document
    pub final_path: PathBuf,
    /// Pages in the source document
    pub source_pages: u32,
    /// Pages in the final document (overflow pages included)
    pub final_pages: u32,
    /// Wall-clock time of the run
    pub elapsed: Duration,
    /// Provider usage over all chunks
    pub token_usage: TokenUsageStats,
}

/// Outcome counts of a directory run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for PDF translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Service built from `config.translation`
    service: TranslationService,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(config.translation.clone())
            .context("Failed to create the translation service")?;
        Ok(Self { config, service })
    }

    /// Create a controller around an existing service (tests use a mock provider)
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        Self { config, service }
    }

    /// The configuration this controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check the provider is reachable and can translate a short sentence
    pub async fn check_connection(&self) -> Result<String> {
        info!(
            "Checking {} ({})",
            self.service.provider_name(),
            self.config.translation.get_endpoint()
        );
        self.service
            .test_connection()
            .await
            .with_context(|| format!("Failed to connect to {}", self.service.provider_name()))?;

        let sample = self
            .service
            .test_translation(&self.config.source_language, &self.config.target_language)
            .await
            .context("Test translation failed")?;
        info!("Connection OK, sample translation: {}", sample);
        Ok(sample)
    }

    /// Translate one PDF. Returns `None` when the final file already exists and
    /// `force_overwrite` is off.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        force_overwrite: bool,
    ) -> Result<Option<PipelineReport>> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Option<PipelineReport>> {
        let start_time = Instant::now();
        Self::ensure_pdf(input_file)?;

        let final_path = output_dir.join(&self.config.pipeline.final_file_name);
        if FileManager::file_exists(&final_path) && !force_overwrite {
            warn!(
                "Skipping {}, {} already exists (use -f to force overwrite)",
                input_file.display(),
                final_path.display()
            );
            return Ok(None);
        }
        FileManager::ensure_dir(output_dir)?;

        info!(
            "📄 {} → {} ({} → {}, {})",
            input_file.display(),
            final_path.display(),
            self.config.source_language,
            self.config.target_language,
            self.service.provider_name()
        );

        // Split
        let stage_start = Instant::now();
        let max_pages = self.config.pipeline.max_pages_per_chunk;
        let chunk_paths = split_pdf(input_file, output_dir, max_pages)
            .with_context(|| format!("Failed to split {}", input_file.display()))?;
        if chunk_paths.is_empty() {
            return Err(anyhow!("{} has no pages to translate", input_file.display()));
        }
        info!(
            "Split into {} chunk(s) of up to {} pages in {}",
            chunk_paths.len(),
            max_pages,
            Self::format_duration(stage_start.elapsed())
        );

        // Translate and render each chunk
        let stage_start = Instant::now();
        let chunk_bar = multi_progress.add(ProgressBar::new(chunk_paths.len() as u64));
        chunk_bar.set_style(Self::bar_style("chunks"));
        chunk_bar.set_message("Translating");

        let translator = PageTranslator::new(
            &self.service,
            self.config.source_language.as_str(),
            self.config.target_language.as_str(),
        );
        let mut token_usage = self.service.new_usage_stats();
        let mut translated_paths = Vec::with_capacity(chunk_paths.len());
        let mut next_page_number: u32 = 1;

        for (index, chunk_path) in chunk_paths.iter().enumerate() {
            let mut pages = extract_page_texts(chunk_path)
                .with_context(|| format!("Failed to read chunk {}", chunk_path.display()))?;
            for page in pages.iter_mut() {
                page.number += next_page_number - 1;
            }

            let page_bar = multi_progress.add(ProgressBar::new(pages.len() as u64));
            page_bar.set_style(Self::bar_style("pages"));
            page_bar.set_message(format!("Chunk {}/{}", index + 1, chunk_paths.len()));

            let progress = page_bar.clone();
            let result = translator
                .translate_pages(&pages, move |done, _total| progress.set_position(done as u64))
                .await;
            page_bar.finish_and_clear();
            let translated = match result {
                Ok(translated) => translated,
                Err(e) => {
                    chunk_bar.abandon();
                    return Err(e).with_context(|| {
                        format!("Translation of chunk {} ({}) failed", index, chunk_path.display())
                    });
                }
            };

            let translated_path = FileManager::translated_path(chunk_path, output_dir);
            let rendered_pages = write_translated_pdf(
                &translated.texts,
                self.config.render.first_heading_number(next_page_number),
                &self.config.render,
                &translated_path,
            )
            .with_context(|| format!("Failed to write {}", translated_path.display()))?;
            debug!(
                "Chunk {}: {} source page(s) rendered on {} page(s) in {}",
                index,
                pages.len(),
                rendered_pages,
                translated_path.display()
            );

            token_usage.merge(&translated.usage);
            translated_paths.push(translated_path);
            next_page_number += pages.len() as u32;
            chunk_bar.inc(1);
        }
        chunk_bar.finish_and_clear();
        let source_pages = next_page_number - 1;
        info!(
            "Translated {} page(s) in {}",
            source_pages,
            Self::format_duration(stage_start.elapsed())
        );

        // Assemble
        let stage_start = Instant::now();
        let final_pages = merge_pdfs(&translated_paths, &final_path)
            .with_context(|| format!("Failed to assemble {}", final_path.display()))?;
        info!(
            "Assembled {} page(s) in {}",
            final_pages,
            Self::format_duration(stage_start.elapsed())
        );

        if !self.config.pipeline.keep_intermediate_files {
            let intermediates: Vec<PathBuf> = chunk_paths
                .iter()
                .chain(translated_paths.iter())
                .cloned()
                .collect();
            let removed = FileManager::remove_files(&intermediates)?;
            debug!("Removed {} intermediate file(s)", removed);
        }

        if token_usage.requests > 0 {
            info!("🔢 {}", token_usage.summary());
        }
        let elapsed = start_time.elapsed();
        info!("✅ Success: {} ({})", final_path.display(), Self::format_duration(elapsed));

        Ok(Some(PipelineReport {
            chunk_paths,
            translated_paths,
            final_path,
            source_pages,
            final_pages,
            elapsed,
            token_usage,
        }))
    }

    /// Write every page's text to `<output_dir>/<stem>.txt` without translating
    pub fn extract_only(&self, input_file: &Path, output_dir: &Path, force_overwrite: bool) -> Result<Option<PathBuf>> {
        Self::ensure_pdf(input_file)?;

        let output_path = FileManager::sibling_output_path(input_file, output_dir, "txt");
        if FileManager::file_exists(&output_path) && !force_overwrite {
            warn!(
                "Skipping extraction, {} already exists (use -f to force overwrite)",
                output_path.display()
            );
            return Ok(None);
        }

        let pages = extract_page_texts(input_file)
            .with_context(|| format!("Failed to extract text from {}", input_file.display()))?;
        let mut content = String::new();
        for page in &pages {
            content.push_str(&self.config.render.heading_for(page.number));
            content.push_str("\n\n");
            content.push_str(&page.text);
            content.push_str("\n\n");
        }
        FileManager::write_to_file(&output_path, &content)?;

        info!("Extracted {} page(s) to {}", pages.len(), output_path.display());
        Ok(Some(output_path))
    }

    /// Translate every PDF under `input_dir`, each into `<output_root>/<stem>/`.
    ///
    /// A failing file is logged and counted; the others still run.
    pub async fn run_folder(&self, input_dir: &Path, output_root: &Path, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_source_pdfs(input_dir, Some(output_root))?;
        if files.is_empty() {
            return Err(anyhow!("No PDF files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_bar = multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_bar.set_style(Self::bar_style("files"));

        let mut summary = FolderSummary::default();
        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_bar.set_message(format!("Processing: {}", file_name));

            let stem = file.file_stem().unwrap_or_default();
            let output_dir = output_root.join(stem);
            match self
                .run_with_progress(file, &output_dir, &multi_progress, force_overwrite)
                .await
            {
                Ok(Some(_)) => summary.succeeded += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            folder_bar.inc(1);
        }
        folder_bar.finish_and_clear();

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors ({})",
            summary.succeeded,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );
        Ok(summary)
    }

    fn ensure_pdf(input_file: &Path) -> Result<(), AppError> {
        let file_type = FileManager::detect_file_type(input_file).map_err(|e| AppError::File(e.to_string()))?;
        match file_type {
            FileType::Pdf => Ok(()),
            FileType::Unknown => Err(AppError::File(format!("Not a PDF file: {}", input_file.display()))),
        }
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
