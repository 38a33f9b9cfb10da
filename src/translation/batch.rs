/*!
 * Page-by-page translation of a chunk.
 *
 * Pages are translated strictly in order, one provider call per page
 * (more if a page exceeds the provider's request limit). The first
 * failure aborts the chunk.
 */

use log::{debug, error};
use std::time::Instant;

use crate::errors::TranslationError;
use crate::pdf::SourcePage;

use super::core::{TokenUsageStats, TranslationService};

/// Translated text of every page of a chunk, in source order
#[derive(Debug, Clone)]
pub struct TranslatedChunk {
    /// One entry per source page; blank pages map to an empty string
    pub texts: Vec<String>,
    /// Usage accumulated over the chunk
    pub usage: TokenUsageStats,
}

/// Translator for the pages of one chunk
pub struct PageTranslator<'a> {
    /// The translation service to use
    service: &'a TranslationService,
    source_language: String,
    target_language: String,
}

impl<'a> PageTranslator<'a> {
    /// Create a new page translator
    pub fn new(
        service: &'a TranslationService,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            service,
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Translate every page, calling `progress_callback(done, total)` after each one
    pub async fn translate_pages(
        &self,
        pages: &[SourcePage],
        progress_callback: impl Fn(usize, usize),
    ) -> Result<TranslatedChunk, TranslationError> {
        let mut usage = self.service.new_usage_stats();
        let mut texts = Vec::with_capacity(pages.len());
        let total = pages.len();

        for (index, page) in pages.iter().enumerate() {
            if page.is_blank() {
                debug!("Page {} has no text, nothing to translate", page.number);
                texts.push(String::new());
            } else {
                let start_time = Instant::now();
                let (translated, page_usage) = self
                    .service
                    .translate_text_with_usage(&page.text, &self.source_language, &self.target_language)
                    .await
                    .map_err(|e| {
                        error!("Translation of page {} failed: {}", page.number, e);
                        e
                    })?;
                usage.record(&page_usage);
                debug!(
                    "Page {} translated ({} -> {} chars) in {:?}",
                    page.number,
                    page.text.chars().count(),
                    translated.chars().count(),
                    start_time.elapsed()
                );
                texts.push(translated);
            }
            progress_callback(index + 1, total);
        }

        Ok(TranslatedChunk { texts, usage })
    }
}
