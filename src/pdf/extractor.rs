use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::load_document;
use crate::errors::PdfError;

static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n{3,}").expect("blank line pattern is valid")
});

/// Text content of one source page
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePage {
    /// 1-based page number inside the document it was read from
    pub number: u32,
    /// Extracted plain text, possibly empty
    pub text: String,
}

impl SourcePage {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract the text of every page of a PDF file, in page order
pub fn extract_page_texts<P: AsRef<Path>>(path: P) -> Result<Vec<SourcePage>, PdfError> {
    let doc = load_document(path)?;
    extract_document_texts(&doc)
}

/// Extract the text of every page of a loaded document.
///
/// A page without text yields an empty string; it is never skipped.
pub fn extract_document_texts(doc: &Document) -> Result<Vec<SourcePage>, PdfError> {
    doc.get_pages()
        .keys()
        .map(|&number| {
            let raw = doc.extract_text(&[number]).map_err(|e| PdfError::Extraction {
                page: number,
                message: e.to_string(),
            })?;
            Ok(SourcePage {
                number,
                text: normalize_page_text(&raw),
            })
        })
        .collect()
}

/// Unify line endings, trim line ends and collapse long runs of blank lines
pub fn normalize_page_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed_lines = unified
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    EXCESS_BLANK_LINES
        .replace_all(trimmed_lines.trim_matches('\n'), "\n\n")
        .into_owned()
}
