use log::debug;
use std::path::{Path, PathBuf};

use super::{load_document, save_document};
use crate::errors::PdfError;
use crate::file_utils::FileManager;

/// One page window of the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    /// 0-based chunk index, used in the `_part<index>` file name
    pub index: usize,
    /// First source page, 1-based and inclusive
    pub first_page: u32,
    /// Last source page, 1-based and inclusive
    pub last_page: u32,
}

impl ChunkPlan {
    pub fn page_count(&self) -> u32 {
        self.last_page - self.first_page + 1
    }

    pub fn contains(&self, page_number: u32) -> bool {
        (self.first_page..=self.last_page).contains(&page_number)
    }
}

/// Cut `total_pages` into consecutive windows of at most `max_pages` pages
pub fn plan_chunks(total_pages: u32, max_pages: usize) -> Result<Vec<ChunkPlan>, PdfError> {
    if max_pages == 0 {
        return Err(PdfError::InvalidChunkSize(max_pages));
    }
    let window = u32::try_from(max_pages).unwrap_or(u32::MAX);

    let mut plans = Vec::new();
    let mut first_page = 1;
    while first_page <= total_pages {
        let last_page = first_page.saturating_add(window - 1).min(total_pages);
        plans.push(ChunkPlan {
            index: plans.len(),
            first_page,
            last_page,
        });
        first_page = last_page + 1;
    }
    Ok(plans)
}

/// Split a PDF into `<stem>_part<N>.pdf` files of at most `max_pages` pages each.
///
/// Returns the chunk paths in chunk order. A document without pages yields no chunk.
pub fn split_pdf<P1: AsRef<Path>, P2: AsRef<Path>>(
    source: P1,
    output_dir: P2,
    max_pages: usize,
) -> Result<Vec<PathBuf>, PdfError> {
    let source = source.as_ref();
    let output_dir = output_dir.as_ref();

    if max_pages == 0 {
        return Err(PdfError::InvalidChunkSize(max_pages));
    }

    let doc = load_document(source)?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let plans = plan_chunks(page_numbers.len() as u32, max_pages)?;

    std::fs::create_dir_all(output_dir)?;

    let mut chunk_paths = Vec::with_capacity(plans.len());
    for plan in plans {
        let mut part = doc.clone();
        let outside: Vec<u32> = page_numbers
            .iter()
            .copied()
            .filter(|number| !plan.contains(*number))
            .collect();
        part.delete_pages(&outside);
        part.prune_objects();
        part.renumber_objects();
        part.compress();

        let chunk_path = FileManager::chunk_path(source, output_dir, plan.index);
        save_document(&mut part, &chunk_path)?;
        debug!(
            "Wrote pages {}-{} to {}",
            plan.first_page,
            plan.last_page,
            chunk_path.display()
        );
        chunk_paths.push(chunk_path);
    }

    Ok(chunk_paths)
}
