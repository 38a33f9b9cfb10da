/*!
 * PDF handling for the translation pipeline.
 *
 * - `extractor`: per-page plain text extraction
 * - `splitter`: page-count windows written as standalone chunk files
 * - `layout`: Helvetica metrics, WinAnsi encoding and word wrapping
 * - `renderer`: plain-text pages with a "Page N" heading
 * - `assembler`: concatenation of the translated chunk files
 *
 * Everything here is built on `lopdf` and is synchronous.
 */

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

use crate::errors::PdfError;

pub mod assembler;
pub mod extractor;
pub mod layout;
pub mod renderer;
pub mod splitter;

pub use assembler::merge_pdfs;
pub use extractor::{extract_page_texts, SourcePage};
pub use renderer::{render_pages, write_translated_pdf};
pub use splitter::{plan_chunks, split_pdf, ChunkPlan};

// Page attributes a page may inherit from its page tree ancestors
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

// Guards against page trees with a Parent cycle
const MAX_TREE_DEPTH: usize = 64;

/// Open a PDF file.
///
/// Inherited page attributes are copied onto every page, so each page stands on its
/// own when it is extracted, split off or merged into another document.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document, PdfError> {
    let path = path.as_ref();
    let mut doc = Document::load(path).map_err(|e| PdfError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    flatten_page_attributes(&mut doc);
    Ok(doc)
}

/// Copy the attributes every page inherits from its `Pages` ancestors onto the page itself
pub fn flatten_page_attributes(doc: &mut Document) {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in page_ids {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let mut page = page.clone();
        if inherit_page_attributes(doc, &mut page) {
            doc.objects.insert(page_id, Object::Dictionary(page));
        }
    }
}

/// Copy inherited attributes missing on `page` from its page tree ancestors.
///
/// Returns whether anything was copied. The nearest ancestor wins.
fn inherit_page_attributes(doc: &Document, page: &mut Dictionary) -> bool {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    let mut changed = false;

    while let Some(parent_id) = parent {
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                    changed = true;
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    changed
}

/// Write a document, creating the parent directory when needed
pub fn save_document<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<(), PdfError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    doc.save(path).map_err(|e| PdfError::Save {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Number of pages in a PDF file
pub fn page_count<P: AsRef<Path>>(path: P) -> Result<u32, PdfError> {
    let doc = load_document(path)?;
    Ok(doc.get_pages().len() as u32)
}
