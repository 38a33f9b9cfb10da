use lopdf::{Dictionary, Document, Object, ObjectId};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{load_document, save_document};
use crate::errors::PdfError;

/// Concatenate the pages of `inputs`, in order, into a single document at `output`.
///
/// Returns the number of pages written. Nothing is deduplicated or reordered.
pub fn merge_pdfs<P: AsRef<Path>>(inputs: &[PathBuf], output: P) -> Result<u32, PdfError> {
    if inputs.is_empty() {
        return Err(PdfError::NothingToAssemble);
    }

    let mut next_id: u32 = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for input in inputs {
        let mut doc = load_document(input)?;
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        let page_count_before = pages.len();
        for (_, page_id) in doc.get_pages() {
            let page = doc
                .get_dictionary(page_id)
                .map_err(|e| PdfError::Malformed(format!("{}: page {:?}: {}", input.display(), page_id, e)))?
                .clone();
            pages.push((page_id, page));
        }
        debug!("Queued {} page(s) from {}", pages.len() - page_count_before, input.display());

        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or("") {
                "Catalog" | "Pages" | "Page" | "Outlines" | "Outline" => {}
                _ => {
                    objects.insert(object_id, object);
                }
            }
        }
    }

    let mut merged = Document::with_version("1.5");
    merged.objects.extend(objects);
    merged.max_id = next_id - 1;

    let pages_id = merged.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", Object::Reference(pages_id));
        merged.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as u32;
    merged.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(i64::from(page_count))),
        ])),
    );

    let catalog_id = merged.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    merged.renumber_objects();
    merged.compress();
    save_document(&mut merged, output)?;

    Ok(page_count)
}
