use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;

use super::layout::{to_win_ansi, wrap_text};
use super::save_document;
use crate::app_config::RenderConfig;
use crate::errors::PdfError;

const FONT_RESOURCE: &str = "F1";

/// One line of text placed on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
}

/// Everything drawn on one output page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Source page this output page belongs to
    pub source_page: u32,
    pub lines: Vec<PlacedLine>,
}

/// Lay out translated page texts.
///
/// Every text opens a new page with its heading; body lines that do not fit
/// continue on extra pages without a heading. `first_page_number` is the source
/// page number used in the first heading.
pub fn layout_pages(texts: &[String], first_page_number: u32, config: &RenderConfig) -> Vec<PageLayout> {
    let x = config.margin;
    let top = config.page_height - config.margin;
    let bottom = config.margin;
    let max_width = config.page_width - 2.0 * config.margin;

    let mut pages = Vec::with_capacity(texts.len());
    for (offset, text) in texts.iter().enumerate() {
        let source_page = first_page_number + offset as u32;

        let heading_y = top - config.heading_font_size;
        let mut page = PageLayout {
            source_page,
            lines: vec![PlacedLine {
                text: config.heading_for(source_page),
                font_size: config.heading_font_size,
                x,
                y: heading_y,
            }],
        };
        let mut y = heading_y - config.line_height * 1.5;

        for line in wrap_text(text, max_width, config.font_size) {
            if y < bottom {
                pages.push(std::mem::replace(&mut page, PageLayout {
                    source_page,
                    lines: Vec::new(),
                }));
                y = top - config.font_size;
            }
            if !line.is_empty() {
                page.lines.push(PlacedLine {
                    text: line,
                    font_size: config.font_size,
                    x,
                    y,
                });
            }
            y -= config.line_height;
        }
        pages.push(page);
    }
    pages
}

/// Render translated texts into a new document, one or more pages per text
pub fn render_pages(texts: &[String], first_page_number: u32, config: &RenderConfig) -> Result<Document, PdfError> {
    let layouts = layout_pages(texts, first_page_number, config);
    build_document(&layouts, config)
}

/// Render translated texts and write them to `path`; returns the number of pages written
pub fn write_translated_pdf<P: AsRef<Path>>(
    texts: &[String],
    first_page_number: u32,
    config: &RenderConfig,
    path: P,
) -> Result<u32, PdfError> {
    let mut doc = render_pages(texts, first_page_number, config)?;
    let pages = doc.get_pages().len() as u32;
    save_document(&mut doc, path)?;
    Ok(pages)
}

fn build_document(layouts: &[PageLayout], config: &RenderConfig) -> Result<Document, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([(FONT_RESOURCE, Object::Reference(font_id))])),
    )]));
    let media_box = Object::Array(vec![
        0.into(),
        0.into(),
        config.page_width.into(),
        config.page_height.into(),
    ]);

    let mut kids: Vec<Object> = Vec::with_capacity(layouts.len());
    for layout in layouts {
        let page_id = add_page(&mut doc, layout, pages_id, resources_id, &media_box)?;
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ])),
    );

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.compress();

    Ok(doc)
}

fn add_page(
    doc: &mut Document,
    layout: &PageLayout,
    pages_id: ObjectId,
    resources_id: ObjectId,
    media_box: &Object,
) -> Result<ObjectId, PdfError> {
    let mut operations = Vec::with_capacity(layout.lines.len() * 5);
    for line in &layout.lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec![FONT_RESOURCE.into(), line.font_size.into()]));
        operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(&line.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    let content = Content { operations }
        .encode()
        .map_err(|e| PdfError::Malformed(format!("Failed to encode page content: {}", e)))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));

    Ok(doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Reference(resources_id)),
        ("MediaBox", media_box.clone()),
    ])))
}
