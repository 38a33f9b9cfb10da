/*!
 * Tests for PDF splitting, extraction, rendering and merging
 */

use anyhow::Result;

use pdf_chunk_translator::app_config::RenderConfig;
use pdf_chunk_translator::errors::PdfError;
use pdf_chunk_translator::pdf::{
    extract_page_texts, merge_pdfs, page_count, render_pages, split_pdf,
    write_translated_pdf,
};
use crate::common;

/// A 25-page document with chunk size 10 becomes chunks of 10, 10 and 5 pages
#[test]
fn test_splitPdf_with25Pages_shouldWriteThreeChunksInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_pdf(temp_dir.path(), "book.pdf", 25)?;
    let out = temp_dir.path().join("out");

    let chunks = split_pdf(&source, &out, 10)?;

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0], out.join("book_part0.pdf"));
    assert_eq!(chunks[2], out.join("book_part2.pdf"));
    let counts: Vec<u32> = chunks.iter().map(|c| common::page_count(c)).collect();
    assert_eq!(counts, vec![10, 10, 5]);

    let second = extract_page_texts(&chunks[1])?;
    assert_eq!(second.len(), 10);
    assert_eq!(second[0].number, 1);
    assert!(second[0].text.contains(&common::page_text(11)));
    assert!(second[9].text.contains(&common::page_text(20)));

    let last = extract_page_texts(&chunks[2])?;
    assert!(last[4].text.contains(&common::page_text(25)));
    Ok(())
}

/// Pages spread over intermediate `Pages` nodes split the same way and keep their text
#[test]
fn test_splitPdf_withNestedPageTree_shouldKeepTextInEveryChunk() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_nested_test_pdf(temp_dir.path(), "nested.pdf", 25, 4)?;
    let out = temp_dir.path().join("out");

    let chunks = split_pdf(&source, &out, 10)?;

    let counts: Vec<u32> = chunks.iter().map(|c| common::page_count(c)).collect();
    assert_eq!(counts, vec![10, 10, 5]);

    for (index, chunk) in chunks.iter().enumerate() {
        let pages = extract_page_texts(chunk)?;
        for page in &pages {
            let source_number = index as u32 * 10 + page.number;
            assert!(
                page.text.contains(&common::page_text(source_number)),
                "chunk {} page {} lost its text: {:?}",
                index,
                page.number,
                page.text
            );
        }
    }
    Ok(())
}

/// A chunk size of zero is rejected before anything is written
#[test]
fn test_splitPdf_withZeroChunkSize_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_pdf(temp_dir.path(), "book.pdf", 3)?;
    let out = temp_dir.path().join("out");

    let result = split_pdf(&source, &out, 0);
    assert!(matches!(result, Err(PdfError::InvalidChunkSize(0))));
    assert!(!out.exists());
    Ok(())
}

/// A document without pages produces no chunk
#[test]
fn test_splitPdf_withNoPages_shouldProduceNoChunk() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_pdf(temp_dir.path(), "empty.pdf", 0)?;

    let chunks = split_pdf(&source, temp_dir.path().join("out"), 10)?;
    assert!(chunks.is_empty());
    Ok(())
}

/// Loading garbage fails with a load error naming the file
#[test]
fn test_extractPageTexts_withInvalidFile_shouldFailToLoad() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.pdf", "not a pdf at all")?;

    match extract_page_texts(&path) {
        Err(PdfError::Load { path: failed, .. }) => assert!(failed.ends_with("broken.pdf")),
        other => panic!("expected a load error, got {:?}", other),
    }
    Ok(())
}

/// Font resources inherited from the page tree are honoured, whether the root or an
/// intermediate node carries them
#[test]
fn test_extractPageTexts_withInheritedInlineResources_shouldFindText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let flat = common::create_test_pdf(temp_dir.path(), "flat.pdf", 3)?;
    let nested = common::create_nested_test_pdf(temp_dir.path(), "nested.pdf", 7, 2)?;

    for (path, expected) in [(flat, 3), (nested, 7)] {
        let pages = extract_page_texts(&path)?;
        assert_eq!(pages.len(), expected);
        for page in &pages {
            assert!(!page.is_blank(), "{} page {} is blank", path.display(), page.number);
            assert!(page.text.contains(&common::page_text(page.number)));
        }
    }
    Ok(())
}

/// Merging a nested document keeps its text readable
#[test]
fn test_mergePdfs_withNestedPageTree_shouldKeepText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let nested = common::create_nested_test_pdf(dir, "nested.pdf", 5, 2)?;
    let flat = common::create_test_pdf(dir, "flat.pdf", 1)?;
    let output = dir.join("merged.pdf");

    assert_eq!(merge_pdfs(&[nested, flat], &output)?, 6);

    let texts = extract_page_texts(&output)?;
    assert!(texts[3].text.contains(&common::page_text(4)));
    assert!(texts[5].text.contains(&common::page_text(1)));
    Ok(())
}

/// Blank pages are kept with empty text
#[test]
fn test_extractPageTexts_withBlankPage_shouldKeepIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_pdf_with(temp_dir.path(), "mixed.pdf", 3, |n| {
        if n == 2 { String::new() } else { common::page_text(n) }
    })?;

    let pages = extract_page_texts(&source)?;
    assert_eq!(pages.len(), 3);
    assert!(pages[1].is_blank());
    assert!(!pages[2].is_blank());
    Ok(())
}

/// Rendered pages carry the heading and the text, and read back through the extractor
#[test]
fn test_writeTranslatedPdf_shouldBeReadableByExtractor() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("rendered.pdf");
    let texts = vec!["Primeira pagina".to_string(), String::new()];

    let written = write_translated_pdf(&texts, 31, &RenderConfig::default(), &path)?;
    assert_eq!(written, 2);

    let pages = extract_page_texts(&path)?;
    assert_eq!(pages.len(), 2);
    assert!(pages[0].text.contains("Page 31"));
    assert!(pages[0].text.contains("Primeira pagina"));
    assert!(pages[1].text.contains("Page 32"));
    Ok(())
}

/// Text longer than a page continues on extra pages
#[test]
fn test_renderPages_withLongText_shouldAddOverflowPages() {
    let long_text = (1..=150).map(|i| format!("Linha número {}", i)).collect::<Vec<_>>().join("\n");
    let doc = render_pages(&[long_text, "curta".to_string()], 1, &RenderConfig::default()).unwrap();
    assert!(doc.get_pages().len() >= 3);
}

/// Merging keeps every page, in input order
#[test]
fn test_mergePdfs_shouldConcatenateInInputOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let first = common::create_test_pdf_with(dir, "first.pdf", 2, |n| format!("First file page {}", n))?;
    let second = common::create_test_pdf_with(dir, "second.pdf", 3, |n| format!("Second file page {}", n))?;
    let output = dir.join("merged").join("all.pdf");

    let pages = merge_pdfs(&[second.clone(), first.clone()], &output)?;
    assert_eq!(pages, 5);
    assert_eq!(page_count(&output)?, 5);

    let texts = extract_page_texts(&output)?;
    assert!(texts[0].text.contains("Second file page 1"));
    assert!(texts[2].text.contains("Second file page 3"));
    assert!(texts[3].text.contains("First file page 1"));
    assert!(texts[4].text.contains("First file page 2"));
    Ok(())
}

/// Merging the rendered output of several chunks adds up their page counts
#[test]
fn test_mergePdfs_withRenderedChunks_shouldSumPageCounts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let config = RenderConfig::default();

    let a = dir.join("a.pdf");
    let b = dir.join("b.pdf");
    let a_pages = write_translated_pdf(&vec!["x".to_string(); 4], 1, &config, &a)?;
    let b_pages = write_translated_pdf(&vec!["y".to_string(); 2], 5, &config, &b)?;

    let merged = merge_pdfs(&[a, b], dir.join("final.pdf"))?;
    assert_eq!(merged, a_pages + b_pages);

    let texts = extract_page_texts(dir.join("final.pdf"))?;
    assert!(texts[4].text.contains("Page 5"));
    Ok(())
}
