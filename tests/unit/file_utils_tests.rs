/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use pdf_chunk_translator::file_utils::{FileManager, FileType};
use crate::common;

/// Chunk and translated file names follow the `_part<N>` / `_translated` convention
#[test]
fn test_outputPaths_shouldFollowNamingConvention() {
    let out = Path::new("/tmp/out");
    let chunk = FileManager::chunk_path("/docs/report.pdf", out, 2);
    assert_eq!(chunk, out.join("report_part2.pdf"));
    assert_eq!(FileManager::translated_path(&chunk, out), out.join("report_part2_translated.pdf"));
    assert_eq!(FileManager::sibling_output_path("/docs/report.pdf", out, "txt"), out.join("report.txt"));
}

/// Generated files are recognised, ordinary names are not
#[test]
fn test_isGeneratedFile_shouldRecogniseOwnOutputs() {
    assert!(FileManager::is_generated_file("report_part0.pdf"));
    assert!(FileManager::is_generated_file("report_part12_translated.pdf"));
    assert!(!FileManager::is_generated_file("report.pdf"));
    assert!(!FileManager::is_generated_file("spare_parts.pdf"));
    assert!(!FileManager::is_generated_file("report_part.pdf"));
}

/// Source discovery skips generated files, non-PDFs and the output directory
#[test]
fn test_findSourcePdfs_shouldSkipGeneratedAndExcluded() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    let output = root.join("documents_translated");
    fs::create_dir_all(root.join("nested"))?;
    fs::create_dir_all(&output)?;

    common::create_test_file(root, "b.pdf", "%PDF-1.5")?;
    common::create_test_file(&root.join("nested"), "a.PDF", "%PDF-1.5")?;
    common::create_test_file(root, "b_part0.pdf", "%PDF-1.5")?;
    common::create_test_file(root, "notes.txt", "hello")?;
    common::create_test_file(&output, "c.pdf", "%PDF-1.5")?;

    let found = FileManager::find_source_pdfs(root, Some(&output))?;
    let names: Vec<String> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["b.pdf".to_string(), "a.PDF".to_string()]);
    Ok(())
}

/// File type detection looks at the header first, then the extension
#[test]
fn test_detectFileType_shouldUseHeaderThenExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();

    let real = common::create_test_pdf(dir, "real.bin", 1)?;
    assert_eq!(FileManager::detect_file_type(&real)?, FileType::Pdf);

    let named = common::create_test_file(dir, "named.pdf", "garbage")?;
    assert_eq!(FileManager::detect_file_type(&named)?, FileType::Pdf);

    let text = common::create_test_file(dir, "plain.txt", "just text")?;
    assert_eq!(FileManager::detect_file_type(&text)?, FileType::Unknown);

    assert!(FileManager::detect_file_type(dir.join("missing.pdf")).is_err());
    Ok(())
}

/// Removing files counts what was deleted and ignores missing ones
#[test]
fn test_removeFiles_shouldIgnoreMissingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let first = common::create_test_file(dir, "one.pdf", "x")?;
    let second = common::create_test_file(dir, "two.pdf", "y")?;

    let removed = FileManager::remove_files(&[first.clone(), second.clone(), dir.join("three.pdf")])?;
    assert_eq!(removed, 2);
    assert!(!FileManager::file_exists(&first));
    assert!(!FileManager::file_exists(&second));
    Ok(())
}

/// Writing a file creates missing parent directories
#[test]
fn test_writeToFile_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("out.txt");

    FileManager::write_to_file(&path, "content")?;
    assert!(FileManager::dir_exists(temp_dir.path().join("a").join("b")));
    assert_eq!(fs::read_to_string(&path)?, "content");
    Ok(())
}
