use anyhow::{Result, Context};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Suffix of the chunk files written by the splitter
pub const PART_MARKER: &str = "_part";

/// Suffix of the per-chunk translated files
pub const TRANSLATED_SUFFIX: &str = "_translated";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: `<output_dir>/<stem>_part<index>.pdf`
    pub fn chunk_path<P1: AsRef<Path>, P2: AsRef<Path>>(source: P1, output_dir: P2, index: usize) -> PathBuf {
        let stem = source.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        output_dir.as_ref().join(format!("{}{}{}.pdf", stem, PART_MARKER, index))
    }

    // @generates: `<output_dir>/<chunk stem>_translated.pdf`
    pub fn translated_path<P1: AsRef<Path>, P2: AsRef<Path>>(chunk: P1, output_dir: P2) -> PathBuf {
        let stem = chunk.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        output_dir.as_ref().join(format!("{}{}.pdf", stem, TRANSLATED_SUFFIX))
    }

    // @generates: `<output_dir>/<stem>.<extension>`
    pub fn sibling_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        output_dir.as_ref().join(format!("{}.{}", stem, extension))
    }

    /// Whether a file name looks like something this tool generated
    pub fn is_generated_file<P: AsRef<Path>>(path: P) -> bool {
        let stem = path.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        stem.ends_with(TRANSLATED_SUFFIX)
            || stem.rsplit_once(PART_MARKER)
                .is_some_and(|(_, index)| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
    }

    /// Find source PDFs below a directory, skipping generated files and anything under `exclude`
    pub fn find_source_pdfs<P: AsRef<Path>>(dir: P, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }
            if exclude.is_some_and(|excluded| path.starts_with(excluded)) {
                continue;
            }
            let is_pdf = path.extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"));
            if is_pdf && !Self::is_generated_file(path) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Delete files, ignoring the ones that are already gone
    pub fn remove_files(paths: &[PathBuf]) -> Result<usize> {
        let mut removed = 0;
        for path in paths {
            match fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e).with_context(|| format!("Failed to remove file: {:?}", path)),
            }
        }
        Ok(removed)
    }

    /// Detect whether a file is a PDF, by its header bytes first and its extension second
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let mut header = [0u8; 5];
        let mut file = fs::File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        let read = file.read(&mut header)?;
        if read == header.len() && &header == b"%PDF-" {
            return Ok(FileType::Pdf);
        }

        // Some producers put junk before the header, readers accept it
        let has_pdf_extension = path.extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"));
        if has_pdf_extension {
            return Ok(FileType::Pdf);
        }

        Ok(FileType::Unknown)
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Unknown file type
    Unknown,
}
