/*!
 * Error types for the pdf-chunk-translator application.
 *
 * This module contains custom error types for the different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The service rejected the request because of its rate limit
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while reading, splitting, rendering or merging PDF files
#[derive(Error, Debug)]
pub enum PdfError {
    /// The document could not be opened or parsed
    #[error("Failed to load PDF {path}: {message}")]
    Load {
        path: String,
        message: String,
    },

    /// The document could not be written
    #[error("Failed to save PDF {path}: {message}")]
    Save {
        path: String,
        message: String,
    },

    /// Text extraction failed for a page
    #[error("Failed to extract text from page {page}: {message}")]
    Extraction {
        page: u32,
        message: String,
    },

    /// A chunk must hold at least one page
    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),

    /// The assembler was called without any input document
    #[error("No documents to assemble")]
    NothingToAssemble,

    /// The document structure is missing something the pipeline needs
    #[error("Malformed PDF: {0}")]
    Malformed(String),

    /// Filesystem error around a PDF operation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered but gave no text back
    #[error("Provider {0} returned an empty response")]
    EmptyResponse(String),

    /// The language code cannot be used with this provider
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from PDF processing
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
