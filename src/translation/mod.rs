/*!
 * Translation of extracted page text using the configured provider.
 *
 * - `core`: the translation service, request splitting and usage statistics
 * - `batch`: sequential translation of the pages of a chunk
 */

// Re-export main types for easier usage
pub use self::batch::{PageTranslator, TranslatedChunk};
pub use self::core::{RequestUsage, TokenUsageStats, TranslationService};

// Submodules
pub mod batch;
pub mod core;
