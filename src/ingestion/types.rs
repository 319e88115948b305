//! Data types and error definitions for archive ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort ingestion of a whole archive.
///
/// Failures of individual documents are not errors at this level; they become status lines in
/// the [`IngestReport`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// Scratch directory or extracted files could not be accessed.
    #[error("Failed to access scratch files: {0}")]
    Io(#[from] std::io::Error),
    /// Upload was not a readable ZIP archive.
    #[error("Failed to read ZIP archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// Archive declares more uncompressed data than allowed.
    #[error("Archive expands to {declared} bytes, over the {limit} byte limit")]
    TooLarge {
        /// Sum of the entries' uncompressed sizes.
        declared: u64,
        /// Configured ceiling.
        limit: u64,
    },
    /// Walking the extracted tree failed.
    #[error("Failed to enumerate extracted files: {0}")]
    Walk(#[from] walkdir::Error),
    /// Extraction worker panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Document extracted from an uploaded archive, living in a scratch directory.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Path relative to the archive root, using `/` separators.
    pub name: String,
    /// Absolute location of the extracted file.
    pub path: PathBuf,
}

/// Result of ingesting one archive.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Documents forwarded to the backend.
    pub attempted: usize,
    /// Documents the backend accepted.
    pub uploaded: usize,
    /// Documents the backend rejected.
    pub failed: usize,
    /// One line per attempted document, in attempt order.
    pub status_lines: Vec<String>,
    /// Identifiers issued by the backend for accepted documents.
    pub file_ids: Vec<String>,
}
