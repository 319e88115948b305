//! Archive ingestion pipeline: scratch extraction, suffix filtering, and per-document upload.

pub mod archive;
mod pipeline;
pub mod types;

pub use archive::{DOCUMENT_SUFFIX, ExtractedArchive, extract_documents, is_document};
pub use pipeline::ingest_archive;
pub use types::{ExtractedDocument, IngestError, IngestReport};
