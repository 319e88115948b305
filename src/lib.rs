#![deny(missing_docs)]

//! Core library for PDF Desk, a small web form that feeds a ZIP of PDFs to a hosted Pinecone
//! assistant or index and relays questions about them.

/// HTTP routing and form handlers.
pub mod api;
/// Remote search backends and the trait they share.
pub mod backend;
/// Environment-driven configuration management.
pub mod config;
/// Placeholder embedding client for the vector index backend.
pub mod embedding;
/// Archive extraction and per-document ingestion.
pub mod ingestion;
/// Structured logging and tracing setup.
pub mod logging;
/// Form activity counters.
pub mod metrics;
/// Status banners shown on the form.
pub mod notice;
/// HTML rendering of the form.
pub mod page;
/// Pinecone REST client.
pub mod pinecone;
/// Question validation and dispatch.
pub mod query;
/// Upload readiness gate.
pub mod readiness;
/// Resource creation and deletion.
pub mod resources;
/// Per-browser session state.
pub mod session;

#[cfg(test)]
mod testing;
