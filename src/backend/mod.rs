//! Remote search backends behind a single interface.
//!
//! The form logic talks to [`SearchBackend`] only. Two adapters exist:
//!
//! - [`AssistantBackend`] uploads raw files to a hosted assistant and answers through chat.
//! - [`IndexBackend`] upserts placeholder vectors into a serverless index and answers with a
//!   templated list of matched file names.

mod assistant;
mod index;

pub use assistant::{AssistantBackend, AssistantSettings, DEFAULT_INSTRUCTIONS};
pub use index::{IndexBackend, IndexSettings, QUERY_TOP_K};

use crate::config::{BackendKind, Config};
use crate::embedding::{EmbeddingClientError, get_embedding_client};
use crate::ingestion::ExtractedDocument;
use crate::pinecone::{PineconeError, PineconeService};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The remote resource already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),
    /// The remote resource does not exist.
    #[error("{0} does not exist")]
    NotFound(String),
    /// The hosted API call failed.
    #[error(transparent)]
    Remote(PineconeError),
    /// Placeholder vectors could not be produced.
    #[error(transparent)]
    Embedding(#[from] EmbeddingClientError),
    /// The index has no data-plane host yet.
    #[error("index '{0}' has no host yet; it may still be initializing")]
    MissingHost(String),
}

impl From<PineconeError> for BackendError {
    fn from(error: PineconeError) -> Self {
        match error {
            PineconeError::Conflict(name) => Self::AlreadyExists(name),
            PineconeError::NotFound(name) => Self::NotFound(name),
            other => Self::Remote(other),
        }
    }
}

/// Acknowledgement of one ingested document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReceipt {
    /// Identifier issued by the remote service, when it returned one.
    pub file_id: Option<String>,
}

/// Operations the form needs from a remote search resource.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Which remote primitive this backend drives.
    fn kind(&self) -> BackendKind;

    /// Configured name of the remote resource.
    fn resource_name(&self) -> &str;

    /// Create the remote resource. Fails with [`BackendError::AlreadyExists`] when present.
    async fn create_resource(&self) -> Result<(), BackendError>;

    /// Delete the remote resource. Fails with [`BackendError::NotFound`] when absent.
    async fn delete_resource(&self) -> Result<(), BackendError>;

    /// Forward one extracted document to the resource.
    async fn ingest(&self, document: &ExtractedDocument) -> Result<IngestReceipt, BackendError>;

    /// Server-side readiness check performed after the local delay has elapsed.
    async fn confirm_ready(&self) -> Result<bool, BackendError> {
        Ok(true)
    }

    /// Ask a question and return the text to show the user.
    async fn ask(&self, question: &str) -> Result<String, BackendError>;
}

/// Build the backend selected by the configuration.
pub fn build_backend(config: &Config) -> Result<Arc<dyn SearchBackend>, PineconeError> {
    let service = PineconeService::new(config)?;
    let backend: Arc<dyn SearchBackend> = match config.backend {
        BackendKind::Assistant => Arc::new(AssistantBackend::new(
            service,
            AssistantSettings {
                name: config.resource_name.clone(),
                region: config.effective_region().to_string(),
                instructions: DEFAULT_INSTRUCTIONS.to_string(),
            },
        )),
        BackendKind::Index => Arc::new(IndexBackend::new(
            service,
            IndexSettings {
                name: config.resource_name.clone(),
                namespace: config.namespace.clone(),
                cloud: config.cloud.clone(),
                region: config.effective_region().to_string(),
                host: config.index_host.clone(),
            },
            get_embedding_client(config.vector_dimension),
        )),
    };
    tracing::info!(
        backend = ?config.backend,
        resource = %config.resource_name,
        "Search backend ready"
    );
    Ok(backend)
}
