//! Shared types used by the Pinecone client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned while interacting with the hosted API.
#[derive(Debug, Error)]
pub enum PineconeError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Pinecone URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Local file could not be read for upload.
    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    /// The named resource already exists.
    #[error("Resource already exists: {0}")]
    Conflict(String),
    /// The named resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),
    /// The API responded with an unexpected status code.
    #[error("Unexpected Pinecone response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the API.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// A successful response lacked a field the caller depends on.
    #[error("Pinecone response is missing field `{0}`")]
    MissingField(&'static str),
}

/// Assistant entry returned by create and list calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantDescription {
    /// Assistant name.
    pub name: String,
    /// Provisioning status reported by the API.
    #[serde(default)]
    pub status: Option<String>,
}

/// File record returned after an assistant upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadedFile {
    /// Identifier issued by the API.
    #[serde(default)]
    pub id: Option<String>,
    /// File name recorded by the API.
    #[serde(default)]
    pub name: Option<String>,
    /// Processing status of the file.
    #[serde(default)]
    pub status: Option<String>,
}

/// Single chat message exchanged with an assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author (`user` or `assistant`).
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a message authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Index entry returned by describe and list calls.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    /// Index name.
    pub name: String,
    /// Data-plane host serving the index.
    #[serde(default)]
    pub host: Option<String>,
    /// Vector dimension of the index.
    #[serde(default)]
    pub dimension: Option<u64>,
    /// Similarity metric of the index.
    #[serde(default)]
    pub metric: Option<String>,
}

/// Parameters for serverless index creation.
#[derive(Debug, Clone)]
pub struct IndexSpec<'a> {
    /// Vector dimension.
    pub dimension: usize,
    /// Similarity metric, e.g. `cosine`.
    pub metric: &'a str,
    /// Cloud provider hosting the index.
    pub cloud: &'a str,
    /// Cloud region hosting the index.
    pub region: &'a str,
}

/// Vector written to an index namespace.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    /// Vector identifier, unique within the namespace.
    pub id: String,
    /// Vector components.
    pub values: Vec<f32>,
    /// Metadata stored alongside the vector.
    pub metadata: Map<String, Value>,
}

/// Match returned by a similarity query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryMatch {
    /// Identifier of the matched vector.
    pub id: String,
    /// Similarity score reported by the index.
    #[serde(default)]
    pub score: Option<f32>,
    /// Metadata stored with the vector, when requested.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
pub(crate) struct ListAssistantsResponse {
    #[serde(default)]
    pub(crate) assistants: Vec<AssistantDescription>,
}

#[derive(Deserialize)]
pub(crate) struct ListIndexesResponse {
    #[serde(default)]
    pub(crate) indexes: Vec<IndexDescription>,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub(crate) message: Option<ChatMessage>,
}

#[derive(Deserialize)]
pub(crate) struct UpsertResponse {
    #[serde(default, rename = "upsertedCount")]
    pub(crate) upserted_count: Option<usize>,
}

#[derive(Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub(crate) matches: Vec<QueryMatch>,
}
