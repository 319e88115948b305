//! Pinecone hosted API integration: assistants and serverless indexes.

pub mod client;
pub mod types;

pub use client::PineconeService;
pub use types::{
    AssistantDescription, ChatMessage, IndexDescription, IndexSpec, PineconeError, QueryMatch,
    UploadedFile, VectorRecord,
};
