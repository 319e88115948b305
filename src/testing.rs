//! In-memory backend used by unit tests.

use crate::backend::{BackendError, IngestReceipt, SearchBackend};
use crate::config::BackendKind;
use crate::ingestion::ExtractedDocument;
use crate::pinecone::PineconeError;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) struct StubBackend {
    kind: BackendKind,
    exists: AtomicBool,
    remote_failure: Option<String>,
    failing_documents: HashSet<String>,
    remote_ready: bool,
    answer: String,
    ingested: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl StubBackend {
    pub(crate) fn new() -> Self {
        Self {
            kind: BackendKind::Assistant,
            exists: AtomicBool::new(false),
            remote_failure: None,
            failing_documents: HashSet::new(),
            remote_ready: true,
            answer: "stub answer".to_string(),
            ingested: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_remote(mut self, message: &str) -> Self {
        self.remote_failure = Some(message.to_string());
        self
    }

    pub(crate) fn failing_document(mut self, name: &str) -> Self {
        self.failing_documents.insert(name.to_string());
        self
    }

    pub(crate) fn remotely_unready(mut self) -> Self {
        self.remote_ready = false;
        self
    }

    pub(crate) fn ingested(&self) -> Vec<String> {
        self.ingested.lock().expect("ingested lock").clone()
    }

    pub(crate) fn questions(&self) -> Vec<String> {
        self.questions.lock().expect("questions lock").clone()
    }

    fn remote_error(&self) -> Option<BackendError> {
        self.remote_failure.as_ref().map(|message| {
            BackendError::Remote(PineconeError::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: message.clone(),
            })
        })
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn resource_name(&self) -> &str {
        "stub-assistant"
    }

    async fn create_resource(&self) -> Result<(), BackendError> {
        if let Some(error) = self.remote_error() {
            return Err(error);
        }
        if self.exists.swap(true, Ordering::SeqCst) {
            return Err(BackendError::AlreadyExists(self.resource_name().into()));
        }
        Ok(())
    }

    async fn delete_resource(&self) -> Result<(), BackendError> {
        if let Some(error) = self.remote_error() {
            return Err(error);
        }
        if !self.exists.swap(false, Ordering::SeqCst) {
            return Err(BackendError::NotFound(self.resource_name().into()));
        }
        Ok(())
    }

    async fn ingest(&self, document: &ExtractedDocument) -> Result<IngestReceipt, BackendError> {
        self.ingested
            .lock()
            .expect("ingested lock")
            .push(document.name.clone());
        if self.failing_documents.contains(&document.name) {
            return Err(BackendError::Remote(PineconeError::UnexpectedStatus {
                status: StatusCode::BAD_REQUEST,
                body: "unsupported file".into(),
            }));
        }
        Ok(IngestReceipt {
            file_id: Some(format!("id-{}", document.name)),
        })
    }

    async fn confirm_ready(&self) -> Result<bool, BackendError> {
        Ok(self.remote_ready)
    }

    async fn ask(&self, question: &str) -> Result<String, BackendError> {
        self.questions
            .lock()
            .expect("questions lock")
            .push(question.to_string());
        if let Some(error) = self.remote_error() {
            return Err(error);
        }
        Ok(self.answer.clone())
    }
}
