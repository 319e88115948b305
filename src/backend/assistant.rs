use crate::backend::{BackendError, IngestReceipt, SearchBackend};
use crate::config::BackendKind;
use crate::ingestion::ExtractedDocument;
use crate::pinecone::{ChatMessage, PineconeService};
use async_trait::async_trait;
use serde_json::json;

/// Instructions given to a newly created assistant.
pub const DEFAULT_INSTRUCTIONS: &str =
    "Answer based only on the documents provided. Use clear American English.";

/// Metadata `source` tag attached to every uploaded file.
const UPLOAD_SOURCE: &str = "pdf_desk_upload";

/// Settings for the hosted-assistant backend.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    /// Assistant name.
    pub name: String,
    /// Region the assistant is created in.
    pub region: String,
    /// System instructions passed at creation.
    pub instructions: String,
}

/// Backend that stores raw files in a hosted assistant and answers through its chat endpoint.
pub struct AssistantBackend {
    service: PineconeService,
    settings: AssistantSettings,
}

impl AssistantBackend {
    /// Wrap a Pinecone client for the assistant named in `settings`.
    pub fn new(service: PineconeService, settings: AssistantSettings) -> Self {
        Self { service, settings }
    }
}

#[async_trait]
impl SearchBackend for AssistantBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Assistant
    }

    fn resource_name(&self) -> &str {
        &self.settings.name
    }

    async fn create_resource(&self) -> Result<(), BackendError> {
        let AssistantSettings {
            name,
            region,
            instructions,
        } = &self.settings;
        self.service
            .create_assistant(name, instructions, region)
            .await?;
        Ok(())
    }

    async fn delete_resource(&self) -> Result<(), BackendError> {
        self.service.delete_assistant(&self.settings.name).await?;
        Ok(())
    }

    async fn ingest(&self, document: &ExtractedDocument) -> Result<IngestReceipt, BackendError> {
        let uploaded = self
            .service
            .upload_file(
                &self.settings.name,
                &document.path,
                &json!({ "source": UPLOAD_SOURCE }),
            )
            .await?;
        Ok(IngestReceipt {
            file_id: uploaded.id.filter(|id| !id.is_empty()),
        })
    }

    async fn confirm_ready(&self) -> Result<bool, BackendError> {
        let assistants = self.service.list_assistants().await?;
        Ok(assistants.iter().any(|name| *name == self.settings.name))
    }

    async fn ask(&self, question: &str) -> Result<String, BackendError> {
        let reply = self
            .service
            .chat(&self.settings.name, &[ChatMessage::user(question)])
            .await?;
        Ok(reply.content)
    }
}
