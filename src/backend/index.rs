use crate::backend::{BackendError, IngestReceipt, SearchBackend};
use crate::config::BackendKind;
use crate::embedding::EmbeddingClient;
use crate::ingestion::ExtractedDocument;
use crate::pinecone::{IndexSpec, PineconeService, QueryMatch, VectorRecord};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// Number of neighbours requested per question.
pub const QUERY_TOP_K: usize = 3;

const METRIC: &str = "cosine";
const FILENAME_KEY: &str = "filename";

/// Settings for the raw vector-index backend.
#[derive(Debug, Clone)]
pub struct IndexSettings {
    /// Index name.
    pub name: String,
    /// Namespace holding this form's vectors.
    pub namespace: String,
    /// Cloud provider for serverless creation.
    pub cloud: String,
    /// Cloud region for serverless creation.
    pub region: String,
    /// Fixed data-plane host; resolved through describe-index when absent.
    pub host: Option<String>,
}

/// Backend that upserts one placeholder vector per document into a serverless index.
///
/// Every stored vector is identical, so the similarity query cannot rank documents. Answers list
/// whichever file names the index returns and say so.
pub struct IndexBackend {
    service: PineconeService,
    settings: IndexSettings,
    embedder: Box<dyn EmbeddingClient + Send + Sync>,
    resolved_host: Mutex<Option<String>>,
}

impl IndexBackend {
    /// Wrap a Pinecone client for the index named in `settings`.
    pub fn new(
        service: PineconeService,
        settings: IndexSettings,
        embedder: Box<dyn EmbeddingClient + Send + Sync>,
    ) -> Self {
        let resolved_host = Mutex::new(settings.host.clone());
        Self {
            service,
            settings,
            embedder,
            resolved_host,
        }
    }

    async fn host(&self) -> Result<String, BackendError> {
        let mut cached = self.resolved_host.lock().await;
        if let Some(host) = cached.as_ref() {
            return Ok(host.clone());
        }

        let description = self.service.describe_index(&self.settings.name).await?;
        let host = description
            .host
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| BackendError::MissingHost(self.settings.name.clone()))?;
        tracing::debug!(index = %self.settings.name, host = %host, "Resolved index host");
        *cached = Some(host.clone());
        Ok(host)
    }

    async fn placeholder_vector(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let mut vectors = self
            .embedder
            .generate_embeddings(vec![text.to_string()])
            .await?;
        vectors.pop().ok_or_else(|| {
            crate::embedding::EmbeddingClientError::GenerationFailed(
                "embedding client returned no vectors".to_string(),
            )
            .into()
        })
    }
}

#[async_trait]
impl SearchBackend for IndexBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Index
    }

    fn resource_name(&self) -> &str {
        &self.settings.name
    }

    async fn create_resource(&self) -> Result<(), BackendError> {
        let spec = IndexSpec {
            dimension: self.embedder.dimension(),
            metric: METRIC,
            cloud: &self.settings.cloud,
            region: &self.settings.region,
        };
        self.service.create_index(&self.settings.name, &spec).await?;
        Ok(())
    }

    async fn delete_resource(&self) -> Result<(), BackendError> {
        self.service.delete_index(&self.settings.name).await?;
        if self.settings.host.is_none() {
            *self.resolved_host.lock().await = None;
        }
        Ok(())
    }

    async fn ingest(&self, document: &ExtractedDocument) -> Result<IngestReceipt, BackendError> {
        let values = self.placeholder_vector(&document.name).await?;
        let host = self.host().await?;

        let mut metadata = Map::new();
        metadata.insert(FILENAME_KEY.into(), Value::String(document.name.clone()));

        self.service
            .upsert_vectors(
                &host,
                &self.settings.namespace,
                vec![VectorRecord {
                    id: document.name.clone(),
                    values,
                    metadata,
                }],
            )
            .await?;

        Ok(IngestReceipt {
            file_id: Some(document.name.clone()),
        })
    }

    async fn confirm_ready(&self) -> Result<bool, BackendError> {
        let indexes = self.service.list_indexes().await?;
        Ok(indexes
            .iter()
            .any(|index| index.name == self.settings.name))
    }

    async fn ask(&self, question: &str) -> Result<String, BackendError> {
        let vector = self.placeholder_vector(question).await?;
        let host = self.host().await?;
        let matches = self
            .service
            .query_vectors(&host, &self.settings.namespace, vector, QUERY_TOP_K)
            .await?;
        Ok(summarize_matches(question, &self.settings.namespace, &matches))
    }
}

/// Render the templated answer for a placeholder similarity query.
pub(crate) fn summarize_matches(question: &str, namespace: &str, matches: &[QueryMatch]) -> String {
    if matches.is_empty() {
        return format!(
            "No documents in namespace '{namespace}' matched \"{question}\". Upload a ZIP of PDFs first."
        );
    }

    let mut lines = vec![format!(
        "Documents in namespace '{namespace}' returned for \"{question}\":"
    )];
    for hit in matches {
        let name = hit
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get(FILENAME_KEY))
            .and_then(Value::as_str)
            .unwrap_or(hit.id.as_str());
        lines.push(format!("- {name}"));
    }
    lines.push(
        "Stored vectors are placeholders, so this list is not ranked by relevance.".to_string(),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::PlaceholderEmbedder;
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use serde_json::json;
    use std::time::Duration;

    fn backend(server: &MockServer, host: Option<String>) -> IndexBackend {
        let service = PineconeService::with_endpoints(
            "test-key",
            &server.base_url(),
            &server.base_url(),
            Duration::from_secs(5),
        )
        .expect("client");
        IndexBackend::new(
            service,
            IndexSettings {
                name: "docs".into(),
                namespace: "pdf-desk".into(),
                cloud: "aws".into(),
                region: "us-east-1".into(),
                host,
            },
            Box::new(PlaceholderEmbedder::new(4)),
        )
    }

    #[tokio::test]
    async fn create_sends_dimension_and_cosine_metric() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes").json_body(json!({
                    "name": "docs",
                    "dimension": 4,
                    "metric": "cosine",
                    "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } }
                }));
                then.status(201).json_body(json!({ "name": "docs" }));
            })
            .await;

        backend(&server, None)
            .create_resource()
            .await
            .expect("create");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ingest_resolves_host_once_and_upserts_placeholder() {
        let server = MockServer::start_async().await;
        let describe = server
            .mock_async(|when, then| {
                when.method(GET).path("/indexes/docs");
                then.status(200).json_body(json!({
                    "name": "docs",
                    "host": server.base_url(),
                }));
            })
            .await;
        let upsert = server
            .mock_async(|when, then| {
                when.method(POST).path("/vectors/upsert").json_body(json!({
                    "vectors": [{
                        "id": "a.pdf",
                        "values": [0.0, 0.0, 0.0, 0.0],
                        "metadata": { "filename": "a.pdf" }
                    }],
                    "namespace": "pdf-desk"
                }));
                then.status(200).json_body(json!({ "upsertedCount": 1 }));
            })
            .await;

        let backend = backend(&server, None);
        let document = ExtractedDocument {
            name: "a.pdf".into(),
            path: "/unused/a.pdf".into(),
        };
        let receipt = backend.ingest(&document).await.expect("ingest");
        backend.ingest(&document).await.expect("second ingest");

        assert_eq!(receipt.file_id.as_deref(), Some("a.pdf"));
        assert_eq!(describe.hits_async().await, 1);
        assert_eq!(upsert.hits_async().await, 2);
    }

    #[tokio::test]
    async fn ask_queries_top_three_and_lists_filenames() {
        let server = MockServer::start_async().await;
        let query = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/query")
                    .json_body_partial(r#"{ "topK": 3, "namespace": "pdf-desk" }"#);
                then.status(200).json_body(json!({
                    "matches": [
                        { "id": "a.pdf", "score": 0.0, "metadata": { "filename": "a.pdf" } },
                        { "id": "b.pdf", "score": 0.0 }
                    ]
                }));
            })
            .await;

        let answer = backend(&server, Some(server.base_url()))
            .ask("What changed?")
            .await
            .expect("answer");

        assert_eq!(query.hits_async().await, 1);
        assert!(answer.contains("- a.pdf"));
        assert!(answer.contains("- b.pdf"));
        assert!(answer.contains("not ranked"));
    }

    #[tokio::test]
    async fn readiness_checks_index_existence() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/indexes");
                then.status(200).json_body(json!({
                    "indexes": [{ "name": "other", "host": "other.svc" }]
                }));
            })
            .await;

        let ready = backend(&server, None).confirm_ready().await.expect("list");
        assert!(!ready);
    }

    #[test]
    fn empty_matches_produce_guidance() {
        let text = summarize_matches("anything", "pdf-desk", &[]);
        assert!(text.starts_with("No documents in namespace 'pdf-desk'"));
    }
}
