//! HTTP client wrapper for the Pinecone control and data planes.

use crate::config::Config;
use crate::pinecone::types::{
    AssistantDescription, ChatMessage, ChatResponse, IndexDescription, IndexSpec,
    ListAssistantsResponse, ListIndexesResponse, PineconeError, QueryMatch, QueryResponse,
    UploadedFile, UpsertResponse, VectorRecord,
};
use reqwest::{Client, Method, Response, StatusCode, multipart};
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;

const API_VERSION: &str = "2025-01";

/// Lightweight HTTP client for Pinecone operations.
pub struct PineconeService {
    pub(crate) client: Client,
    pub(crate) control_url: String,
    pub(crate) assistant_url: String,
    pub(crate) api_key: String,
    pub(crate) request_timeout: Duration,
}

impl PineconeService {
    /// Construct a new client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, PineconeError> {
        Self::with_endpoints(
            &config.pinecone_api_key,
            &config.control_url,
            config.assistant_url(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Construct a client against explicit control and assistant endpoints.
    pub fn with_endpoints(
        api_key: &str,
        control_url: &str,
        assistant_url: &str,
        request_timeout: Duration,
    ) -> Result<Self, PineconeError> {
        let client = Client::builder().user_agent("pdf-desk/0.1").build()?;
        let control_url = normalize_base_url(control_url).map_err(PineconeError::InvalidUrl)?;
        let assistant_url = normalize_base_url(assistant_url).map_err(PineconeError::InvalidUrl)?;

        tracing::debug!(
            control = %control_url,
            assistant = %assistant_url,
            has_api_key = !api_key.is_empty(),
            "Initialized Pinecone HTTP client"
        );

        Ok(Self {
            client,
            control_url,
            assistant_url,
            api_key: api_key.to_string(),
            request_timeout,
        })
    }

    /// Create a hosted assistant. Returns [`PineconeError::Conflict`] when it already exists.
    pub async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
        region: &str,
    ) -> Result<AssistantDescription, PineconeError> {
        let body = json!({
            "name": name,
            "instructions": instructions,
            "region": region,
        });

        let response = self
            .request(Method::POST, &self.control_url, "assistant/assistants")
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;
        let response = self.check(response, name, "create_assistant").await?;
        let assistant: AssistantDescription = response.json().await?;
        tracing::debug!(assistant = name, status = ?assistant.status, "Assistant created");
        Ok(assistant)
    }

    /// Delete a hosted assistant. Returns [`PineconeError::NotFound`] when it is absent.
    pub async fn delete_assistant(&self, name: &str) -> Result<(), PineconeError> {
        let response = self
            .request(
                Method::DELETE,
                &self.control_url,
                &format!("assistant/assistants/{name}"),
            )
            .timeout(self.request_timeout)
            .send()
            .await?;
        self.check(response, name, "delete_assistant").await?;
        tracing::debug!(assistant = name, "Assistant deleted");
        Ok(())
    }

    /// Retrieve the names of all assistants in the project.
    pub async fn list_assistants(&self) -> Result<Vec<String>, PineconeError> {
        let response = self
            .request(Method::GET, &self.control_url, "assistant/assistants")
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = self.check(response, "assistants", "list_assistants").await?;
        let payload: ListAssistantsResponse = response.json().await?;
        Ok(payload
            .assistants
            .into_iter()
            .map(|assistant| assistant.name)
            .collect())
    }

    /// Upload a local file to an assistant. No client-side timeout is applied.
    pub async fn upload_file(
        &self,
        assistant: &str,
        path: &Path,
        metadata: &Value,
    ) -> Result<UploadedFile, PineconeError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let size = bytes.len();

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .request(
                Method::POST,
                &self.assistant_url,
                &format!("assistant/files/{assistant}"),
            )
            .query(&[("metadata", metadata.to_string())])
            .multipart(form)
            .send()
            .await?;
        let response = self.check(response, assistant, "upload_file").await?;
        let uploaded: UploadedFile = response.json().await?;
        tracing::debug!(
            assistant,
            file = %file_name,
            bytes = size,
            file_id = ?uploaded.id,
            "File uploaded"
        );
        Ok(uploaded)
    }

    /// Send a conversation to an assistant and return its reply.
    pub async fn chat(
        &self,
        assistant: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage, PineconeError> {
        let body = json!({
            "messages": messages,
            "stream": false,
        });

        let response = self
            .request(
                Method::POST,
                &self.assistant_url,
                &format!("assistant/chat/{assistant}"),
            )
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;
        let response = self.check(response, assistant, "chat").await?;
        let payload: ChatResponse = response.json().await?;
        let message = payload.message.ok_or(PineconeError::MissingField("message"))?;
        tracing::debug!(assistant, chars = message.content.len(), "Chat reply received");
        Ok(message)
    }

    /// Create a serverless index. Returns [`PineconeError::Conflict`] when it already exists.
    pub async fn create_index(&self, name: &str, spec: &IndexSpec<'_>) -> Result<(), PineconeError> {
        let body = json!({
            "name": name,
            "dimension": spec.dimension,
            "metric": spec.metric,
            "spec": {
                "serverless": {
                    "cloud": spec.cloud,
                    "region": spec.region,
                }
            }
        });

        let response = self
            .request(Method::POST, &self.control_url, "indexes")
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;
        self.check(response, name, "create_index").await?;
        tracing::debug!(
            index = name,
            dimension = spec.dimension,
            metric = spec.metric,
            "Index created"
        );
        Ok(())
    }

    /// Delete an index. Returns [`PineconeError::NotFound`] when it is absent.
    pub async fn delete_index(&self, name: &str) -> Result<(), PineconeError> {
        let response = self
            .request(Method::DELETE, &self.control_url, &format!("indexes/{name}"))
            .timeout(self.request_timeout)
            .send()
            .await?;
        self.check(response, name, "delete_index").await?;
        tracing::debug!(index = name, "Index deleted");
        Ok(())
    }

    /// Retrieve all indexes in the project.
    pub async fn list_indexes(&self) -> Result<Vec<IndexDescription>, PineconeError> {
        let response = self
            .request(Method::GET, &self.control_url, "indexes")
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = self.check(response, "indexes", "list_indexes").await?;
        let payload: ListIndexesResponse = response.json().await?;
        Ok(payload.indexes)
    }

    /// Describe a single index, including its data-plane host.
    pub async fn describe_index(&self, name: &str) -> Result<IndexDescription, PineconeError> {
        let response = self
            .request(Method::GET, &self.control_url, &format!("indexes/{name}"))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = self.check(response, name, "describe_index").await?;
        Ok(response.json().await?)
    }

    /// Write vectors into a namespace of the index served at `host`.
    pub async fn upsert_vectors(
        &self,
        host: &str,
        namespace: &str,
        vectors: Vec<VectorRecord>,
    ) -> Result<usize, PineconeError> {
        if vectors.is_empty() {
            return Ok(0);
        }

        let base = index_base_url(host)?;
        let submitted = vectors.len();
        let response = self
            .request(Method::POST, &base, "vectors/upsert")
            .timeout(self.request_timeout)
            .json(&json!({
                "vectors": vectors,
                "namespace": namespace,
            }))
            .send()
            .await?;
        let response = self.check(response, host, "upsert_vectors").await?;
        let payload: UpsertResponse = response.json().await?;
        let upserted = payload.upserted_count.unwrap_or(submitted);
        tracing::debug!(host, namespace, vectors = upserted, "Vectors upserted");
        Ok(upserted)
    }

    /// Run a similarity query restricted to `namespace`, returning matches with metadata.
    pub async fn query_vectors(
        &self,
        host: &str,
        namespace: &str,
        vector: Vec<f32>,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, PineconeError> {
        let base = index_base_url(host)?;
        let response = self
            .request(Method::POST, &base, "query")
            .timeout(self.request_timeout)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "namespace": namespace,
                "includeMetadata": true,
                "includeValues": false,
            }))
            .send()
            .await?;
        let response = self.check(response, host, "query_vectors").await?;
        let payload: QueryResponse = response.json().await?;
        tracing::debug!(host, namespace, top_k, matches = payload.matches.len(), "Query completed");
        Ok(payload.matches)
    }

    fn request(&self, method: Method, base: &str, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(base, path);
        let mut req = self
            .client
            .request(method, url)
            .header("X-Pinecone-API-Version", API_VERSION);
        if !self.api_key.is_empty() {
            req = req.header("Api-Key", &self.api_key);
        }
        req
    }

    async fn check(
        &self,
        response: Response,
        resource: &str,
        action: &'static str,
    ) -> Result<Response, PineconeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = match status {
            StatusCode::CONFLICT => PineconeError::Conflict(resource.to_string()),
            StatusCode::NOT_FOUND => PineconeError::NotFound(resource.to_string()),
            _ => PineconeError::UnexpectedStatus { status, body },
        };

        match &error {
            PineconeError::Conflict(_) | PineconeError::NotFound(_) => {
                tracing::warn!(resource, action, error = %error, "Pinecone request rejected");
            }
            _ => {
                tracing::error!(resource, action, error = %error, "Pinecone request failed");
            }
        }
        Err(error)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn index_base_url(host: &str) -> Result<String, PineconeError> {
    let candidate = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };
    normalize_base_url(&candidate).map_err(PineconeError::InvalidUrl)
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
