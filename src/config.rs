use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default name of the remote assistant or index.
pub const DEFAULT_RESOURCE_NAME: &str = "project-summary-assistant";
/// Default namespace used by the index backend.
pub const DEFAULT_NAMESPACE: &str = "pdf-desk";
/// Default dimensionality of placeholder vectors.
pub const DEFAULT_VECTOR_DIMENSION: usize = 1536;
/// Default delay between the last upload and the first allowed question.
pub const DEFAULT_READY_DELAY_SECS: u64 = 30;
/// Default control-plane endpoint of the hosted API.
pub const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";
/// Default assistant data-plane endpoint of the hosted API (US region).
pub const DEFAULT_ASSISTANT_URL: &str = "https://prod-1-data.ke.pinecone.io";
/// Assistant data-plane endpoint for assistants created in the EU region.
pub const EU_ASSISTANT_URL: &str = "https://prod-eu-data.ke.pinecone.io";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the PDF Desk server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API key sent with every hosted API request.
    pub pinecone_api_key: String,
    /// Remote primitive backing the form.
    pub backend: BackendKind,
    /// Name of the assistant or index created by the form.
    pub resource_name: String,
    /// Region override; backend-specific default applies when absent.
    pub region: Option<String>,
    /// Cloud provider used for serverless index creation.
    pub cloud: String,
    /// Namespace holding placeholder vectors in the index backend.
    pub namespace: String,
    /// Dimensionality of the placeholder vectors.
    pub vector_dimension: usize,
    /// Seconds to wait after an upload before questions are accepted.
    pub ready_delay_secs: u64,
    /// Timeout applied to hosted API requests (file uploads excepted).
    pub request_timeout_secs: u64,
    /// Control-plane base URL.
    pub control_url: String,
    /// Explicit assistant data-plane base URL; derived from the region when unset.
    pub assistant_url: Option<String>,
    /// Optional fixed index host, skipping the describe-index lookup.
    pub index_host: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Remote primitive the form drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted assistant that ingests raw files and answers through chat.
    Assistant,
    /// Raw vector index queried with placeholder vectors.
    Index,
}

impl BackendKind {
    /// Human-readable label used in status messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Assistant => "Assistant",
            Self::Index => "Index",
        }
    }

    /// Region used when none is configured.
    pub fn default_region(self) -> &'static str {
        match self {
            Self::Assistant => "us",
            Self::Index => "us-east-1",
        }
    }
}

/// Values supplied on the command line that take precedence over the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigOverrides {
    /// Port override from `--port`.
    pub server_port: Option<u16>,
    /// Backend override from `--backend`.
    pub backend: Option<BackendKind>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match load_env_optional("PDF_DESK_BACKEND") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PDF_DESK_BACKEND".to_string()))?,
            None => BackendKind::Assistant,
        };

        let vector_dimension = parse_optional("PDF_DESK_VECTOR_DIMENSION")?
            .unwrap_or(DEFAULT_VECTOR_DIMENSION);
        if vector_dimension == 0 {
            return Err(ConfigError::InvalidValue(
                "PDF_DESK_VECTOR_DIMENSION".to_string(),
            ));
        }

        Ok(Self {
            pinecone_api_key: load_env("PINECONE_API_KEY")?,
            backend,
            resource_name: load_env_optional("PDF_DESK_RESOURCE_NAME")
                .unwrap_or_else(|| DEFAULT_RESOURCE_NAME.to_string()),
            region: load_env_optional("PDF_DESK_REGION"),
            cloud: load_env_optional("PDF_DESK_CLOUD").unwrap_or_else(|| "aws".to_string()),
            namespace: load_env_optional("PDF_DESK_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            vector_dimension,
            ready_delay_secs: parse_optional("PDF_DESK_READY_DELAY_SECS")?
                .unwrap_or(DEFAULT_READY_DELAY_SECS),
            request_timeout_secs: parse_optional("PDF_DESK_REQUEST_TIMEOUT_SECS")?.unwrap_or(60),
            control_url: load_env_optional("PINECONE_CONTROL_URL")
                .unwrap_or_else(|| DEFAULT_CONTROL_URL.to_string()),
            assistant_url: load_env_optional("PINECONE_ASSISTANT_URL"),
            index_host: load_env_optional("PINECONE_INDEX_HOST"),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }

    /// Apply command-line overrides on top of the environment-derived values.
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(port) = overrides.server_port {
            self.server_port = Some(port);
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        self
    }

    /// Region sent to the hosted API for resource creation.
    pub fn effective_region(&self) -> &str {
        self.region
            .as_deref()
            .unwrap_or_else(|| self.backend.default_region())
    }

    /// Assistant data-plane base URL serving the effective region.
    pub fn assistant_url(&self) -> &str {
        if let Some(url) = self.assistant_url.as_deref() {
            return url;
        }
        if self.effective_region().eq_ignore_ascii_case("eu") {
            EU_ASSISTANT_URL
        } else {
            DEFAULT_ASSISTANT_URL
        }
    }

    /// Wait between an upload and the first accepted question.
    pub fn ready_delay(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.ready_delay_secs).unwrap_or(i64::MAX))
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "assistant" => Ok(Self::Assistant),
            "index" => Ok(Self::Index),
            other => Err(format!(
                "unknown backend '{other}' (expected 'assistant' or 'index')"
            )),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment, apply overrides, and install it in the global cache.
pub fn init_config(overrides: ConfigOverrides) -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?.apply(overrides);
    tracing::debug!(
        backend = ?config.backend,
        resource = %config.resource_name,
        region = config.effective_region(),
        namespace = %config.namespace,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
