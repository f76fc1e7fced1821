pub mod typesense;

use async_trait::async_trait;
use log::info;
use serde::{ Deserialize, Serialize };
use std::env;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::schema::{ CollectionInfo, CollectionSchema, FieldOp };

const ENV_PROTOCOL: &str = "TYPESENSE_PROTOCOL";
const ENV_HOST: &str = "TYPESENSE_HOST";
const ENV_PORT: &str = "TYPESENSE_PORT";
const ENV_API_KEY: &str = "TYPESENSE_API_KEY";

const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Classification of an index client failure. The reconciler branches on this
/// closed set rather than probing backend-specific error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The named collection does not exist.
    NotFound,
    /// The named collection already exists.
    Conflict,
    /// Any other backend or transport failure (auth, network, validation).
    Transport,
}

/// Failure reported by an index backend, with the underlying cause attached
/// when one exists.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct IndexError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl IndexError {
    pub fn not_found(collection: &str) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: format!("collection '{}' not found", collection),
            source: None,
        }
    }

    pub fn conflict(collection: &str) -> Self {
        Self {
            kind: ErrorKind::Conflict,
            message: format!("collection '{}' already exists", collection),
            source: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Backend liveness as reported by its health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
}

/// Connection settings for the index backend. Built explicitly or from the
/// environment; validated once at construction so a misconfigured deployment
/// fails at startup instead of on first use.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub connection_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value '{value}' for {var}")]
    InvalidVar { var: &'static str, value: String },
}

impl IndexConfig {
    pub fn new(
        protocol: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        api_key: impl Into<String>
    ) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            port,
            api_key: api_key.into(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    /// Read `TYPESENSE_PROTOCOL`, `TYPESENSE_HOST`, `TYPESENSE_PORT` and
    /// `TYPESENSE_API_KEY`, failing on the first variable that is absent,
    /// empty or unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let protocol = require_env(ENV_PROTOCOL)?;
        let host = require_env(ENV_HOST)?;
        let port_raw = require_env(ENV_PORT)?;
        let api_key = require_env(ENV_API_KEY)?;

        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidVar { var: ENV_PORT, value: port_raw })?;

        Ok(Self::new(protocol, host, port, api_key))
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host.trim_end_matches('/'), self.port)
    }
}

fn require_env(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

/// Capability set the reconciler requires from an index backend.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Fetch the current state of a collection. Fails with
    /// [`ErrorKind::NotFound`] when no collection of that name exists and
    /// [`ErrorKind::Transport`] for any other failure.
    async fn retrieve_collection(&self, name: &str) -> Result<CollectionInfo, IndexError>;

    /// Create a collection with exactly the given fields. Fails with
    /// [`ErrorKind::Conflict`] when the name is already taken.
    async fn create_collection(
        &self,
        schema: &CollectionSchema
    ) -> Result<CollectionInfo, IndexError>;

    /// Apply a batch of add/drop field operations to an existing collection.
    /// The batch is all-or-nothing from the caller's point of view; any
    /// rejection is [`ErrorKind::Transport`].
    async fn update_collection_fields(
        &self,
        name: &str,
        ops: &[FieldOp]
    ) -> Result<CollectionInfo, IndexError>;

    /// Liveness probe against the backend.
    async fn health(&self) -> Result<HealthStatus, IndexError>;
}

pub fn create_search_index(config: IndexConfig) -> Result<Arc<dyn SearchIndex>, IndexError> {
    info!("Creating Typesense index client for {}", config.base_url());
    let index = typesense::TypesenseIndex::new(config)?;
    Ok(Arc::new(index))
}
