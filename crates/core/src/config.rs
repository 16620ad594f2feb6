//! Configuration types for the ArtVector core library

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtVectorConfig {
    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Embedding/indexing settings
    #[serde(default)]
    pub indexing: IndexingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSection,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ArtVectorConfig {
    /// Load configuration from an optional YAML file plus the environment
    ///
    /// Precedence, lowest to highest: built-in defaults, the YAML file (if
    /// given), then `ARTVECTOR_*` environment variables using `__` as the
    /// section separator (e.g. `ARTVECTOR_OLLAMA__URL`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value fails to
    /// deserialize into the expected type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ARTVECTOR")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Render the configuration as YAML (used by `artvector init`)
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub url: String,
    /// Embedding model name
    pub embedding_model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or_default(),
            max_connections: 5,
        }
    }
}

/// Embedding/indexing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Objects per embedding batch
    pub batch_size: usize,
    /// Embedding dimension the model is expected to produce
    pub dimension: usize,
}

impl IndexingConfig {
    /// Default batch size
    pub const DEFAULT_BATCH_SIZE: usize = 128;
    /// Default embedding dimension (all-minilm)
    pub const DEFAULT_DIMENSION: usize = 384;
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            dimension: Self::DEFAULT_DIMENSION,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Whether to allow cross-origin requests
    pub cors_enabled: bool,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_enabled: true,
            max_request_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "artvector_core=debug")
    pub level: String,
    /// Output format: "json", "pretty" or "compact"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
