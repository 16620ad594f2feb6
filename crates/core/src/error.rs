//! Error handling for the ArtVector core library

use std::fmt;
use thiserror::Error;

/// Result type alias for ArtVector operations
pub type Result<T> = std::result::Result<T, ArtVectorError>;

/// Main error type for ArtVector operations
#[derive(Error, Debug)]
pub enum ArtVectorError {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),

    /// Empty or whitespace-only search query
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// External embedding model failure
    #[error("Embedding model error: {message}")]
    EmbeddingModel { message: String },

    /// Returned vector length differs from the configured dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Durable store errors (reads and batch writes)
    #[error("Store error: {message}")]
    Store { message: String },

    /// Failure while building a search cache projection
    #[error("Cache build error: {message}")]
    CacheBuild { message: String },

    /// Ingestion errors
    #[error("Ingest error: {message}")]
    Ingest { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Model not available error
    #[error("Model '{model}' is not available")]
    ModelNotAvailable { model: String },

    /// Network connectivity errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Timeout errors
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Resource not found errors
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },
}

impl ArtVectorError {
    /// Create an invalid query error
    pub fn invalid_query<S: Into<String>>(message: S) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create an embedding model error
    pub fn embedding_model<S: Into<String>>(message: S) -> Self {
        Self::EmbeddingModel {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a cache build error
    pub fn cache_build<S: Into<String>>(message: S) -> Self {
        Self::CacheBuild {
            message: message.into(),
        }
    }

    /// Create an ingest error
    pub fn ingest<S: Into<String>>(message: S) -> Self {
        Self::Ingest {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a model not available error
    pub fn model_not_available<S: Into<String>>(model: S) -> Self {
        Self::ModelNotAvailable {
            model: model.into(),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if error is retryable
    ///
    /// A failed embedding batch leaves the store untouched, so model, store
    /// and network failures can simply be retried by the caller. Validation
    /// and invalid-query errors will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Http(_) => true,
            Self::EmbeddingModel { .. } | Self::Store { .. } => true,
            _ => false,
        }
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::Io,
            Self::Http(_) | Self::Network { .. } => ErrorCategory::Network,
            Self::Json(_) | Self::Yaml(_) => ErrorCategory::Serialization,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::InvalidQuery { .. } => ErrorCategory::Query,
            Self::EmbeddingModel { .. }
            | Self::DimensionMismatch { .. }
            | Self::ModelNotAvailable { .. } => ErrorCategory::Embedding,
            Self::Store { .. } => ErrorCategory::Store,
            Self::CacheBuild { .. } => ErrorCategory::Cache,
            Self::Ingest { .. } => ErrorCategory::Ingest,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Generic(_) => ErrorCategory::Generic,
        }
    }
}

/// Error categories for metrics and logging
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Io,
    Network,
    Serialization,
    Configuration,
    Query,
    Embedding,
    Store,
    Cache,
    Ingest,
    Validation,
    Timeout,
    NotFound,
    Generic,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::Network => write!(f, "network"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Query => write!(f, "query"),
            Self::Embedding => write!(f, "embedding"),
            Self::Store => write!(f, "store"),
            Self::Cache => write!(f, "cache"),
            Self::Ingest => write!(f, "ingest"),
            Self::Validation => write!(f, "validation"),
            Self::Timeout => write!(f, "timeout"),
            Self::NotFound => write!(f, "not_found"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ArtVectorError::invalid_query("empty query");
        assert!(matches!(err, ArtVectorError::InvalidQuery { .. }));
        assert_eq!(err.to_string(), "Invalid query: empty query");
    }

    #[test]
    fn test_error_categories() {
        let err = ArtVectorError::embedding_model("connection refused");
        assert_eq!(err.category(), ErrorCategory::Embedding);

        let err = ArtVectorError::store("insert failed");
        assert_eq!(err.category(), ErrorCategory::Store);

        let err = ArtVectorError::invalid_query("empty");
        assert_eq!(err.category(), ErrorCategory::Query);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ArtVectorError::embedding_model("timeout").is_retryable());
        assert!(ArtVectorError::store("deadlock").is_retryable());
        assert!(ArtVectorError::network("refused").is_retryable());
        assert!(!ArtVectorError::invalid_query("empty").is_retryable());
        assert!(!ArtVectorError::validation("bad k").is_retryable());
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = ArtVectorError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert!(err.to_string().contains("384"));
        assert!(err.to_string().contains("768"));
    }

    #[test]
    fn test_error_from_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ArtVectorError = io_err.into();
        assert!(matches!(err, ArtVectorError::Io(_)));

        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: ArtVectorError = json_err.into();
        assert!(matches!(err, ArtVectorError::Json(_)));
    }
}
