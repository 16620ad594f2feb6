//! ArtVector Core Library
//!
//! Core functionality for the ArtVector semantic search pipeline: ingesting
//! tabular museum-collection records, embedding their textual descriptions
//! through an external model, persisting the vectors durably, and serving
//! nearest-neighbor text search over the embedded subset.

pub mod ai;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod search;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use ai::client::OllamaClient;
pub use config::{ArtVectorConfig, DatabaseConfig, IndexingConfig, LoggingConfig, OllamaConfig};
pub use embedding::{
    canonical_text, BatchOutcome, BatchProcessor, EmbeddingError, EmbeddingProvider, HashEmbedder,
    JobStatusReport, OllamaEmbedder,
};
pub use error::{ArtVectorError, ErrorCategory, Result};
pub use ingest::{IngestReport, IngestRequest, RawRecord, RecordMapper};
pub use search::{
    CacheEntry, CacheError, CacheKey, CachedObject, SearchCacheManager, SearchEngine, SearchError,
    SearchHit,
};
pub use service::ArtVector;
pub use store::{MemoryStore, ObjectStore, PgObjectStore, StoreError};
pub use types::{
    Dataset, DatasetId, DatasetScope, NewDataset, ObjectRecord, ObjectUid, ScopeFilter,
};

/// Initialize logging with JSON formatting
pub fn init_logging() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artvector_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    Ok(())
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::new(level);

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "text" | "pretty" => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
        "compact" => {
            registry
                .with(tracing_subscriber::fmt::layer().compact())
                .init();
        }
        _ => {
            return Err(ArtVectorError::validation(format!(
                "Unknown log format: {}",
                format
            )));
        }
    }

    Ok(())
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _: Result<()> = Ok(());
        let _id = DatasetId::new();
        let _uid = ObjectUid::from("dataset/1");
        let _scope = DatasetScope::All;
    }

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.contains("artvector-core"));
        assert!(info.contains("v"));
    }

    #[test]
    fn test_logging_init() {
        // Might already be initialized by another test; either outcome is
        // fine, it must just not panic
        match init_logging_with_config("debug", "compact") {
            Ok(()) => {}
            Err(e) => println!("Logging init failed (might be already initialized): {}", e),
        }
    }

    #[test]
    fn test_logging_rejects_unknown_format() {
        let result = init_logging_with_config("info", "xml");
        assert!(matches!(result, Err(ArtVectorError::Validation { .. })));
    }
}
