//! ArtVector CLI Library
//!
//! Command-line interface components for the ArtVector pipeline.

use artvector_core::{
    ArtVector, ArtVectorConfig, ArtVectorError, OllamaEmbedder, PgObjectStore, Result,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod commands;
pub mod output;

pub use commands::*;
pub use output::*;

/// CLI version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load configuration from an optional file path
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config(path: Option<&Path>) -> Result<ArtVectorConfig> {
    ArtVectorConfig::load(path)
}

/// Assemble the service against PostgreSQL and Ollama
///
/// Connects the store, ensures the schema exists, and wires in the
/// Ollama-backed embedding provider from the configuration.
///
/// # Errors
///
/// Returns a validation error if no database URL is configured and a store
/// error if the connection or schema setup fails.
pub async fn connect_service(config: &ArtVectorConfig) -> Result<Arc<ArtVector>> {
    if config.database.url.is_empty() {
        return Err(ArtVectorError::validation(
            "Database URL must be provided via the config file or DATABASE_URL",
        ));
    }

    let store = PgObjectStore::connect(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| ArtVectorError::store(e.to_string()))?;
    store
        .init_schema()
        .await
        .map_err(|e| ArtVectorError::store(e.to_string()))?;

    let provider = OllamaEmbedder::from_config(&config.ollama, config.indexing.dimension);

    Ok(Arc::new(ArtVector::new(
        Arc::new(store),
        Arc::new(provider),
    )))
}

/// Get the default config file path if one exists next to the process
pub fn default_config_path() -> Option<PathBuf> {
    let candidate = PathBuf::from("artvector.yaml");
    candidate.exists().then_some(candidate)
}

/// Check if running in CI environment
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
}

/// Get the appropriate exit code for an error
pub fn exit_code_for_error(error: &ArtVectorError) -> i32 {
    match error {
        ArtVectorError::Validation { .. } | ArtVectorError::InvalidQuery { .. } => 2,
        ArtVectorError::NotFound { .. } => 3,
        ArtVectorError::Network { .. } => 5,
        ArtVectorError::EmbeddingModel { .. } | ArtVectorError::ModelNotAvailable { .. } => 6,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let validation_error = ArtVectorError::validation("test");
        assert_eq!(exit_code_for_error(&validation_error), 2);

        let not_found_error = ArtVectorError::not_found("test");
        assert_eq!(exit_code_for_error(&not_found_error), 3);

        let model_error = ArtVectorError::embedding_model("test");
        assert_eq!(exit_code_for_error(&model_error), 6);

        let store_error = ArtVectorError::store("test");
        assert_eq!(exit_code_for_error(&store_error), 1);
    }

    #[test]
    fn test_load_config_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.ollama.embedding_model, "all-minilm");
    }
}
