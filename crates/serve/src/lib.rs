//! ArtVector Serve Library
//!
//! HTTP interface for the ArtVector pipeline: dataset ingestion, batch
//! indexing and semantic search over one shared service instance.

pub mod api;
pub mod handlers;
pub mod search;
pub mod server;

pub use handlers::AppState;
pub use server::{ArtVectorServer, ServerBuilder};

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_enabled: true,
            max_request_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ServerConfig {
    /// Build a server config from the core configuration's server section
    pub fn from_section(section: &artvector_core::config::ServerSection) -> Self {
        Self {
            host: section.host.clone(),
            port: section.port,
            cors_enabled: section.cors_enabled,
            max_request_size: section.max_request_size,
        }
    }
}
