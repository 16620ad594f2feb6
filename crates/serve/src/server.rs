//! Server module for the ArtVector serve crate

use crate::api::create_routes;
use crate::handlers::AppState;
use crate::ServerConfig;
use artvector_core::{ArtVector, ArtVectorError, Result};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// ArtVector HTTP server
pub struct ArtVectorServer {
    config: ServerConfig,
    app: Router,
}

impl ArtVectorServer {
    /// Create a new server around an assembled service
    pub fn new(config: ServerConfig, service: Arc<ArtVector>) -> Self {
        let app = create_app(&config, service);
        Self { config, app }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| ArtVectorError::validation(format!("Invalid address {}: {}", addr, e)))?;

        tracing::info!("Starting ArtVector server on {}", addr);

        let listener = tokio::net::TcpListener::bind(socket_addr)
            .await
            .map_err(|e| ArtVectorError::network(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, self.app)
            .await
            .map_err(|e| ArtVectorError::network(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Create the Axum application with middleware
pub fn create_app(config: &ServerConfig, service: Arc<ArtVector>) -> Router {
    let state = AppState::new(service, config.clone());

    let mut app = create_routes().with_state(state);

    app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.max_request_size)),
    );

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin("*".parse::<HeaderValue>().expect("valid origin"))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE]);

        app = app.layer(cors);
    }

    app
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    /// Set maximum request size
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.max_request_size = size;
        self
    }

    /// Build the server around an assembled service
    pub fn build(self, service: Arc<ArtVector>) -> ArtVectorServer {
        ArtVectorServer::new(self.config, service)
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
