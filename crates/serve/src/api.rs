//! API routes for the ArtVector server

use crate::handlers::{
    handle_index_status, handle_ingest, handle_list_datasets, handle_process_batch, AppState,
};
use crate::search::handlers::handle_search;
use axum::{
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

/// API version
pub const API_VERSION: &str = "v1";

/// All routes, state still unbound
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/version", get(get_version))
        .nest("/api/v1", v1_routes())
}

fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/datasets", post(handle_ingest).get(handle_list_datasets))
        .route("/index/batch", post(handle_process_batch))
        .route("/index/status", get(handle_index_status))
        .route("/search", get(handle_search))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Get version information
pub async fn get_version() -> impl IntoResponse {
    Json(VersionResponse {
        version: crate::VERSION.to_string(),
        api_version: API_VERSION.to_string(),
    })
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Version response
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
    pub api_version: String,
}
