//! Search API types and error mapping

use artvector_core::{ArtVectorError, SearchHit};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Query parameters for the search endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search query string
    pub q: String,

    /// Maximum number of results (default: 10)
    #[serde(default = "default_k")]
    pub k: i64,

    /// Restrict to one dataset (uuid); absent means all datasets
    pub dataset: Option<String>,

    /// Restrict to objects carrying an image
    #[serde(default)]
    pub images_only: bool,
}

fn default_k() -> i64 {
    10
}

/// One search result on the wire
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    /// Object uid
    pub uid: String,
    /// Owning dataset id
    pub dataset_id: String,
    /// Display title
    pub title: String,
    /// Display creator
    pub creator: String,
    /// Whether the record carries an image URL
    pub has_image: bool,
    /// Image URL resolved from the original fields, if any
    pub image_url: Option<String>,
}

impl From<SearchHit> for SearchResultItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            score: hit.score,
            uid: hit.object.uid.to_string(),
            dataset_id: hit.object.dataset_id.to_string(),
            title: hit.object.title,
            creator: hit.object.creator,
            has_image: hit.object.has_image,
            image_url: None,
        }
    }
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query that was searched
    pub query: String,
    /// Ranked results, best first
    pub results: Vec<SearchResultItem>,
    /// Number of results returned
    pub total_results: usize,
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// API-level error wrapper with HTTP status mapping
///
/// Invalid input maps to 400, an unreachable embedding model to 502, and
/// everything else to 500 with the detail logged rather than leaked.
#[derive(Debug)]
pub struct ApiError(pub ArtVectorError);

impl From<ArtVectorError> for ApiError {
    fn from(error: ArtVectorError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ArtVectorError::InvalidQuery { message } => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            ArtVectorError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            ArtVectorError::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("Not found: {}", resource))
            }
            ArtVectorError::EmbeddingModel { message } => {
                error!("Embedding model error: {}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    "Embedding model unavailable".to_string(),
                )
            }
            other => {
                error!("Internal error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
