//! Search API handler
//!
//! `GET /api/v1/search?q=query&k=10&dataset=<uuid>&images_only=true`
//!
//! An empty result list means nothing matched; errors (bad query, model
//! down, projection build failure) surface as HTTP errors instead.

use crate::handlers::AppState;
use crate::search::types::{ApiError, SearchQuery, SearchResponse, SearchResultItem};
use artvector_core::{ingest::image_url, ArtVectorError, DatasetScope, ObjectUid};
use axum::{
    extract::{Query, State},
    response::Json,
};
use tracing::info;

/// GET search handler
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    info!(
        "Search request: query='{}', k={}, dataset={:?}, images_only={}",
        params.q, params.k, params.dataset, params.images_only
    );

    let scope = match &params.dataset {
        Some(raw) => {
            let id = raw.parse().map_err(|_| {
                ArtVectorError::validation(format!("Invalid dataset id: {}", raw))
            })?;
            DatasetScope::Dataset(id)
        }
        None => DatasetScope::All,
    };

    let hits = state
        .service
        .search(&params.q, params.k, scope, params.images_only)
        .await?;

    // Hits carry only the projection's lightweight metadata; resolve image
    // URLs from the full records
    let uids: Vec<ObjectUid> = hits.iter().map(|hit| hit.object.uid.clone()).collect();
    let records = state.service.fetch_objects(&uids).await?;

    let results: Vec<SearchResultItem> = hits
        .into_iter()
        .map(|hit| {
            let image = records.get(&hit.object.uid).and_then(image_url);
            let mut item = SearchResultItem::from(hit);
            item.image_url = image;
            item
        })
        .collect();

    info!(
        "Search completed: {} results for query '{}'",
        results.len(),
        params.q
    );

    Ok(Json(SearchResponse {
        query: params.q,
        total_results: results.len(),
        results,
    }))
}
