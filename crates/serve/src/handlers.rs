//! HTTP handlers for ingestion and indexing

use crate::search::types::ApiError;
use artvector_core::{ArtVector, BatchOutcome, Dataset, IngestRequest, JobStatusReport};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The assembled core service
    pub service: Arc<ArtVector>,
    /// Server configuration
    pub config: crate::ServerConfig,
}

impl AppState {
    /// Create application state around an assembled service
    pub fn new(service: Arc<ArtVector>, config: crate::ServerConfig) -> Self {
        Self { service, config }
    }
}

/// Response for dataset ingestion
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Created dataset id
    pub dataset_id: String,
    /// Number of objects ingested
    pub count: u64,
}

/// Handler for dataset ingestion
///
/// Accepts already-mapped records (tabular parsing happens on the client
/// side) and stores them all with embedding unset.
pub async fn handle_ingest(
    State(state): State<AppState>,
    Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    info!(
        "Ingesting dataset '{}' with {} records",
        payload.name,
        payload.records.len()
    );

    let report = state.service.ingest(payload).await?;

    Ok(Json(IngestResponse {
        dataset_id: report.dataset_id.to_string(),
        count: report.count,
    }))
}

/// Dataset summary for listings
#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset id
    pub id: String,
    /// Display name
    pub name: String,
    /// Source-type tag
    pub source_type: String,
    /// Originating file name
    pub source_file: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Number of objects
    pub object_count: u64,
}

impl From<Dataset> for DatasetInfo {
    fn from(dataset: Dataset) -> Self {
        Self {
            id: dataset.id.to_string(),
            name: dataset.name,
            source_type: dataset.source_type,
            source_file: dataset.source_file,
            created_at: dataset.created_at,
            object_count: dataset.object_count,
        }
    }
}

/// Response for dataset listing
#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetListResponse {
    /// All datasets, oldest first
    pub datasets: Vec<DatasetInfo>,
    /// Number of datasets
    pub total: usize,
}

/// Handler for listing datasets
pub async fn handle_list_datasets(
    State(state): State<AppState>,
) -> Result<Json<DatasetListResponse>, ApiError> {
    let datasets = state.service.list_datasets().await?;

    Ok(Json(DatasetListResponse {
        total: datasets.len(),
        datasets: datasets.into_iter().map(DatasetInfo::from).collect(),
    }))
}

/// Query parameters for batch processing
#[derive(Debug, Deserialize)]
pub struct BatchParams {
    /// Objects to embed in this batch
    #[serde(default = "default_batch_size")]
    pub size: usize,
}

fn default_batch_size() -> usize {
    artvector_core::IndexingConfig::DEFAULT_BATCH_SIZE
}

/// Handler for running one embedding batch
pub async fn handle_process_batch(
    State(state): State<AppState>,
    Query(params): Query<BatchParams>,
) -> Result<Json<BatchOutcome>, ApiError> {
    info!("Processing embedding batch of up to {}", params.size);

    let outcome = state.service.process_batch(params.size).await?;
    Ok(Json(outcome))
}

/// Handler for indexing status
pub async fn handle_index_status(
    State(state): State<AppState>,
) -> Result<Json<JobStatusReport>, ApiError> {
    let status = state.service.job_status().await?;
    Ok(Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_batch_size() {
        assert_eq!(default_batch_size(), 128);
    }

    #[test]
    fn test_dataset_info_from_dataset() {
        let dataset = Dataset {
            id: artvector_core::DatasetId::new(),
            name: "met".to_string(),
            source_type: "json".to_string(),
            source_file: "met.json".to_string(),
            created_at: Utc::now(),
            fields: vec!["Title".to_string()],
            object_count: 12,
        };
        let id = dataset.id.to_string();

        let info = DatasetInfo::from(dataset);
        assert_eq!(info.id, id);
        assert_eq!(info.object_count, 12);
    }
}
