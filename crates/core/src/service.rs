//! Service facade
//!
//! Wires the store, the embedding provider, the projection cache and the kNN
//! engine into one injectable object exposing the serving-layer surface:
//! ingest, process_batch, job_status, search. Constructed once at startup
//! and passed around by handle; never global state.

use crate::embedding::{BatchOutcome, BatchProcessor, EmbeddingProvider, JobStatusReport};
use crate::error::{ArtVectorError, Result};
use crate::ingest::{IngestReport, IngestRequest, RecordMapper};
use crate::search::{SearchCacheManager, SearchEngine, SearchError, SearchHit};
use crate::store::ObjectStore;
use crate::types::{Dataset, DatasetScope, ObjectRecord, ObjectUid};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// The assembled ArtVector service
pub struct ArtVector {
    store: Arc<dyn ObjectStore>,
    mapper: RecordMapper,
    processor: BatchProcessor,
    engine: SearchEngine,
}

impl ArtVector {
    /// Assemble the service from a store and an embedding provider
    ///
    /// The same provider instance serves both the ingestion and the query
    /// path, which is what keeps stored vectors and query vectors in the
    /// same space.
    pub fn new(store: Arc<dyn ObjectStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let cache = Arc::new(SearchCacheManager::new(Arc::clone(&store)));
        let processor = BatchProcessor::new(Arc::clone(&store), Arc::clone(&provider));
        let engine = SearchEngine::new(cache, provider);

        Self {
            store,
            mapper: RecordMapper,
            processor,
            engine,
        }
    }

    /// Ingest mapped records as a new dataset, all with embedding unset
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty dataset name and a store
    /// error if persistence fails.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReport> {
        if request.name.trim().is_empty() {
            return Err(ArtVectorError::validation("Dataset name cannot be empty"));
        }

        let dataset = self
            .store
            .create_dataset(request.new_dataset())
            .await
            .map_err(|e| ArtVectorError::store(e.to_string()))?;

        let objects = self.mapper.map_records(dataset.id, &request.records);
        let count = self
            .store
            .append_objects(dataset.id, objects)
            .await
            .map_err(|e| ArtVectorError::store(e.to_string()))?;

        info!("Ingested {} objects into dataset {}", count, dataset.id);

        Ok(IngestReport {
            dataset_id: dataset.id,
            count,
        })
    }

    /// Embed up to `batch_size` pending objects
    ///
    /// # Errors
    ///
    /// Returns a retryable embedding-model or store error; either way the
    /// batch left no partial state behind.
    pub async fn process_batch(&self, batch_size: usize) -> Result<BatchOutcome> {
        self.processor
            .process_batch(batch_size)
            .await
            .map_err(Into::into)
    }

    /// Report indexing progress
    pub async fn job_status(&self) -> Result<JobStatusReport> {
        self.processor.job_status().await.map_err(Into::into)
    }

    /// Search the embedded subset of a scope
    ///
    /// # Errors
    ///
    /// Returns `ArtVectorError::InvalidQuery` for an empty query; model and
    /// cache failures surface as their own variants, distinguishable from
    /// an empty result list.
    pub async fn search(
        &self,
        query: &str,
        k: i64,
        scope: DatasetScope,
        images_only: bool,
    ) -> Result<Vec<SearchHit>> {
        self.engine
            .search(query, k, scope, images_only)
            .await
            .map_err(Into::into)
    }

    /// Fetch full records for the given uids
    ///
    /// Search hits only carry lightweight display metadata; callers that
    /// need the original fields (image URLs and the rest) resolve them
    /// through here.
    pub async fn fetch_objects(
        &self,
        uids: &[ObjectUid],
    ) -> Result<HashMap<ObjectUid, ObjectRecord>> {
        self.store
            .fetch_metadata(uids)
            .await
            .map_err(|e| ArtVectorError::store(e.to_string()))
    }

    /// List all datasets
    pub async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        self.store
            .list_datasets()
            .await
            .map_err(|e| ArtVectorError::store(e.to_string()))
    }

    /// The store this service operates on
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }
}

impl From<SearchError> for ArtVectorError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::InvalidQuery => {
                ArtVectorError::invalid_query("Query string cannot be empty")
            }
            SearchError::Embedding(e) => embedding_error(e),
            SearchError::Cache(e) => ArtVectorError::cache_build(e.to_string()),
        }
    }
}

impl From<crate::embedding::processor::IndexError> for ArtVectorError {
    fn from(error: crate::embedding::processor::IndexError) -> Self {
        match error {
            crate::embedding::processor::IndexError::Embedding(e) => embedding_error(e),
            crate::embedding::processor::IndexError::Store(e) => {
                ArtVectorError::store(e.to_string())
            }
        }
    }
}

fn embedding_error(error: crate::embedding::EmbeddingError) -> ArtVectorError {
    use crate::embedding::EmbeddingError;
    match error {
        EmbeddingError::DimensionMismatch { expected, actual } => {
            ArtVectorError::DimensionMismatch { expected, actual }
        }
        other => ArtVectorError::embedding_model(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::ingest::RawRecord;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn service() -> ArtVector {
        ArtVector::new(
            Arc::new(MemoryStore::new()),
            Arc::new(HashEmbedder::new(16)),
        )
    }

    fn records(count: usize) -> Vec<RawRecord> {
        (0..count)
            .map(|i| {
                let mut record = RawRecord::new();
                record.insert("ObjectID".to_string(), json!(i.to_string()));
                record.insert("Title".to_string(), json!(format!("object {}", i)));
                record
            })
            .collect()
    }

    fn request(name: &str, count: usize) -> IngestRequest {
        IngestRequest {
            name: name.to_string(),
            source_type: "json".to_string(),
            source_file: format!("{}.json", name),
            fields: None,
            records: records(count),
        }
    }

    #[tokio::test]
    async fn test_ingest_then_status() {
        let service = service();
        let report = service.ingest(request("met", 5)).await.unwrap();
        assert_eq!(report.count, 5);

        let status = service.job_status().await.unwrap();
        assert_eq!(status.total, 5);
        assert_eq!(status.embedded, 0);
        assert_eq!(status.remaining, 5);
    }

    #[tokio::test]
    async fn test_ingest_rejects_empty_name() {
        let service = service();
        let result = service.ingest(request("  ", 1)).await;
        assert!(matches!(result, Err(ArtVectorError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let service = service();
        service.ingest(request("met", 4)).await.unwrap();

        let outcome = service.process_batch(10).await.unwrap();
        assert_eq!(outcome.embedded_this_batch, 4);
        assert!(outcome.done);

        let hits = service
            .search("object 2", 2, DatasetScope::All, false)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object.title, "object 2");
    }

    #[tokio::test]
    async fn test_search_error_mapping() {
        let service = service();
        let result = service.search("", 5, DatasetScope::All, false).await;
        assert!(matches!(result, Err(ArtVectorError::InvalidQuery { .. })));
    }

    #[tokio::test]
    async fn test_list_datasets() {
        let service = service();
        service.ingest(request("a", 1)).await.unwrap();
        service.ingest(request("b", 2)).await.unwrap();

        let datasets = service.list_datasets().await.unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].name, "a");
        assert_eq!(datasets[1].object_count, 2);
    }
}
