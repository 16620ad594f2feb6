//! kNN query engine
//!
//! Turns a raw query string into a ranked list of the most semantically
//! similar embedded objects within a scope. Both the query vector and every
//! projection row are unit norm, so cosine similarity is a plain dot
//! product.

use super::cache::{CacheError, CacheKey, CachedObject, SearchCacheManager};
use super::query_cache::QueryEmbeddingCache;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::types::DatasetScope;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during search
#[derive(Error, Debug)]
pub enum SearchError {
    /// Empty or whitespace-only query; rejected before any store access
    #[error("Query string cannot be empty")]
    InvalidQuery,

    /// Failed to embed the query
    ///
    /// Surfaced to the caller rather than silently returning stale or wrong
    /// results; distinguishable from "no results" (an empty list).
    #[error("Failed to embed query: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Failed to build the scope projection
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;

/// One ranked search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    /// The matched object
    pub object: CachedObject,
}

/// Scores queries against scope projections
pub struct SearchEngine {
    cache: Arc<SearchCacheManager>,
    provider: Arc<dyn EmbeddingProvider>,
    query_cache: QueryEmbeddingCache,
}

impl SearchEngine {
    /// Create an engine over a projection cache and an embedding provider
    ///
    /// The provider must be the same instance (same model, same
    /// normalization) used at ingestion time.
    pub fn new(cache: Arc<SearchCacheManager>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            cache,
            provider,
            query_cache: QueryEmbeddingCache::default(),
        }
    }

    /// Find the `k` embedded objects most similar to the query
    ///
    /// Ranking is score descending; ties break by original insertion order
    /// ascending, so results are fully deterministic. `k` is clamped to the
    /// number of available rows and `k <= 0` yields an empty list. An empty
    /// projection (nothing embedded in scope yet) also yields an empty list,
    /// which is not an error.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidQuery` for an empty or whitespace-only
    /// query, `SearchError::Embedding` if the model call fails and
    /// `SearchError::Cache` if the projection cannot be built.
    pub async fn search(
        &self,
        query: &str,
        k: i64,
        scope: DatasetScope,
        images_only: bool,
    ) -> Result<Vec<SearchHit>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        if k <= 0 {
            return Ok(Vec::new());
        }

        let key = CacheKey { scope, images_only };
        let entry = self.cache.get(&key).await?;
        if entry.is_empty() {
            debug!("No embedded objects in scope {:?}", key);
            return Ok(Vec::new());
        }

        let query_vec = self
            .query_cache
            .get_or_compute(trimmed, |text| {
                let provider = Arc::clone(&self.provider);
                async move { provider.embed(&text).await }
            })
            .await?;

        let dimension = self.provider.dimension();
        if query_vec.len() != dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: query_vec.len(),
            }
            .into());
        }

        // Dense scan over the projection; both sides are unit norm
        let mut scored: Vec<(usize, f32)> = entry
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, row)| (idx, dot(&query_vec, row).clamp(-1.0, 1.0)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let limit = (k as usize).min(scored.len());
        let hits: Vec<SearchHit> = scored
            .into_iter()
            .take(limit)
            .map(|(idx, score)| SearchHit {
                score,
                object: entry.items[idx].clone(),
            })
            .collect();

        info!(
            "Search '{}' over {} rows returned {} hits",
            trimmed,
            entry.len(),
            hits.len()
        );

        Ok(hits)
    }
}

/// Dot product of two equal-length vectors
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::store::{MemoryStore, ObjectStore};
    use crate::types::{DatasetId, NewDataset, ObjectRecord, ObjectUid};

    async fn seeded() -> (Arc<MemoryStore>, DatasetId) {
        let store = Arc::new(MemoryStore::new());
        let dataset = store
            .create_dataset(NewDataset {
                name: "met".to_string(),
                source_type: "json".to_string(),
                source_file: "met.json".to_string(),
                fields: vec![],
            })
            .await
            .unwrap();
        (store, dataset.id)
    }

    async fn add_embedded(
        store: &Arc<MemoryStore>,
        dataset_id: DatasetId,
        original_id: &str,
        vector: Vec<f32>,
    ) {
        let record = ObjectRecord {
            uid: ObjectUid::derive(dataset_id, original_id),
            dataset_id,
            title: format!("object {}", original_id),
            creator: String::new(),
            has_image: false,
            metadata: serde_json::Map::new(),
        };
        let uid = record.uid.clone();
        store
            .append_objects(dataset_id, vec![record])
            .await
            .unwrap();
        store.mark_embedded(&[(uid, vector)]).await.unwrap();
    }

    fn engine(store: Arc<MemoryStore>, dimension: usize) -> SearchEngine {
        let cache = Arc::new(SearchCacheManager::new(store as Arc<dyn ObjectStore>));
        SearchEngine::new(cache, Arc::new(HashEmbedder::new(dimension)))
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (store, _) = seeded().await;
        let engine = engine(store, 16);

        assert!(matches!(
            engine.search("", 10, DatasetScope::All, false).await,
            Err(SearchError::InvalidQuery)
        ));
        assert!(matches!(
            engine.search("   ", 10, DatasetScope::All, false).await,
            Err(SearchError::InvalidQuery)
        ));
    }

    #[tokio::test]
    async fn test_non_positive_k_yields_empty() {
        let (store, dataset) = seeded().await;
        add_embedded(&store, dataset, "1", vec![1.0, 0.0]).await;
        let engine = engine(store, 2);

        let hits = engine
            .search("query", 0, DatasetScope::All, false)
            .await
            .unwrap();
        assert!(hits.is_empty());

        let hits = engine
            .search("query", -3, DatasetScope::All, false)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_scope_yields_empty_not_error() {
        let (store, _) = seeded().await;
        let engine = engine(store, 16);

        let hits = engine
            .search("anything", 10, DatasetScope::All, false)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_scores_non_increasing_and_at_most_k() {
        let (store, dataset) = seeded().await;
        let embedder = HashEmbedder::new(16);
        for i in 0..8 {
            let vector = embedder.embed(&format!("object {}", i)).await.unwrap();
            add_embedded(&store, dataset, &i.to_string(), vector).await;
        }
        let engine = engine(store, 16);

        let hits = engine
            .search("object 3", 5, DatasetScope::All, false)
            .await
            .unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(hits.iter().all(|h| (-1.0..=1.0).contains(&h.score)));
    }

    #[tokio::test]
    async fn test_k_clamped_to_row_count() {
        let (store, dataset) = seeded().await;
        add_embedded(&store, dataset, "1", vec![1.0, 0.0]).await;
        add_embedded(&store, dataset, "2", vec![0.0, 1.0]).await;
        let engine = engine(store, 2);

        let hits = engine
            .search("query", 100, DatasetScope::All, false)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_exact_match_ranks_first() {
        let (store, dataset) = seeded().await;
        let embedder = HashEmbedder::new(16);
        for text in ["bronze statue", "oil painting", "silk tapestry"] {
            let vector = embedder.embed(text).await.unwrap();
            add_embedded(&store, dataset, text, vector).await;
        }
        let engine = engine(store, 16);

        // The object embedded from the identical text scores 1.0 and wins
        let hits = engine
            .search("oil painting", 3, DatasetScope::All, false)
            .await
            .unwrap();
        assert_eq!(hits[0].object.uid, ObjectUid::derive(dataset, "oil painting"));
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_ties_break_by_insertion_order() {
        let (store, dataset) = seeded().await;
        // Three identical vectors: scores tie exactly
        for id in ["first", "second", "third"] {
            add_embedded(&store, dataset, id, vec![1.0, 0.0]).await;
        }
        let engine = engine(store, 2);

        let hits = engine
            .search("query", 3, DatasetScope::All, false)
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].object.uid, ObjectUid::derive(dataset, "first"));
        assert_eq!(hits[1].object.uid, ObjectUid::derive(dataset, "second"));
        assert_eq!(hits[2].object.uid, ObjectUid::derive(dataset, "third"));
    }

    #[tokio::test]
    async fn test_repeated_query_is_deterministic() {
        let (store, dataset) = seeded().await;
        add_embedded(&store, dataset, "1", vec![1.0, 0.0]).await;
        let engine = engine(store, 2);

        let first = engine
            .search("amphora", 1, DatasetScope::All, false)
            .await
            .unwrap();
        let second = engine
            .search("amphora", 1, DatasetScope::All, false)
            .await
            .unwrap();
        assert_eq!(first[0].score, second[0].score);
        assert_eq!(first[0].object.uid, second[0].object.uid);
    }
}
