//! Query embedding cache
//!
//! LRU cache for query-text embeddings, so frequently repeated queries skip
//! the model round trip. Keys are the exact query text and embeddings are
//! deterministic for a given text, so entries can never go stale; eviction
//! exists purely to bound memory.

use moka::future::Cache;
use std::sync::Arc;
use tracing::{debug, trace};

/// Query-text to embedding LRU cache
#[derive(Clone)]
pub struct QueryEmbeddingCache {
    cache: Cache<String, Arc<Vec<f32>>>,
}

impl QueryEmbeddingCache {
    /// Create a cache holding up to `capacity` query embeddings
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(capacity).build();

        debug!("Created query embedding cache with capacity {}", capacity);

        Self { cache }
    }

    /// Retrieve a cached embedding for a query
    pub async fn get(&self, query: &str) -> Option<Arc<Vec<f32>>> {
        let result = self.cache.get(query).await;
        if result.is_some() {
            trace!("Query cache hit for '{}'", query);
        } else {
            trace!("Query cache miss for '{}'", query);
        }
        result
    }

    /// Insert a query embedding
    pub async fn insert(&self, query: impl Into<String>, embedding: Vec<f32>) {
        self.cache.insert(query.into(), Arc::new(embedding)).await;
    }

    /// Get or compute an embedding
    ///
    /// Retrieves from cache if available, otherwise computes via the
    /// provided function and caches the result.
    ///
    /// # Errors
    ///
    /// Returns any error from the compute function; nothing is cached on
    /// error.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        query: &str,
        compute_fn: F,
    ) -> std::result::Result<Arc<Vec<f32>>, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: std::future::Future<Output = std::result::Result<Vec<f32>, E>>,
    {
        if let Some(cached) = self.get(query).await {
            return Ok(cached);
        }

        trace!("Computing embedding for query '{}'", query);
        let embedding = compute_fn(query.to_string()).await?;
        let arc_embedding = Arc::new(embedding);

        self.cache
            .insert(query.to_string(), Arc::clone(&arc_embedding))
            .await;

        Ok(arc_embedding)
    }

    /// Number of cached entries
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for QueryEmbeddingCache {
    /// Create a default cache with capacity of 1000 entries
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = QueryEmbeddingCache::new(100);
        cache.insert("marble bust", vec![0.1, 0.2, 0.3]).await;

        let cached = cache.get("marble bust").await;
        assert!(cached.is_some());
        assert_eq!(*cached.unwrap(), vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_miss() {
        let cache = QueryEmbeddingCache::new(100);
        assert!(cache.get("never seen").await.is_none());
    }

    #[tokio::test]
    async fn test_get_or_compute_hit_skips_compute() {
        let cache = QueryEmbeddingCache::new(100);
        cache.insert("amphora", vec![1.0, 0.0]).await;

        let result: std::result::Result<_, std::io::Error> = cache
            .get_or_compute("amphora", |_| async {
                panic!("compute_fn must not run on a hit");
            })
            .await;

        assert_eq!(*result.unwrap(), vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn test_get_or_compute_miss_caches() {
        let cache = QueryEmbeddingCache::new(100);

        let result: std::result::Result<_, std::io::Error> = cache
            .get_or_compute("amphora", |q| async move {
                assert_eq!(q, "amphora");
                Ok(vec![0.5, 0.5])
            })
            .await;
        assert_eq!(*result.unwrap(), vec![0.5, 0.5]);

        assert!(cache.get("amphora").await.is_some());
    }

    #[tokio::test]
    async fn test_get_or_compute_error_not_cached() {
        let cache = QueryEmbeddingCache::new(100);

        let result: std::result::Result<Arc<Vec<f32>>, std::io::Error> = cache
            .get_or_compute("amphora", |_| async {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "model down"))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.get("amphora").await.is_none());
    }
}
