//! Deterministic hash-based embedding provider
//!
//! Produces stable, unit-norm vectors from a hash of the input text. No
//! model, no network: identical input always yields the identical vector,
//! which makes ranking and pipeline behavior reproducible in tests and
//! offline demos. The vectors carry no semantic meaning.

use super::{normalize_l2, EmbeddingError, EmbeddingProvider, Result};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic embedding provider for tests and offline use
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create a hash embedder producing vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn raw_vector(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut vector = Vec::with_capacity(self.dimension);
        for idx in 0..self.dimension {
            // Re-hash the seed per component so components are decorrelated
            let mut component_hasher = DefaultHasher::new();
            (seed, idx as u64).hash(&mut component_hasher);
            let bits = component_hasher.finish();
            // Map to (-1, 1)
            let value = (bits % 2_000_001) as f32 / 1_000_000.0 - 1.0;
            vector.push(value);
        }
        vector
    }
}

impl Default for HashEmbedder {
    /// Default to the same dimension the real model produces
    fn default() -> Self {
        Self::new(crate::config::IndexingConfig::DEFAULT_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }
        normalize_l2(&self.raw_vector(text)).ok_or(EmbeddingError::ZeroVector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let raw = self.raw_vector(text);
                normalize_l2(&raw).unwrap_or(raw)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashEmbedder::new(16);
        let a = embedder.embed("bronze statue").await.unwrap();
        let b = embedder.embed("bronze statue").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_distinct_texts_distinct_vectors() {
        let embedder = HashEmbedder::new(16);
        let a = embedder.embed("bronze statue").await.unwrap();
        let b = embedder.embed("oil painting").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unit_norm() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("ceramic vase").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(v.len(), 64);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let embedder = HashEmbedder::new(16);
        assert!(matches!(
            embedder.embed("   ").await,
            Err(EmbeddingError::EmptyText)
        ));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let embedder = HashEmbedder::new(16);
        let single = embedder.embed("tapestry").await.unwrap();
        let batch = embedder
            .embed_batch(&["tapestry".to_string()])
            .await
            .unwrap();
        assert_eq!(batch[0], single);
    }
}
