//! Embedding generation for collection objects
//!
//! This module defines the embedding provider contract, the Ollama-backed
//! implementation, and L2 normalization. Every vector that leaves a provider
//! is unit norm, which is what lets the search engine score with a plain dot
//! product.

pub mod canonical;
pub mod hash;
pub mod processor;

use crate::ai::client::{EmbedRequest, OllamaClient};
use crate::config::OllamaConfig;
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub use canonical::canonical_text;
pub use hash::HashEmbedder;
pub use processor::{BatchOutcome, BatchProcessor, JobStatusReport};

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The external embedding model call failed
    #[error("Embedding model failure: {0}")]
    ModelFailure(String),

    /// Empty text provided for embedding
    #[error("Cannot generate embedding for empty text")]
    EmptyText,

    /// Embedding dimension mismatch
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The model returned a zero vector, which has no direction to normalize
    #[error("Embedding model returned a zero vector")]
    ZeroVector,
}

/// Result type alias for embedding operations
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Contract for generating unit-norm embeddings from text
///
/// Implementations must return vectors of exactly `dimension()` length,
/// normalized to unit L2 norm. The query path and the ingestion path share
/// one provider instance so both sides of every dot product went through the
/// identical pipeline.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// The fixed dimension every produced vector has
    fn dimension(&self) -> usize;

    /// Generate a unit-norm embedding for one text
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::EmptyText` for whitespace-only input and
    /// `EmbeddingError::ModelFailure` if the model call fails.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts in one model call
    ///
    /// Vectors are unit norm wherever the model produced a usable vector.
    /// A degenerate vector (wrong dimension, zero norm) is returned as-is
    /// so the caller can dead-letter that object alone instead of failing
    /// the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::ModelFailure` if the call fails; no partial
    /// results are returned.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Normalize a vector to unit L2 norm
///
/// Returns `None` for a zero (or numerically vanishing) vector, which cannot
/// be normalized and must not enter the similarity space.
pub fn normalize_l2(vector: &[f32]) -> Option<Vec<f32>> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return None;
    }
    Some(vector.iter().map(|x| x / norm).collect())
}

/// Ollama-backed embedding provider
///
/// Wraps the [`OllamaClient`] and applies L2 normalization, since the model
/// is not trusted to return unit vectors.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// Create a new embedder for the given model and expected dimension
    pub fn new(client: OllamaClient, model: String, dimension: usize) -> Self {
        Self {
            client,
            model,
            dimension,
        }
    }

    /// Create an embedder from the Ollama configuration section
    pub fn from_config(config: &OllamaConfig, dimension: usize) -> Self {
        Self::new(
            OllamaClient::from_config(config),
            config.embedding_model.clone(),
            dimension,
        )
    }

    /// The model name this embedder uses
    pub fn model(&self) -> &str {
        &self.model
    }

    fn finish(&self, raw: Vec<f32>) -> Result<Vec<f32>> {
        if raw.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: raw.len(),
            });
        }
        normalize_l2(&raw).ok_or(EmbeddingError::ZeroVector)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        debug!("Embedding text of length {}", text.len());

        let raw = self
            .client
            .embed(EmbedRequest {
                model: self.model.clone(),
                prompt: text.to_string(),
            })
            .await
            .map_err(|e| EmbeddingError::ModelFailure(e.to_string()))?;

        self.finish(raw)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding batch of {} texts", texts.len());

        let raw = self
            .client
            .embed_batch(&self.model, texts)
            .await
            .map_err(|e| EmbeddingError::ModelFailure(e.to_string()))?;

        // Only transport/model failures abort a batch. A single degenerate
        // vector (wrong dimension, zero norm) is passed through for the
        // caller to dead-letter per object.
        Ok(raw
            .into_iter()
            .map(|v| normalize_l2(&v).unwrap_or(v))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_l2_unit_norm() {
        let normalized = normalize_l2(&[3.0, 4.0]).unwrap();
        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_l2_already_unit() {
        let normalized = normalize_l2(&[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(normalized, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize_l2_zero_vector() {
        assert!(normalize_l2(&[0.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_embedding_error_display() {
        let err = EmbeddingError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert!(err.to_string().contains("384"));
        assert!(err.to_string().contains("768"));

        assert_eq!(
            EmbeddingError::EmptyText.to_string(),
            "Cannot generate embedding for empty text"
        );
    }
}
