//! Incremental embedding batch processor
//!
//! Drains the pending subset of the store in bounded batches: select the
//! oldest pending objects, build their canonical texts, call the embedding
//! model once for the whole batch, and persist every surviving vector as a
//! single atomic write. A crash mid-batch leaves the store untouched and the
//! same objects pending; the next invocation simply retries them.

use super::{canonical_text, normalize_l2, EmbeddingError, EmbeddingProvider};
use crate::store::{ObjectStore, StoreError};
use crate::types::{ObjectUid, ScopeFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while processing a batch
#[derive(Error, Debug)]
pub enum IndexError {
    /// The embedding model call failed; the batch was aborted with no writes
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// A store read or the batch write failed; no partial state was left
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for indexing operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Outcome of one `process_batch` invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Objects embedded by this invocation
    pub embedded_this_batch: u64,
    /// Objects still pending after this invocation
    pub remaining: u64,
    /// Total objects in the store
    pub total: u64,
    /// Whether no pending objects remain
    pub done: bool,
}

/// Current indexing progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusReport {
    /// Total objects in the store
    pub total: u64,
    /// Objects with an embedding
    pub embedded: u64,
    /// Objects still pending
    pub remaining: u64,
    /// Progress percentage, 0 to 100
    pub percent: f32,
}

/// Converts pending objects into embedded objects, batch by batch
pub struct BatchProcessor {
    store: Arc<dyn ObjectStore>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl BatchProcessor {
    /// Create a processor over a store and an embedding provider
    pub fn new(store: Arc<dyn ObjectStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, provider }
    }

    /// Embed up to `batch_size` pending objects
    ///
    /// Selection is re-evaluated against current store state on every call
    /// and always takes the oldest pending objects, so repeated calls make
    /// monotonic, resumable progress and concurrent callers cannot starve
    /// any object. Objects whose canonical text is empty are skipped and
    /// stay pending; vectors with the wrong dimension (or no direction to
    /// normalize) leave their object pending as well, with a warning naming
    /// the uid.
    ///
    /// All surviving (object, vector) pairs of the batch are persisted as
    /// one atomic unit. A model or store failure aborts the whole batch with
    /// zero writes and is retryable.
    pub async fn process_batch(&self, batch_size: usize) -> Result<BatchOutcome> {
        let total = self.store.count_objects().await?;
        let pending = if batch_size == 0 {
            Vec::new()
        } else {
            self.store.get_pending(batch_size).await?
        };

        if pending.is_empty() {
            let remaining = self.remaining(total).await?;
            return Ok(BatchOutcome {
                embedded_this_batch: 0,
                remaining,
                total,
                done: remaining == 0,
            });
        }

        debug!("Selected {} pending objects", pending.len());

        // Build canonical texts; empty ones are skipped, not embedded
        let mut selected: Vec<&ObjectUid> = Vec::with_capacity(pending.len());
        let mut texts: Vec<String> = Vec::with_capacity(pending.len());
        for pending_object in &pending {
            match canonical_text(&pending_object.record) {
                Some(text) => {
                    selected.push(&pending_object.record.uid);
                    texts.push(text);
                }
                None => {
                    warn!(
                        "Object {} has no embeddable text; leaving pending",
                        pending_object.record.uid
                    );
                }
            }
        }

        let mut embedded_this_batch = 0;
        if !selected.is_empty() {
            // One model call per batch. A failure here aborts with no writes.
            let vectors = self.provider.embed_batch(&texts).await?;
            if vectors.len() != selected.len() {
                return Err(EmbeddingError::ModelFailure(format!(
                    "model returned {} vectors for {} inputs",
                    vectors.len(),
                    selected.len()
                ))
                .into());
            }

            let dimension = self.provider.dimension();
            let mut writes: Vec<(ObjectUid, Vec<f32>)> = Vec::with_capacity(vectors.len());
            for (uid, vector) in selected.into_iter().zip(vectors) {
                if vector.len() != dimension {
                    warn!(
                        "Object {} got a {}-dim vector (expected {}); leaving pending",
                        uid,
                        vector.len(),
                        dimension
                    );
                    continue;
                }
                match normalize_l2(&vector) {
                    Some(normalized) => writes.push((uid.clone(), normalized)),
                    None => {
                        warn!("Object {} got a zero vector; leaving pending", uid);
                    }
                }
            }

            if !writes.is_empty() {
                // Single atomic write; rows already embedded by a concurrent
                // processor are skipped by the store, never overwritten.
                embedded_this_batch = self.store.mark_embedded(&writes).await?;
            }
        }

        let remaining = self.remaining(total).await?;
        info!(
            "Batch embedded {} objects ({} remaining of {})",
            embedded_this_batch, remaining, total
        );

        Ok(BatchOutcome {
            embedded_this_batch,
            remaining,
            total,
            done: remaining == 0,
        })
    }

    /// Report current indexing progress
    ///
    /// `embedded + remaining == total` holds by construction.
    pub async fn job_status(&self) -> Result<JobStatusReport> {
        let total = self.store.count_objects().await?;
        let embedded = self
            .store
            .count_embedded(&ScopeFilter::all())
            .await?
            .min(total);
        let remaining = total - embedded;
        let percent = if total == 0 {
            100.0
        } else {
            (embedded as f32 / total as f32) * 100.0
        };

        Ok(JobStatusReport {
            total,
            embedded,
            remaining,
            percent,
        })
    }

    async fn remaining(&self, total: u64) -> Result<u64> {
        let embedded = self
            .store
            .count_embedded(&ScopeFilter::all())
            .await?
            .min(total);
        Ok(total - embedded)
    }
}
