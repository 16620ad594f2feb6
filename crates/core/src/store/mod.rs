//! Durable object/dataset store
//!
//! The store is the single source of truth for datasets, objects and their
//! embeddings. Everything the pipeline keeps in memory (cache projections,
//! counters) is disposable derived state that can be rebuilt from here at
//! any time.

pub mod memory;
pub mod postgres;

use crate::types::{Dataset, DatasetId, NewDataset, ObjectRecord, ObjectUid, ScopeFilter};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgObjectStore;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database operation errors
    #[error("Database error: {0}")]
    Database(String),

    /// Dataset not found
    #[error("Dataset not found: {0}")]
    DatasetNotFound(DatasetId),

    /// Stored embedding bytes could not be decoded
    #[error("Failed to decode embedding: {0}")]
    EmbeddingDecode(String),

    /// Stored metadata could not be decoded
    #[error("Failed to decode metadata: {0}")]
    MetadataDecode(String),
}

impl StoreError {
    /// Create a database error
    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::Database(message.into())
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// A pending object as returned by [`ObjectStore::get_pending`]
#[derive(Debug, Clone)]
pub struct PendingObject {
    /// Insertion sequence number (ascending creation order)
    pub seq: i64,
    /// The object record
    pub record: ObjectRecord,
}

/// An embedded object row as returned by [`ObjectStore::fetch_embedded`]
#[derive(Debug, Clone)]
pub struct EmbeddedObject {
    /// Insertion sequence number
    pub seq: i64,
    /// Globally unique identifier
    pub uid: ObjectUid,
    /// Owning dataset
    pub dataset_id: DatasetId,
    /// Projected display title
    pub title: String,
    /// Projected display creator
    pub creator: String,
    /// Whether the record carries an image URL
    pub has_image: bool,
    /// The unit-norm embedding vector
    pub vector: Vec<f32>,
}

/// Contract the pipeline consumes from the durable store
///
/// Implementations must uphold two guarantees the rest of the system is
/// built on:
///
/// - `mark_embedded` is a single atomic unit: either every write in the
///   batch becomes visible or none does, and a row whose embedding is
///   already set is never overwritten (the null-to-vector transition happens
///   at most once per object).
/// - `get_pending` and `fetch_embedded` return rows in ascending insertion
///   order, so batch selection is deterministic and search tie-breaks are
///   meaningful.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a dataset and return it with its assigned id
    async fn create_dataset(&self, new: NewDataset) -> Result<Dataset>;

    /// Append objects to a dataset, bumping its object count
    ///
    /// Returns the number of objects appended.
    async fn append_objects(&self, dataset_id: DatasetId, objects: Vec<ObjectRecord>)
        -> Result<u64>;

    /// List all datasets, oldest first
    async fn list_datasets(&self) -> Result<Vec<Dataset>>;

    /// Fetch up to `limit` pending objects in ascending insertion order
    async fn get_pending(&self, limit: usize) -> Result<Vec<PendingObject>>;

    /// Atomically persist embeddings for a batch of objects
    ///
    /// Only rows whose embedding is still null transition; the rest are left
    /// untouched. Returns the number of rows actually updated.
    async fn mark_embedded(&self, batch: &[(ObjectUid, Vec<f32>)]) -> Result<u64>;

    /// Count embedded objects matching the filter
    async fn count_embedded(&self, filter: &ScopeFilter) -> Result<u64>;

    /// Count all objects in the store
    async fn count_objects(&self) -> Result<u64>;

    /// Fetch all embedded objects matching the filter, ascending insertion
    /// order
    async fn fetch_embedded(&self, filter: &ScopeFilter) -> Result<Vec<EmbeddedObject>>;

    /// Fetch full records for the given uids
    async fn fetch_metadata(
        &self,
        uids: &[ObjectUid],
    ) -> Result<HashMap<ObjectUid, ObjectRecord>>;
}

/// Encode an embedding as little-endian f32 bytes for storage
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode an embedding from little-endian f32 bytes
///
/// # Errors
///
/// Returns `StoreError::EmbeddingDecode` if the byte length is not a
/// multiple of 4.
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(StoreError::EmbeddingDecode(format!(
            "invalid byte length {} (must be a multiple of 4)",
            bytes.len()
        )));
    }

    let mut vector = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        vector.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_codec_round_trip() {
        let vector = vec![0.25f32, -1.0, 0.0, 3.5];
        let bytes = encode_embedding(&vector);
        assert_eq!(bytes.len(), 16);
        let decoded = decode_embedding(&bytes).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn test_decode_embedding_invalid_length() {
        let result = decode_embedding(&[1, 2, 3]);
        assert!(matches!(result, Err(StoreError::EmbeddingDecode(_))));
    }

    #[test]
    fn test_decode_embedding_empty() {
        assert_eq!(decode_embedding(&[]).unwrap().len(), 0);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::database("connection refused");
        assert_eq!(err.to_string(), "Database error: connection refused");
    }
}
