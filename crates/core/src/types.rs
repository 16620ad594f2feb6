//! Core type definitions for ArtVector

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dataset identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(pub Uuid);

impl DatasetId {
    /// Generate a new random dataset ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DatasetId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for DatasetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique object identifier
///
/// Derived deterministically as `"{dataset_id}/{original_id}"`, which keeps
/// uids unique across datasets even when their original per-record ids
/// overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectUid(pub String);

impl ObjectUid {
    /// Build a uid from a dataset id and the record's original identifier
    pub fn derive(dataset_id: DatasetId, original_id: &str) -> Self {
        Self(format!("{}/{}", dataset_id, original_id))
    }
}

impl From<String> for ObjectUid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectUid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ObjectUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dataset of ingested collection objects
///
/// Created once at ingestion time. Only `object_count` mutates afterwards,
/// bumped by the store as objects are appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Unique dataset identifier
    pub id: DatasetId,
    /// Display name
    pub name: String,
    /// Source-type tag (e.g. "csv", "json")
    pub source_type: String,
    /// Originating file name
    pub source_file: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Ordered schema field names
    pub fields: Vec<String>,
    /// Number of objects appended so far
    pub object_count: u64,
}

/// Parameters for creating a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDataset {
    /// Display name
    pub name: String,
    /// Source-type tag
    pub source_type: String,
    /// Originating file name
    pub source_file: String,
    /// Ordered schema field names
    pub fields: Vec<String>,
}

/// A collection object as produced by ingestion
///
/// The embedding is not part of this type; it lives as a nullable column in
/// the store and transitions null to vector exactly once, written by the
/// batch processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRecord {
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
    /// All original fields, untouched
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Dataset scoping for counts, projections and search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetScope {
    /// All datasets
    All,
    /// A single dataset
    Dataset(DatasetId),
}

impl Default for DatasetScope {
    fn default() -> Self {
        Self::All
    }
}

impl std::fmt::Display for DatasetScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Dataset(id) => write!(f, "{}", id),
        }
    }
}

/// Filter applied to store counts and scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeFilter {
    /// Dataset scope
    pub dataset: DatasetScope,
    /// Restrict to objects carrying an image
    pub images_only: bool,
}

impl ScopeFilter {
    /// Filter matching every object
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching a single dataset
    pub fn dataset(id: DatasetId) -> Self {
        Self {
            dataset: DatasetScope::Dataset(id),
            images_only: false,
        }
    }

    /// Check whether an object matches this filter
    pub fn matches(&self, dataset_id: DatasetId, has_image: bool) -> bool {
        let dataset_ok = match self.dataset {
            DatasetScope::All => true,
            DatasetScope::Dataset(id) => id == dataset_id,
        };
        dataset_ok && (!self.images_only || has_image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_uid_derivation() {
        let dataset = DatasetId::new();
        let uid = ObjectUid::derive(dataset, "12345");
        assert_eq!(uid.0, format!("{}/12345", dataset));
    }

    #[test]
    fn test_object_uid_unique_across_datasets() {
        let a = DatasetId::new();
        let b = DatasetId::new();
        assert_ne!(ObjectUid::derive(a, "1"), ObjectUid::derive(b, "1"));
    }

    #[test]
    fn test_dataset_id_round_trip() {
        let id = DatasetId::new();
        let parsed: DatasetId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_scope_filter_matches() {
        let a = DatasetId::new();
        let b = DatasetId::new();

        let all = ScopeFilter::all();
        assert!(all.matches(a, false));
        assert!(all.matches(b, true));

        let scoped = ScopeFilter::dataset(a);
        assert!(scoped.matches(a, false));
        assert!(!scoped.matches(b, true));

        let images = ScopeFilter {
            dataset: DatasetScope::All,
            images_only: true,
        };
        assert!(images.matches(a, true));
        assert!(!images.matches(a, false));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(DatasetScope::All.to_string(), "all");
        let id = DatasetId::new();
        assert_eq!(DatasetScope::Dataset(id).to_string(), id.to_string());
    }
}
