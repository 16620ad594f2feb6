//! Record ingestion
//!
//! Turns already-parsed tabular rows (string-keyed JSON maps) into
//! [`ObjectRecord`]s and appends them to the store with embedding unset.
//! Parsing the tabular file itself (CSV and friends) is the caller's
//! problem; this module only does field mapping and identity derivation.

use crate::types::{DatasetId, NewDataset, ObjectRecord, ObjectUid};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw ingestion row: original field names to values
pub type RawRecord = Map<String, Value>;

/// Ingestion request for one dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Dataset display name
    pub name: String,
    /// Source-type tag (e.g. "csv", "json")
    #[serde(default = "default_source_type")]
    pub source_type: String,
    /// Originating file name
    #[serde(default)]
    pub source_file: String,
    /// Ordered schema field names; derived from the first record if absent
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// The rows to ingest
    pub records: Vec<RawRecord>,
}

fn default_source_type() -> String {
    "json".to_string()
}

/// Result of an ingestion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// The created dataset
    pub dataset_id: DatasetId,
    /// Number of objects ingested
    pub count: u64,
}

impl IngestRequest {
    /// The dataset metadata this request describes
    pub fn new_dataset(&self) -> NewDataset {
        let fields = self.fields.clone().unwrap_or_else(|| {
            self.records
                .first()
                .map(|record| record.keys().cloned().collect())
                .unwrap_or_default()
        });

        NewDataset {
            name: self.name.clone(),
            source_type: self.source_type.clone(),
            source_file: self.source_file.clone(),
            fields,
        }
    }
}

/// Field-name candidates checked, in order, for the original record id
const ID_FIELDS: &[&str] = &["objectid", "id", "objectnumber"];
/// Field-name candidates for the projected title
const TITLE_FIELDS: &[&str] = &["title"];
/// Field-name candidates for the projected creator
const CREATOR_FIELDS: &[&str] = &["artistdisplayname", "creator", "artist"];
/// Field-name candidates for the image URL
const IMAGE_FIELDS: &[&str] = &["primaryimage", "primaryimagesmall", "imageurl", "image"];

/// Maps raw rows into object records
///
/// Field-name matching is case- and separator-insensitive, so the Met-style
/// "ObjectID"/"ArtistDisplayName" spellings and snake_case exports both
/// work. All original fields are carried verbatim in the record's metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordMapper;

impl RecordMapper {
    /// Map one raw row into an object record
    ///
    /// The original id comes from the first non-empty id field, falling back
    /// to the row index, and is combined with the dataset id into a
    /// globally unique uid. `has_image` is the presence of a non-empty image
    /// URL field.
    pub fn map_record(&self, dataset_id: DatasetId, index: usize, raw: &RawRecord) -> ObjectRecord {
        let original_id =
            first_value(raw, ID_FIELDS).unwrap_or_else(|| index.to_string());

        ObjectRecord {
            uid: ObjectUid::derive(dataset_id, &original_id),
            dataset_id,
            title: first_value(raw, TITLE_FIELDS).unwrap_or_default(),
            creator: first_value(raw, CREATOR_FIELDS).unwrap_or_default(),
            has_image: first_value(raw, IMAGE_FIELDS).is_some(),
            metadata: raw.clone(),
        }
    }

    /// Map a whole request's rows
    pub fn map_records(&self, dataset_id: DatasetId, records: &[RawRecord]) -> Vec<ObjectRecord> {
        records
            .iter()
            .enumerate()
            .map(|(index, raw)| self.map_record(dataset_id, index, raw))
            .collect()
    }
}

/// Extract the image URL from an object's original fields, if any
///
/// Uses the same candidate field names `has_image` was projected from at
/// ingestion time.
pub fn image_url(record: &ObjectRecord) -> Option<String> {
    first_value(&record.metadata, IMAGE_FIELDS)
}

/// Normalize a field name for matching: lowercase, alphanumerics only
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// First non-empty value among the candidate field names
///
/// Numbers are accepted as well (numeric ids are common in CSV exports) and
/// rendered in their decimal form.
fn first_value(raw: &RawRecord, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        raw.iter().find_map(|(key, value)| {
            if normalize_key(key) != *candidate {
                return None;
            }
            match value {
                Value::String(s) => {
                    let trimmed = s.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        })
    })
}
