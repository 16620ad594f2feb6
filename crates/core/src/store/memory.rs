//! In-memory store implementation
//!
//! Implements the full [`ObjectStore`] contract over process-local maps.
//! Backs the test suite and throwaway demo runs; semantics match the
//! PostgreSQL implementation, including write-once embedding transitions
//! and insertion-ordered scans.

use super::{EmbeddedObject, ObjectStore, PendingObject, Result, StoreError};
use crate::types::{Dataset, DatasetId, NewDataset, ObjectRecord, ObjectUid, ScopeFilter};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StoredObject {
    record: ObjectRecord,
    embedding: Option<Vec<f32>>,
}

#[derive(Default)]
struct Inner {
    datasets: Vec<Dataset>,
    objects: Vec<StoredObject>,
    by_uid: HashMap<ObjectUid, usize>,
}

/// In-memory [`ObjectStore`]
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn create_dataset(&self, new: NewDataset) -> Result<Dataset> {
        let dataset = Dataset {
            id: DatasetId::new(),
            name: new.name,
            source_type: new.source_type,
            source_file: new.source_file,
            created_at: Utc::now(),
            fields: new.fields,
            object_count: 0,
        };

        let mut inner = self.inner.write();
        inner.datasets.push(dataset.clone());
        Ok(dataset)
    }

    async fn append_objects(
        &self,
        dataset_id: DatasetId,
        objects: Vec<ObjectRecord>,
    ) -> Result<u64> {
        let mut inner = self.inner.write();

        let dataset_idx = inner
            .datasets
            .iter()
            .position(|d| d.id == dataset_id)
            .ok_or(StoreError::DatasetNotFound(dataset_id))?;

        let mut appended = 0;
        for record in objects {
            if inner.by_uid.contains_key(&record.uid) {
                return Err(StoreError::database(format!(
                    "duplicate object uid: {}",
                    record.uid
                )));
            }
            let idx = inner.objects.len();
            inner.by_uid.insert(record.uid.clone(), idx);
            inner.objects.push(StoredObject {
                record,
                embedding: None,
            });
            appended += 1;
        }

        inner.datasets[dataset_idx].object_count += appended;
        Ok(appended)
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        Ok(self.inner.read().datasets.clone())
    }

    async fn get_pending(&self, limit: usize) -> Result<Vec<PendingObject>> {
        let inner = self.inner.read();
        Ok(inner
            .objects
            .iter()
            .enumerate()
            .filter(|(_, obj)| obj.embedding.is_none())
            .take(limit)
            .map(|(idx, obj)| PendingObject {
                seq: idx as i64,
                record: obj.record.clone(),
            })
            .collect())
    }

    async fn mark_embedded(&self, batch: &[(ObjectUid, Vec<f32>)]) -> Result<u64> {
        // One write-lock acquisition makes the whole batch a single atomic
        // unit: readers observe either none or all of these writes. Uids are
        // validated up front so a bad one aborts before any mutation.
        let mut inner = self.inner.write();

        let mut indices = Vec::with_capacity(batch.len());
        for (uid, _) in batch {
            let Some(&idx) = inner.by_uid.get(uid) else {
                return Err(StoreError::database(format!("unknown object uid: {}", uid)));
            };
            indices.push(idx);
        }

        let mut updated = 0;
        for ((_, vector), idx) in batch.iter().zip(indices) {
            let object = &mut inner.objects[idx];
            if object.embedding.is_none() {
                object.embedding = Some(vector.clone());
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn count_embedded(&self, filter: &ScopeFilter) -> Result<u64> {
        let inner = self.inner.read();
        Ok(inner
            .objects
            .iter()
            .filter(|obj| {
                obj.embedding.is_some()
                    && filter.matches(obj.record.dataset_id, obj.record.has_image)
            })
            .count() as u64)
    }

    async fn count_objects(&self) -> Result<u64> {
        Ok(self.inner.read().objects.len() as u64)
    }

    async fn fetch_embedded(&self, filter: &ScopeFilter) -> Result<Vec<EmbeddedObject>> {
        let inner = self.inner.read();
        Ok(inner
            .objects
            .iter()
            .enumerate()
            .filter_map(|(idx, obj)| {
                let vector = obj.embedding.as_ref()?;
                if !filter.matches(obj.record.dataset_id, obj.record.has_image) {
                    return None;
                }
                Some(EmbeddedObject {
                    seq: idx as i64,
                    uid: obj.record.uid.clone(),
                    dataset_id: obj.record.dataset_id,
                    title: obj.record.title.clone(),
                    creator: obj.record.creator.clone(),
                    has_image: obj.record.has_image,
                    vector: vector.clone(),
                })
            })
            .collect())
    }

    async fn fetch_metadata(
        &self,
        uids: &[ObjectUid],
    ) -> Result<HashMap<ObjectUid, ObjectRecord>> {
        let inner = self.inner.read();
        Ok(uids
            .iter()
            .filter_map(|uid| {
                inner
                    .by_uid
                    .get(uid)
                    .map(|&idx| (uid.clone(), inner.objects[idx].record.clone()))
            })
            .collect())
    }
}
