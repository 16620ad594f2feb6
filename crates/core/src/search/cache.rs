//! Scope-projection cache
//!
//! For each search scope, a dense matrix of embedded vectors plus parallel
//! lightweight metadata, rebuilt from the store only when the scope has
//! actually grown. Repeated queries under load then skip the full store
//! scan.
//!
//! Staleness is detected by comparing embedded-object counts. That check is
//! exact only because embeddings are append-only: for a given scope, growth
//! in count is the only mutation that can happen. If re-embedding or
//! deletion is ever introduced, this check becomes unsound and must be
//! replaced by a version counter bumped on every mutating operation.

use crate::store::{EmbeddedObject, ObjectStore, StoreError};
use crate::types::{DatasetId, DatasetScope, ObjectUid, ScopeFilter};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while building a projection
#[derive(Error, Debug)]
pub enum CacheError {
    /// The store scan failed; the error is surfaced to the query path
    /// rather than serving an empty or partial projection
    #[error("Cache build failed: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Identifies one cached projection: a dataset scope plus the image filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Dataset scope
    pub scope: DatasetScope,
    /// Restrict to objects carrying an image
    pub images_only: bool,
}

impl CacheKey {
    /// Key covering all datasets, no image filter
    pub fn all() -> Self {
        Self {
            scope: DatasetScope::All,
            images_only: false,
        }
    }

    /// The store filter this key corresponds to
    pub fn filter(&self) -> ScopeFilter {
        ScopeFilter {
            dataset: self.scope,
            images_only: self.images_only,
        }
    }
}

/// Lightweight metadata carried alongside each projection row
#[derive(Debug, Clone, Serialize)]
pub struct CachedObject {
    /// Globally unique identifier
    pub uid: ObjectUid,
    /// Owning dataset
    pub dataset_id: DatasetId,
    /// Display title
    pub title: String,
    /// Display creator
    pub creator: String,
    /// Whether the record carries an image URL
    pub has_image: bool,
}

impl From<&EmbeddedObject> for CachedObject {
    fn from(row: &EmbeddedObject) -> Self {
        Self {
            uid: row.uid.clone(),
            dataset_id: row.dataset_id,
            title: row.title.clone(),
            creator: row.creator.clone(),
            has_image: row.has_image,
        }
    }
}

/// One cached projection
///
/// `vectors` and `items` are parallel, both in ascending insertion order;
/// row i of the matrix belongs to `items[i]`. `embedded_count` is the number
/// of embedded objects in scope when the projection was built and is what
/// the staleness check compares against.
pub struct CacheEntry {
    /// Unit-norm vectors, one row per embedded object in scope
    pub vectors: Vec<Vec<f32>>,
    /// Parallel lightweight metadata
    pub items: Vec<CachedObject>,
    /// Embedded-object count at build time
    pub embedded_count: u64,
}

impl CacheEntry {
    /// Number of rows in the projection
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the projection has no rows
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Owns the per-scope projections and keeps them coherent with the store
///
/// Projections are disposable derived state: never authoritative, always
/// rebuildable from the store. Rebuilds are mutually exclusive per key, so
/// concurrent misses for the same scope coalesce into one store scan while
/// unrelated scopes stay independent (a single global rebuild lock would
/// serialize them).
pub struct SearchCacheManager {
    store: Arc<dyn ObjectStore>,
    entries: RwLock<HashMap<CacheKey, Arc<CacheEntry>>>,
    rebuild_locks: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl SearchCacheManager {
    /// Create a manager over a store
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
            rebuild_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get the projection for a key, rebuilding if the scope has grown
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Store` if the count or the rebuild scan fails.
    pub async fn get(&self, key: &CacheKey) -> Result<Arc<CacheEntry>> {
        let current = self.store.count_embedded(&key.filter()).await?;

        if let Some(entry) = self.lookup(key, current) {
            debug!("Cache hit for {:?} at count {}", key, current);
            return Ok(entry);
        }

        let lock = self.rebuild_lock(key);
        let _guard = lock.lock().await;

        // Double-check under the rebuild lock: a concurrent miss may have
        // already rebuilt this projection while we waited.
        if let Some(entry) = self.lookup(key, current) {
            return Ok(entry);
        }

        self.rebuild(key).await
    }

    /// Drop all projections (they will rebuild lazily on next access)
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of live projections
    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }

    fn lookup(&self, key: &CacheKey, current: u64) -> Option<Arc<CacheEntry>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| entry.embedded_count == current)
            .map(Arc::clone)
    }

    fn rebuild_lock(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.rebuild_locks.lock();
        Arc::clone(
            locks
                .entry(*key)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    async fn rebuild(&self, key: &CacheKey) -> Result<Arc<CacheEntry>> {
        let rows = self.store.fetch_embedded(&key.filter()).await?;

        let mut vectors = Vec::with_capacity(rows.len());
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(CachedObject::from(row));
        }
        for row in rows {
            vectors.push(row.vector);
        }

        // The count the entry is keyed by is the count actually observed in
        // the scan, so a store that grew between count and scan just makes
        // the next staleness check rebuild again.
        let entry = Arc::new(CacheEntry {
            embedded_count: vectors.len() as u64,
            vectors,
            items,
        });

        info!(
            "Rebuilt projection for {:?}: {} vectors",
            key,
            entry.len()
        );

        self.entries.write().insert(*key, Arc::clone(&entry));
        Ok(entry)
    }
}
