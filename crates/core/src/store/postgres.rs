//! PostgreSQL store implementation
//!
//! Embeddings are stored as little-endian f32 BYTEA, original fields as
//! JSONB. The `seq` column (BIGSERIAL) is the insertion order every ordered
//! scan relies on.

use super::{
    decode_embedding, encode_embedding, EmbeddedObject, ObjectStore, PendingObject, Result,
    StoreError,
};
use crate::types::{
    Dataset, DatasetId, DatasetScope, NewDataset, ObjectRecord, ObjectUid, ScopeFilter,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// PostgreSQL-backed [`ObjectStore`]
#[derive(Clone)]
pub struct PgObjectStore {
    pool: PgPool,
}

impl PgObjectStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and create a store
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the connection cannot be
    /// established.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| StoreError::database(format!("Failed to connect: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if any DDL statement fails.
    pub async fn init_schema(&self) -> Result<()> {
        debug!("Ensuring database schema");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS datasets (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                source_type TEXT NOT NULL,
                source_file TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                fields JSONB NOT NULL,
                object_count BIGINT NOT NULL DEFAULT 0
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS objects (
                seq BIGSERIAL PRIMARY KEY,
                uid TEXT NOT NULL UNIQUE,
                dataset_id UUID NOT NULL REFERENCES datasets(id),
                title TEXT NOT NULL,
                creator TEXT NOT NULL,
                has_image BOOLEAN NOT NULL,
                metadata JSONB NOT NULL,
                embedding BYTEA,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_objects_pending
                ON objects (seq) WHERE embedding IS NULL
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_objects_dataset
                ON objects (dataset_id)
            "#,
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::database(format!("Schema creation failed: {}", e)))?;
        }

        info!("Database schema ready");
        Ok(())
    }

    fn record_from_row(row: &PgRow) -> Result<ObjectRecord> {
        let uid: String = row
            .try_get("uid")
            .map_err(|e| StoreError::database(format!("Failed to get uid: {}", e)))?;
        let dataset_id: Uuid = row
            .try_get("dataset_id")
            .map_err(|e| StoreError::database(format!("Failed to get dataset_id: {}", e)))?;
        let title: String = row
            .try_get("title")
            .map_err(|e| StoreError::database(format!("Failed to get title: {}", e)))?;
        let creator: String = row
            .try_get("creator")
            .map_err(|e| StoreError::database(format!("Failed to get creator: {}", e)))?;
        let has_image: bool = row
            .try_get("has_image")
            .map_err(|e| StoreError::database(format!("Failed to get has_image: {}", e)))?;
        let metadata: sqlx::types::Json<serde_json::Map<String, serde_json::Value>> = row
            .try_get("metadata")
            .map_err(|e| StoreError::MetadataDecode(e.to_string()))?;

        Ok(ObjectRecord {
            uid: ObjectUid::from(uid),
            dataset_id: DatasetId::from(dataset_id),
            title,
            creator,
            has_image,
            metadata: metadata.0,
        })
    }

    fn dataset_from_row(row: &PgRow) -> Result<Dataset> {
        let id: Uuid = row
            .try_get("id")
            .map_err(|e| StoreError::database(format!("Failed to get id: {}", e)))?;
        let fields: sqlx::types::Json<Vec<String>> = row
            .try_get("fields")
            .map_err(|e| StoreError::MetadataDecode(e.to_string()))?;
        let object_count: i64 = row
            .try_get("object_count")
            .map_err(|e| StoreError::database(format!("Failed to get object_count: {}", e)))?;

        Ok(Dataset {
            id: DatasetId::from(id),
            name: row
                .try_get("name")
                .map_err(|e| StoreError::database(format!("Failed to get name: {}", e)))?,
            source_type: row
                .try_get("source_type")
                .map_err(|e| StoreError::database(format!("Failed to get source_type: {}", e)))?,
            source_file: row
                .try_get("source_file")
                .map_err(|e| StoreError::database(format!("Failed to get source_file: {}", e)))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| StoreError::database(format!("Failed to get created_at: {}", e)))?,
            fields: fields.0,
            object_count: object_count as u64,
        })
    }

    /// Build the scope filter clause and its optional dataset bind
    ///
    /// The clause assumes no earlier bind parameters in the query.
    fn scope_clause(filter: &ScopeFilter) -> (String, Option<Uuid>) {
        let mut clause = String::new();
        let dataset = match filter.dataset {
            DatasetScope::Dataset(id) => {
                clause.push_str(" AND dataset_id = $1");
                Some(id.0)
            }
            DatasetScope::All => None,
        };
        if filter.images_only {
            clause.push_str(" AND has_image = TRUE");
        }
        (clause, dataset)
    }
}

#[async_trait]
impl ObjectStore for PgObjectStore {
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

        sqlx::query(
            r#"
            INSERT INTO datasets (id, name, source_type, source_file, created_at, fields, object_count)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            "#,
        )
        .bind(dataset.id.0)
        .bind(&dataset.name)
        .bind(&dataset.source_type)
        .bind(&dataset.source_file)
        .bind(dataset.created_at)
        .bind(sqlx::types::Json(&dataset.fields))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to create dataset: {}", e)))?;

        info!("Created dataset {} ({})", dataset.name, dataset.id);
        Ok(dataset)
    }

    async fn append_objects(
        &self,
        dataset_id: DatasetId,
        objects: Vec<ObjectRecord>,
    ) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::database(format!("Failed to begin transaction: {}", e)))?;

        let now = Utc::now();
        for record in &objects {
            sqlx::query(
                r#"
                INSERT INTO objects (uid, dataset_id, title, creator, has_image, metadata, embedding, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, NULL, $7)
                "#,
            )
            .bind(&record.uid.0)
            .bind(record.dataset_id.0)
            .bind(&record.title)
            .bind(&record.creator)
            .bind(record.has_image)
            .bind(sqlx::types::Json(&record.metadata))
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::database(format!("Failed to insert object: {}", e)))?;
        }

        let appended = objects.len() as u64;
        let updated = sqlx::query("UPDATE datasets SET object_count = object_count + $2 WHERE id = $1")
            .bind(dataset_id.0)
            .bind(appended as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::database(format!("Failed to bump object count: {}", e)))?;

        if updated.rows_affected() != 1 {
            return Err(StoreError::DatasetNotFound(dataset_id));
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::database(format!("Failed to commit append: {}", e)))?;

        debug!("Appended {} objects to dataset {}", appended, dataset_id);
        Ok(appended)
    }

    async fn list_datasets(&self) -> Result<Vec<Dataset>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, source_type, source_file, created_at, fields, object_count
            FROM datasets
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to list datasets: {}", e)))?;

        rows.iter().map(Self::dataset_from_row).collect()
    }

    async fn get_pending(&self, limit: usize) -> Result<Vec<PendingObject>> {
        let rows = sqlx::query(
            r#"
            SELECT seq, uid, dataset_id, title, creator, has_image, metadata
            FROM objects
            WHERE embedding IS NULL
            ORDER BY seq ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch pending objects: {}", e)))?;

        rows.iter()
            .map(|row| {
                let seq: i64 = row
                    .try_get("seq")
                    .map_err(|e| StoreError::database(format!("Failed to get seq: {}", e)))?;
                Ok(PendingObject {
                    seq,
                    record: Self::record_from_row(row)?,
                })
            })
            .collect()
    }

    async fn mark_embedded(&self, batch: &[(ObjectUid, Vec<f32>)]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        // One transaction per batch: either every write lands or none does.
        // The IS NULL guard makes the null-to-vector transition write-once
        // even under concurrent processors.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::database(format!("Failed to begin transaction: {}", e)))?;

        let mut updated = 0;
        for (uid, vector) in batch {
            let result = sqlx::query(
                "UPDATE objects SET embedding = $2 WHERE uid = $1 AND embedding IS NULL",
            )
            .bind(&uid.0)
            .bind(encode_embedding(vector))
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::database(format!("Failed to write embedding: {}", e)))?;

            updated += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::database(format!("Failed to commit batch: {}", e)))?;

        debug!("Persisted {} embeddings", updated);
        Ok(updated)
    }

    async fn count_embedded(&self, filter: &ScopeFilter) -> Result<u64> {
        let (clause, dataset) = Self::scope_clause(filter);
        let sql = format!(
            "SELECT COUNT(*) AS count FROM objects WHERE embedding IS NOT NULL{}",
            clause
        );

        let mut query = sqlx::query(&sql);
        if let Some(id) = dataset {
            query = query.bind(id);
        }

        let row = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to count embedded: {}", e)))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| StoreError::database(format!("Failed to get count: {}", e)))?;
        Ok(count as u64)
    }

    async fn count_objects(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM objects")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to count objects: {}", e)))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| StoreError::database(format!("Failed to get count: {}", e)))?;
        Ok(count as u64)
    }

    async fn fetch_embedded(&self, filter: &ScopeFilter) -> Result<Vec<EmbeddedObject>> {
        let (clause, dataset) = Self::scope_clause(filter);
        let sql = format!(
            r#"
            SELECT seq, uid, dataset_id, title, creator, has_image, embedding
            FROM objects
            WHERE embedding IS NOT NULL{}
            ORDER BY seq ASC
            "#,
            clause
        );

        let mut query = sqlx::query(&sql);
        if let Some(id) = dataset {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to fetch embedded: {}", e)))?;

        rows.iter()
            .map(|row| {
                let seq: i64 = row
                    .try_get("seq")
                    .map_err(|e| StoreError::database(format!("Failed to get seq: {}", e)))?;
                let uid: String = row
                    .try_get("uid")
                    .map_err(|e| StoreError::database(format!("Failed to get uid: {}", e)))?;
                let dataset_id: Uuid = row.try_get("dataset_id").map_err(|e| {
                    StoreError::database(format!("Failed to get dataset_id: {}", e))
                })?;
                let embedding_bytes: Vec<u8> = row
                    .try_get("embedding")
                    .map_err(|e| StoreError::database(format!("Failed to get embedding: {}", e)))?;

                Ok(EmbeddedObject {
                    seq,
                    uid: ObjectUid::from(uid),
                    dataset_id: DatasetId::from(dataset_id),
                    title: row
                        .try_get("title")
                        .map_err(|e| StoreError::database(format!("Failed to get title: {}", e)))?,
                    creator: row.try_get("creator").map_err(|e| {
                        StoreError::database(format!("Failed to get creator: {}", e))
                    })?,
                    has_image: row.try_get("has_image").map_err(|e| {
                        StoreError::database(format!("Failed to get has_image: {}", e))
                    })?,
                    vector: decode_embedding(&embedding_bytes)?,
                })
            })
            .collect()
    }

    async fn fetch_metadata(
        &self,
        uids: &[ObjectUid],
    ) -> Result<HashMap<ObjectUid, ObjectRecord>> {
        if uids.is_empty() {
            return Ok(HashMap::new());
        }

        let uid_strings: Vec<String> = uids.iter().map(|uid| uid.0.clone()).collect();
        let rows = sqlx::query(
            r#"
            SELECT seq, uid, dataset_id, title, creator, has_image, metadata
            FROM objects
            WHERE uid = ANY($1)
            "#,
        )
        .bind(&uid_strings)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to fetch metadata: {}", e)))?;

        rows.iter()
            .map(|row| {
                let record = Self::record_from_row(row)?;
                Ok((record.uid.clone(), record))
            })
            .collect()
    }
}
