//! SQLite-backed [`CorpusIndex`] implementation.
//!
//! Each index value serves one named collection. Vectors are stored as
//! little-endian f32 BLOBs; queries load the collection's vectors and
//! compute cosine distance in Rust, which is ample at corpus scale
//! (thousands of dialogue turns).

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use sales_copilot_core::embedding::{blob_to_vec, cosine_distance, vec_to_blob};
use sales_copilot_core::index::CorpusIndex;
use sales_copilot_core::models::{CaseMetadata, IndexedDocument, RetrievalResult};

/// The only similarity metric this system uses. Pinned per collection
/// at creation; a metric change requires a new collection.
const METRIC_COSINE: &str = "cosine";

/// SQLite implementation of the [`CorpusIndex`] trait.
#[derive(Debug)]
pub struct SqliteIndex {
    pool: SqlitePool,
    collection_id: String,
    name: String,
}

impl SqliteIndex {
    /// Idempotently create or open the named collection.
    ///
    /// Fails if the collection exists with a different metric instead
    /// of silently changing it.
    pub async fn open(pool: SqlitePool, name: &str) -> Result<Self> {
        let existing = sqlx::query("SELECT id, metric FROM collections WHERE name = ?")
            .bind(name)
            .fetch_optional(&pool)
            .await?;

        let collection_id = match existing {
            Some(row) => {
                let metric: String = row.get("metric");
                if metric != METRIC_COSINE {
                    bail!(
                        "collection '{}' was created with metric '{}', expected '{}'; \
                         delete and re-create it to change the metric",
                        name,
                        metric,
                        METRIC_COSINE
                    );
                }
                row.get("id")
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO collections (id, name, metric, created_at) VALUES (?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(name)
                .bind(METRIC_COSINE)
                .bind(chrono::Utc::now().timestamp())
                .execute(&pool)
                .await?;
                id
            }
        };

        Ok(Self {
            pool,
            collection_id,
            name: name.to_string(),
        })
    }

    /// Drop a collection and all of its documents. Full reset path;
    /// there is no incremental delete.
    pub async fn delete_collection(pool: &SqlitePool, name: &str) -> Result<()> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM documents WHERE collection_id IN (SELECT id FROM collections WHERE name = ?)",
        )
        .bind(name)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM collections WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CorpusIndex for SqliteIndex {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn add(&self, docs: &[IndexedDocument], vectors: &[Vec<f32>]) -> Result<()> {
        if docs.len() != vectors.len() {
            bail!(
                "documents/vectors length mismatch: {} vs {}",
                docs.len(),
                vectors.len()
            );
        }

        // One transaction per call: either every record lands or none.
        let mut tx = self.pool.begin().await?;
        let now = chrono::Utc::now().timestamp();

        for (doc, vector) in docs.iter().zip(vectors.iter()) {
            let metadata_json = serde_json::to_string(&doc.metadata)?;
            let blob = vec_to_blob(vector);

            let inserted = sqlx::query(
                r#"
                INSERT INTO documents (id, collection_id, doc_id, text, metadata_json, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&self.collection_id)
            .bind(&doc.id)
            .bind(&doc.text)
            .bind(&metadata_json)
            .bind(&blob)
            .bind(now)
            .execute(&mut *tx)
            .await;

            if let Err(e) = inserted {
                if e.as_database_error().is_some_and(|dbe| dbe.is_unique_violation()) {
                    bail!(
                        "document id '{}' already exists in collection '{}'",
                        doc.id,
                        self.name
                    );
                }
                return Err(e.into());
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
        let rows = sqlx::query(
            "SELECT text, metadata_json, embedding FROM documents WHERE collection_id = ?",
        )
        .bind(&self.collection_id)
        .fetch_all(&self.pool)
        .await?;

        let mut results: Vec<RetrievalResult> = Vec::with_capacity(rows.len());
        for row in &rows {
            let metadata_json: String = row.get("metadata_json");
            let metadata: CaseMetadata = serde_json::from_str(&metadata_json)?;
            let blob: Vec<u8> = row.get("embedding");
            let vector = blob_to_vec(&blob);

            results.push(RetrievalResult {
                document: row.get("text"),
                metadata,
                distance: cosine_distance(embedding, &vector),
            });
        }

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection_id = ?")
            .bind(&self.collection_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
