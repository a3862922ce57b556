//! SQLite-backed vector store.
//!
//! Records live in a single `records` table keyed by chunk identifier,
//! with embeddings stored as little-endian `f32` BLOBs. Similarity search
//! loads all vectors and ranks by cosine similarity in Rust; corpora here
//! are a handful of PDFs, well within brute-force range.

use std::collections::HashSet;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::config::StoreConfig;
use crate::models::{SearchHit, StoreRecord};
use crate::store::{cosine_similarity, VectorStore};

/// Vector store persisted in a single SQLite database file.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (and create if missing) the store at the configured path,
    /// ensuring the schema exists. Safe to call repeatedly.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let db_path = &config.path;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        ensure_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Close the underlying connection pool.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Record count per source path, ordered by source. Used by `stats`.
    pub async fn source_breakdown(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT source, COUNT(*) AS n FROM records GROUP BY source ORDER BY source",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("source"), row.get("n")))
            .collect())
    }
}

async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            page INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_source ON records(source)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Encode a vector as little-endian `f32` bytes for BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB written by [`vec_to_blob`] back into a vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn ids(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM records")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn upsert(&self, records: &[StoreRecord]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO records (id, source, page, text, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    source = excluded.source,
                    page = excluded.page,
                    text = excluded.text,
                    embedding = excluded.embedding
                "#,
            )
            .bind(&record.id)
            .bind(&record.source)
            .bind(record.page)
            .bind(&record.text)
            .bind(vec_to_blob(&record.embedding))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let rows = sqlx::query("SELECT id, source, page, text, embedding FROM records")
            .fetch_all(&self.pool)
            .await?;

        let mut hits: Vec<SearchHit> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let stored = blob_to_vec(&blob);
                SearchHit {
                    id: Some(row.get("id")),
                    source: row.get("source"),
                    page: row.get("page"),
                    text: row.get("text"),
                    score: cosine_similarity(query_vec, &stored),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        Ok(hits)
    }

    async fn count(&self) -> Result<u64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM records").execute(&self.pool).await?;
        Ok(())
    }
}
