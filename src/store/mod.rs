//! Vector store abstraction.
//!
//! The [`VectorStore`] trait covers exactly the operations the pipelines
//! need, so the ingestion and query code can run against the SQLite
//! backend in production and an in-memory backend in tests.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`ids`](VectorStore::ids) | Full identifier set (existence check, no content fetch) |
//! | [`upsert`](VectorStore::upsert) | Insert records keyed by identifier |
//! | [`search`](VectorStore::search) | k-nearest similarity search |
//! | [`count`](VectorStore::count) | Total persisted records |
//! | [`clear`](VectorStore::clear) | Destroy every record (full reset) |

pub mod memory;
pub mod sqlite;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{SearchHit, StoreRecord};

/// Abstract vector store backend.
///
/// Implementations must be `Send + Sync`; all operations are async so the
/// SQLite pool and in-memory map share one interface.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the set of identifiers currently persisted.
    ///
    /// This is a membership snapshot only; neither text nor embeddings are
    /// fetched.
    async fn ids(&self) -> Result<HashSet<String>>;

    /// Insert records keyed by identifier. A record whose identifier is
    /// already present replaces the stored row.
    async fn upsert(&self, records: &[StoreRecord]) -> Result<()>;

    /// Return up to `k` hits ordered by descending similarity to
    /// `query_vec`. Fewer than `k` stored records yield fewer hits;
    /// an empty store yields none.
    async fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>>;

    /// Total number of persisted records.
    async fn count(&self) -> Result<u64>;

    /// Delete every record. Irrecoverable; the next ingestion run starts
    /// from an empty store.
    async fn clear(&self) -> Result<()>;
}

/// Cosine similarity between two vectors, in `[-1.0, 1.0]`.
///
/// Returns `0.0` for empty vectors or mismatched lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
