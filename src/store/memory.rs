//! In-memory [`VectorStore`] for tests and examples.
//!
//! A `HashMap` behind `std::sync::RwLock`; search is brute-force cosine
//! similarity over every stored vector, matching the SQLite backend's
//! ranking exactly.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{SearchHit, StoreRecord};
use crate::store::{cosine_similarity, VectorStore};

/// Volatile store with the same contract as the SQLite backend.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, StoreRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ids(&self) -> Result<HashSet<String>> {
        let records = self.records.read().unwrap();
        Ok(records.keys().cloned().collect())
    }

    async fn upsert(&self, records: &[StoreRecord]) -> Result<()> {
        let mut map = self.records.write().unwrap();
        for record in records {
            map.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let records = self.records.read().unwrap();
        let mut hits: Vec<SearchHit> = records
            .values()
            .map(|r| SearchHit {
                id: Some(r.id.clone()),
                source: r.source.clone(),
                page: r.page,
                text: r.text.clone(),
                score: cosine_similarity(query_vec, &r.embedding),
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
        Ok(self.records.read().unwrap().len() as u64)
    }

    async fn clear(&self) -> Result<()> {
        self.records.write().unwrap().clear();
        Ok(())
    }
}
