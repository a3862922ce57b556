//! Ingestion pipeline orchestration.
//!
//! Coordinates the batch flow: PDF extraction → chunking → identifier
//! assignment → incremental sync against the vector store. Re-running
//! ingestion over an unchanged document is a no-op: chunks whose
//! identifier the store already holds are never re-embedded or
//! re-upserted, even if their text drifted under a stable identifier
//! (membership is decided by identifier alone, not content).

use std::path::Path;

use anyhow::{bail, Result};

use crate::chunk::chunk_pages;
use crate::config::Config;
use crate::embedding::{self, Embedder};
use crate::extract;
use crate::identify::assign_identifiers;
use crate::models::{Chunk, StoreRecord};
use crate::store::sqlite::SqliteStore;
use crate::store::VectorStore;

/// Counts reported by one synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Records already persisted before this pass.
    pub existing: u64,
    /// New records embedded and upserted by this pass.
    pub added: u64,
}

/// Run the `ingest` command: extract, chunk, and sync one PDF into the
/// configured store, optionally destroying the store first.
pub async fn run_ingest(config: &Config, pdf_path: &Path, reset: bool, dry_run: bool) -> Result<()> {
    let store = SqliteStore::open(&config.store).await?;

    if reset {
        store.clear().await?;
        println!("store reset — all records removed");
    }

    let pages = extract::extract_pages(pdf_path)?;
    let chunks = chunk_pages(
        &pages,
        config.chunking.max_chars,
        config.chunking.overlap_chars,
    );

    println!("ingest {}", pdf_path.display());
    println!("  pages: {}", pages.len());
    println!("  chunks: {}", chunks.len());

    if dry_run {
        println!("  (dry-run, nothing written)");
        store.close().await;
        return Ok(());
    }

    if !config.embedding.is_enabled() {
        bail!("embedding provider is disabled; set [embedding] provider in config");
    }
    let embedder = embedding::create_embedder(&config.embedding)?;

    let outcome = sync_chunks(
        &store,
        embedder.as_ref(),
        chunks,
        config.embedding.batch_size,
    )
    .await?;

    println!("  existing records: {}", outcome.existing);
    if outcome.added == 0 {
        println!("  nothing to add");
    } else {
        println!("  added: {}", outcome.added);
    }
    println!("ok");

    store.close().await;
    Ok(())
}

/// Synchronize chunks into the store incrementally.
///
/// Assigns identifiers in processing order, reads the store's identifier
/// set once, and embeds and upserts only chunks whose identifier is not
/// yet present. Chunks with an already-present identifier are skipped
/// without touching the embedding provider.
pub async fn sync_chunks(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chunks: Vec<Chunk>,
    batch_size: usize,
) -> Result<SyncOutcome> {
    let chunks = assign_identifiers(chunks);

    let existing = store.ids().await?;
    let fresh: Vec<Chunk> = chunks
        .into_iter()
        .filter(|c| c.id.as_deref().is_some_and(|id| !existing.contains(id)))
        .collect();

    let mut added = 0u64;

    for batch in fresh.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed(&texts).await?;

        let mut records = Vec::with_capacity(batch.len());
        for (chunk, vector) in batch.iter().zip(vectors.into_iter()) {
            let Some(id) = chunk.id.clone() else { continue };
            records.push(StoreRecord {
                id,
                source: chunk.source.clone(),
                page: chunk.page,
                text: chunk.text.clone(),
                embedding: vector,
            });
        }

        store.upsert(&records).await?;
        added += records.len() as u64;
    }

    Ok(SyncOutcome {
        existing: existing.len() as u64,
        added,
    })
}
