//! End-to-end pipeline tests against deterministic fakes.
//!
//! The pipelines run here with a fixed-vector embedder, an in-memory
//! store, and echo/failing generators — no network, no models, no disk.

use std::collections::HashSet;

use anyhow::{bail, Result};
use async_trait::async_trait;

use docrag::chunk::chunk_pages;
use docrag::embedding::Embedder;
use docrag::ingest::sync_chunks;
use docrag::llm::Generator;
use docrag::models::{Page, SearchHit, StoreRecord};
use docrag::query::{self, QueryError, UNKNOWN_ID};
use docrag::store::memory::MemoryStore;
use docrag::store::VectorStore;

const DIMS: usize = 8;
const MAX_CHARS: usize = 800;
const OVERLAP_CHARS: usize = 80;

/// Deterministic embedder: folds the text's bytes into a fixed-length
/// vector, so equal texts always embed identically.
struct FixedEmbedder;

fn fixed_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    for (i, b) in text.bytes().enumerate() {
        v[i % DIMS] += b as f32 / 255.0;
    }
    v
}

#[async_trait]
impl Embedder for FixedEmbedder {
    fn model_name(&self) -> &str {
        "fixed"
    }
    fn dims(&self) -> usize {
        DIMS
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| fixed_vector(t)).collect())
    }
}

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing"
    }
    fn dims(&self) -> usize {
        DIMS
    }
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("embedding backend offline")
    }
}

/// Generator that returns the rendered prompt verbatim, making the
/// assembled context observable in the response.
struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    fn model_name(&self) -> &str {
        "echo"
    }
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn model_name(&self) -> &str {
        "failing"
    }
    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("model unavailable")
    }
}

/// Store whose hits carry no identifier metadata.
struct AnonymousStore(MemoryStore);

#[async_trait]
impl VectorStore for AnonymousStore {
    async fn ids(&self) -> Result<HashSet<String>> {
        self.0.ids().await
    }
    async fn upsert(&self, records: &[StoreRecord]) -> Result<()> {
        self.0.upsert(records).await
    }
    async fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let mut hits = self.0.search(query_vec, k).await?;
        for hit in &mut hits {
            hit.id = None;
        }
        Ok(hits)
    }
    async fn count(&self) -> Result<u64> {
        self.0.count().await
    }
    async fn clear(&self) -> Result<()> {
        self.0.clear().await
    }
}

fn page(source: &str, number: i64, text: String) -> Page {
    Page {
        source: source.to_string(),
        page: number,
        text,
    }
}

/// A page long enough to split into exactly three 800/80 chunks
/// (two full windows plus a shorter tail).
fn three_chunk_page() -> Page {
    let text: String = (0..1600).map(|i| ((i % 26) as u8 + b'a') as char).collect();
    page("a.pdf", 0, text)
}

#[tokio::test]
async fn ingest_twice_is_idempotent() {
    let store = MemoryStore::new();
    let embedder = FixedEmbedder;

    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    let first = sync_chunks(&store, &embedder, chunks, 64).await.unwrap();
    assert_eq!(first.existing, 0);
    assert_eq!(first.added, 3);

    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    let second = sync_chunks(&store, &embedder, chunks, 64).await.unwrap();
    assert_eq!(second.existing, 3);
    assert_eq!(second.added, 0);

    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn three_chunk_page_gets_sequential_identifiers() {
    let store = MemoryStore::new();
    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    assert_eq!(chunks.len(), 3);

    sync_chunks(&store, &FixedEmbedder, chunks, 64).await.unwrap();

    let ids = store.ids().await.unwrap();
    let expected: HashSet<String> = ["a.pdf:0:0", "a.pdf:0:1", "a.pdf:0:2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn search_returns_at_most_k_and_at_most_available() {
    let store = MemoryStore::new();

    // Three records, k=5: everything comes back.
    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    sync_chunks(&store, &FixedEmbedder, chunks, 64).await.unwrap();
    let hits = query::retrieve(&store, &FixedEmbedder, "anything", 5)
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);

    // Grow the store past five records: exactly k come back.
    let long_text: String = (0..5000).map(|i| ((i % 26) as u8 + b'a') as char).collect();
    let chunks = chunk_pages(&[page("b.pdf", 0, long_text)], MAX_CHARS, OVERLAP_CHARS);
    sync_chunks(&store, &FixedEmbedder, chunks, 64).await.unwrap();
    assert!(store.count().await.unwrap() >= 5);

    let hits = query::retrieve(&store, &FixedEmbedder, "anything", 5)
        .await
        .unwrap();
    assert_eq!(hits.len(), 5);

    // Scores descend in retrieval order.
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn answer_cites_sources_in_retrieval_order() {
    let store = MemoryStore::new();
    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    sync_chunks(&store, &FixedEmbedder, chunks, 64).await.unwrap();

    let expected_hits = query::retrieve(&store, &FixedEmbedder, "What is X?", 5)
        .await
        .unwrap();
    let expected_sources: Vec<String> = expected_hits
        .iter()
        .map(|h| h.id.clone().unwrap())
        .collect();

    let result = query::answer(&store, &FixedEmbedder, &EchoGenerator, "What is X?", 5)
        .await
        .unwrap();

    assert_eq!(result.sources, expected_sources);

    // Echoed prompt carries the context assembled in hit order with the
    // literal separator, plus the question.
    let joined = expected_hits
        .iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    assert!(result.response.contains(&joined));
    assert!(result
        .response
        .contains("Answer the question based on the above context: What is X?"));
}

#[tokio::test]
async fn answer_on_empty_store_has_no_sources() {
    let store = MemoryStore::new();
    let result = query::answer(&store, &FixedEmbedder, &EchoGenerator, "What is X?", 5)
        .await
        .unwrap();
    assert!(result.sources.is_empty());
    assert!(result
        .response
        .contains("Answer the question based only on the following context:"));
}

#[tokio::test]
async fn missing_metadata_id_becomes_unknown_sentinel() {
    let store = AnonymousStore(MemoryStore::new());
    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    sync_chunks(&store, &FixedEmbedder, chunks, 64).await.unwrap();

    let result = query::answer(&store, &FixedEmbedder, &EchoGenerator, "What is X?", 5)
        .await
        .unwrap();

    assert_eq!(result.sources.len(), 3);
    assert!(result.sources.iter().all(|s| s == UNKNOWN_ID));
}

#[tokio::test]
async fn reset_clears_all_state() {
    let store = MemoryStore::new();
    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    sync_chunks(&store, &FixedEmbedder, chunks, 64).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 3);

    store.clear().await.unwrap();
    assert!(store.ids().await.unwrap().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);

    // The next run starts from empty and re-adds everything.
    let chunks = chunk_pages(&[three_chunk_page()], MAX_CHARS, OVERLAP_CHARS);
    let outcome = sync_chunks(&store, &FixedEmbedder, chunks, 64).await.unwrap();
    assert_eq!(outcome.existing, 0);
    assert_eq!(outcome.added, 3);
}

// Documented behavior: a chunk whose text changed but whose identifier
// did not keeps its originally stored text and embedding.
#[tokio::test]
async fn stable_identifier_keeps_stale_content() {
    let store = MemoryStore::new();
    let embedder = FixedEmbedder;

    let original = chunk_pages(
        &[page("a.pdf", 0, "the original passage".to_string())],
        MAX_CHARS,
        OVERLAP_CHARS,
    );
    sync_chunks(&store, &embedder, original, 64).await.unwrap();

    let drifted = chunk_pages(
        &[page("a.pdf", 0, "a completely different passage".to_string())],
        MAX_CHARS,
        OVERLAP_CHARS,
    );
    let outcome = sync_chunks(&store, &embedder, drifted, 64).await.unwrap();
    assert_eq!(outcome.added, 0);

    let hits = store.search(&fixed_vector("the original passage"), 1).await.unwrap();
    assert_eq!(hits[0].text, "the original passage");
}

#[tokio::test]
async fn retrieval_failure_is_tagged() {
    let store = MemoryStore::new();
    let err = query::answer(&store, &FailingEmbedder, &EchoGenerator, "q", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Retrieval(_)));
    assert!(err.to_string().contains("embedding backend offline"));
}

#[tokio::test]
async fn generation_failure_is_tagged() {
    let store = MemoryStore::new();
    let err = query::answer(&store, &FixedEmbedder, &FailingGenerator, "q", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Generation(_)));
    assert!(err.to_string().contains("model unavailable"));
}
