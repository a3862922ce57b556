//! Retrieval and answer pipeline.
//!
//! [`retrieve`] embeds the question and passes the store's top-k hits
//! through unmodified — no re-ranking, thresholding, or deduplication.
//! [`answer`] runs the full pipeline (retrieve → assemble context →
//! render prompt → generate) and tags failures by stage so the transport
//! shell can map them to status codes.

use anyhow::Result;
use thiserror::Error;

use crate::config::Config;
use crate::embedding::{self, Embedder};
use crate::llm::{self, Generator};
use crate::models::{QueryResponse, SearchHit};
use crate::prompt;
use crate::store::sqlite::SqliteStore;
use crate::store::VectorStore;

/// Sentinel cited when a hit carries no identifier in its metadata.
pub const UNKNOWN_ID: &str = "Unknown ID";

/// A pipeline failure, tagged by the stage that produced it.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Embedding the question or searching the store failed.
    #[error("retrieval failed: {0}")]
    Retrieval(anyhow::Error),
    /// The generation call failed.
    #[error("generation failed: {0}")]
    Generation(anyhow::Error),
}

/// Return the store's top-`k` hits for the question, in descending score
/// order exactly as the store ranked them. An empty store yields no hits.
pub async fn retrieve(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    question: &str,
    k: usize,
) -> Result<Vec<SearchHit>> {
    let query_vec = embedder.embed_query(question).await?;
    store.search(&query_vec, k).await
}

/// Answer a question from the store's contents.
///
/// The response cites one source identifier per retrieved hit, in
/// retrieval order, substituting [`UNKNOWN_ID`] where a hit has none.
pub async fn answer(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    generator: &dyn Generator,
    question: &str,
    k: usize,
) -> Result<QueryResponse, QueryError> {
    let hits = retrieve(store, embedder, question, k)
        .await
        .map_err(QueryError::Retrieval)?;

    let context = prompt::assemble_context(&hits);
    let rendered = prompt::render_prompt(&context, question);

    let response = generator
        .generate(&rendered)
        .await
        .map_err(QueryError::Generation)?;

    let sources = hits
        .iter()
        .map(|hit| hit.id.clone().unwrap_or_else(|| UNKNOWN_ID.to_string()))
        .collect();

    Ok(QueryResponse { response, sources })
}

/// Run the `query` command: one-shot question against the configured
/// store, printed to the operator.
pub async fn run_query(config: &Config, question: &str, top_k: Option<usize>) -> Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("question must not be empty");
    }

    let k = top_k.unwrap_or(config.retrieval.top_k);
    let store = SqliteStore::open(&config.store).await?;
    let embedder = embedding::create_embedder(&config.embedding)?;
    let generator = llm::create_generator(&config.llm)?;

    let result = answer(&store, embedder.as_ref(), generator.as_ref(), question, k).await?;

    println!("{}", result.response);
    println!();
    println!("sources:");
    for source in &result.sources {
        println!("  {}", source);
    }

    store.close().await;
    Ok(())
}
