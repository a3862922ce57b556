//! Core data models for the ingestion and query pipelines.
//!
//! These types represent the pages, chunks, store records, and search hits
//! that flow from PDF extraction through the vector store to an answer.

use serde::Serialize;

/// One page of text extracted from a PDF, numbered from 0.
#[derive(Debug, Clone)]
pub struct Page {
    /// Path of the source PDF as given to the ingest command.
    pub source: String,
    /// Zero-based page number within the source.
    pub page: i64,
    /// Raw extracted text for this page.
    pub text: String,
}

/// A bounded-length fragment of a page's text.
///
/// `id` stays `None` until identifier assignment runs; after that it holds
/// the composite key `"{source}:{page}:{seq}"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source: String,
    pub page: i64,
    pub text: String,
    pub id: Option<String>,
}

/// A record persisted in the vector store, keyed by chunk identifier.
///
/// Records are written once by the synchronizer and never mutated; only a
/// full reset removes them.
#[derive(Debug, Clone)]
pub struct StoreRecord {
    pub id: String,
    pub source: String,
    pub page: i64,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A scored hit from a similarity search, ordered by descending score.
///
/// `id` is `None` when the stored metadata carries no identifier; the
/// answer pipeline substitutes a sentinel in that case.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: Option<String>,
    pub source: String,
    pub page: i64,
    pub text: String,
    pub score: f32,
}

/// Response for a single question: the model's answer plus the identifiers
/// of the passages that were supplied as context, in retrieval order.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub response: String,
    pub sources: Vec<String>,
}
