//! Context assembly and prompt rendering.
//!
//! Retrieved passages are joined with a fixed separator and rendered into
//! a static question-answering template. Neither the separator nor the
//! template is configurable per request.

use crate::models::SearchHit;

/// Separator placed between retrieved passages in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Question-answering template with exactly two placeholders.
pub const QA_TEMPLATE: &str = "\nAnswer the question based only on the following context:\n\n{context}\n\n---\n\nAnswer the question based on the above context: {question}\n";

/// Join hit texts in retrieval order with [`CONTEXT_SEPARATOR`].
pub fn assemble_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Render the context block and question into [`QA_TEMPLATE`].
pub fn render_prompt(context: &str, question: &str) -> String {
    QA_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}
