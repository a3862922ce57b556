//! Fixed-size overlapping text chunker.
//!
//! Splits page text into windows of at most `max_chars` characters, each
//! consecutive pair sharing exactly `overlap_chars` characters. Boundaries
//! are chosen purely by length; sentence and paragraph structure is not
//! respected. Window edges are snapped to UTF-8 character boundaries, so
//! lengths are counted in characters, not bytes.

use crate::models::{Chunk, Page};

/// Split every page into chunks, preserving page order.
pub fn chunk_pages(pages: &[Page], max_chars: usize, overlap_chars: usize) -> Vec<Chunk> {
    pages
        .iter()
        .flat_map(|page| chunk_page(page, max_chars, overlap_chars))
        .collect()
}

/// Split a single page into overlapping chunks carrying the page's
/// source path and page number. An empty page yields no chunks.
pub fn chunk_page(page: &Page, max_chars: usize, overlap_chars: usize) -> Vec<Chunk> {
    split_text(&page.text, max_chars, overlap_chars)
        .into_iter()
        .map(|text| Chunk {
            source: page.source.clone(),
            page: page.page,
            text,
            id: None,
        })
        .collect()
}

/// Slide a window of `max_chars` characters over `text` with a stride of
/// `max_chars - overlap_chars`.
///
/// Every chunk except the last has exactly `max_chars` characters once the
/// text is long enough; the final chunk may be shorter. Concatenating the
/// chunks with the overlap removed reproduces the input exactly.
///
/// Requires `overlap_chars < max_chars` (enforced at config load).
pub fn split_text(text: &str, max_chars: usize, overlap_chars: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of each character, so windows can be counted in chars
    // but sliced on valid boundaries.
    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total = bounds.len();
    let stride = max_chars - overlap_chars;

    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + max_chars).min(total);
        let lo = bounds[start];
        let hi = if end == total { text.len() } else { bounds[end] };
        chunks.push(text[lo..hi].to_string());

        if end == total {
            break;
        }
        start += stride;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> Page {
        Page {
            source: "a.pdf".to_string(),
            page: 0,
            text: text.to_string(),
        }
    }

    #[test]
    fn short_text_single_chunk() {
        let chunks = split_text("hello world", 800, 80);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn empty_page_yields_no_chunks() {
        assert!(split_text("", 800, 80).is_empty());
        assert!(chunk_page(&page(""), 800, 80).is_empty());
    }

    #[test]
    fn consecutive_chunks_share_exact_overlap() {
        let text: String = ('a'..='z').cycle().take(50).collect();
        let chunks = split_text(&text, 20, 5);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let tail: String = prev[prev.len() - 5..].iter().collect();
            assert!(pair[1].starts_with(&tail), "overlap mismatch: {:?}", pair);
        }
    }

    #[test]
    fn chunks_respect_max_length() {
        let text = "x".repeat(5000);
        let chunks = split_text(&text, 800, 80);
        for c in &chunks {
            assert!(c.chars().count() <= 800);
        }
        // All but the final chunk are full windows.
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.chars().count(), 800);
        }
    }

    #[test]
    fn dropping_overlaps_reconstructs_input() {
        let text: String = (0..1000).map(|i| ((i % 26) as u8 + b'a') as char).collect();
        let chunks = split_text(&text, 100, 10);
        let mut rebuilt = chunks[0].clone();
        for c in &chunks[1..] {
            let suffix: String = c.chars().skip(10).collect();
            rebuilt.push_str(&suffix);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "日本語のテキスト。".repeat(40);
        let chunks = split_text(&text, 50, 5);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 50);
        }
    }

    #[test]
    fn chunks_inherit_page_metadata() {
        let p = Page {
            source: "docs/report.pdf".to_string(),
            page: 3,
            text: "y".repeat(30),
        };
        let chunks = chunk_page(&p, 20, 5);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert_eq!(c.source, "docs/report.pdf");
            assert_eq!(c.page, 3);
            assert!(c.id.is_none());
        }
    }

    #[test]
    fn deterministic() {
        let text: String = (0..500).map(|i| ((i % 10) as u8 + b'0') as char).collect();
        assert_eq!(split_text(&text, 80, 8), split_text(&text, 80, 8));
    }
}
