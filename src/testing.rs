//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of test helpers to avoid duplication.

#![doc(hidden)]

use crate::index::{Index, IndexBuilder};
use crate::trie::CompactTrie;
use crate::types::DocId;

/// Build a sealed index from bare document texts.
///
/// External ids are synthesized as `doc-1.txt`, `doc-2.txt`, … in order,
/// so ids line up with the dense DocId assignment.
pub fn index_from_texts(texts: &[&str]) -> Index {
    let mut builder = IndexBuilder::new();
    for (i, text) in texts.iter().enumerate() {
        builder.add_document(&format!("doc-{}.txt", i + 1), text);
    }
    builder.seal()
}

/// Unwrap DocIds to bare numbers for terse assertions.
pub fn ids(docs: &[DocId]) -> Vec<u32> {
    docs.iter().map(|d| d.get()).collect()
}

/// Project a term's posting list to bare `(doc, tf)` pairs, in list order.
pub fn postings(trie: &CompactTrie, term: &str) -> Vec<(u32, u32)> {
    trie.lookup(term)
        .iter()
        .map(|p| (p.doc.get(), p.tf))
        .collect()
}
