// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a talpa index.
//!
//! These types define how terms, postings, and per-term statistics fit
//! together. Every other module builds on them, so the invariants here are
//! the ones that break search if you ignore them:
//!
//! - **DocId**: dense, starts at 1, assigned in document-stream order.
//!   There are no holes; the doc map has exactly one entry per assigned id.
//! - **Posting**: a term appears at most once per document in a posting
//!   list; `tf` is the total occurrence count, always ≥ 1.
//! - **TermStats**: `mu` and `sigma` describe the TF distribution over the
//!   `df` documents that contain the term. `sigma` is the population
//!   standard deviation and is never negative.
//!
//! Rather than trusting call sites to remember these, the mutable/sealed
//! split in `index` enforces them: only `IndexBuilder` writes, and it
//! aggregates TF per document before any posting reaches the trie.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Type-safe document identifier.
///
/// Prevents accidentally passing a term frequency where a document id is
/// expected. Ids are dense and start at 1; `DocId(0)` never occurs in a
/// sealed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DocId(pub u32);

impl DocId {
    /// Get the underlying value.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for DocId {
    fn from(id: u32) -> Self {
        DocId(id)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a term's inverted list: the document and how often the term
/// occurs in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Posting {
    pub doc: DocId,
    /// Term frequency within `doc`. Always ≥ 1.
    pub tf: u32,
}

/// Global TF statistics for a single term, computed at seal time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStats {
    /// Mean TF over the documents containing the term.
    pub mu: f64,
    /// Population standard deviation of TF over those documents.
    pub sigma: f64,
    /// Document frequency: how many documents contain the term.
    pub df: u32,
}

/// Mapping from dense document ids to the opaque external identifiers the
/// caller supplied (typically relative file paths).
///
/// A `BTreeMap` keeps the persisted JSON deterministic.
pub type DocMap = BTreeMap<DocId, String>;

/// Per-term statistics table, keyed by term.
pub type StatsMap = BTreeMap<String, TermStats>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_orders_numerically() {
        assert!(DocId(2) < DocId(10));
        assert_eq!(DocId::from(7).get(), 7);
    }

    #[test]
    fn doc_id_displays_as_plain_number() {
        assert_eq!(DocId(42).to_string(), "42");
    }

    #[test]
    fn postings_order_by_doc_then_tf() {
        let a = Posting { doc: DocId(1), tf: 9 };
        let b = Posting { doc: DocId(2), tf: 1 };
        assert!(a < b);
    }
}
