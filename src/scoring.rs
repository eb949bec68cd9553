// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Statistical ranking: how matching documents get ordered.
//!
//! A document's relevance is the mean Z-score of the query terms it
//! actually contains. A term whose TF in the document sits far above that
//! term's corpus mean pulls the document up; a below-average TF pulls it
//! down. Operators and duplicate query terms are ignored; a candidate that
//! contains none of the query terms (possible when an `OR` branch matched
//! through the other side) is dropped from the output entirely.
//!
//! # Key invariant: total, deterministic order
//!
//! Relevance is a finite f64 (each Z-score is finite and the mean divides
//! by at least 1), so the descending-relevance comparison with the
//! ascending-doc-id tiebreak is a total order: identical index + identical
//! query ⇒ identical output, including tie order.

use crate::index::Index;
use crate::types::{DocId, TermStats};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Z-score of observing `tf` occurrences of a term, given the term's
/// sealed corpus statistics.
///
/// - Unknown term (no stats): 0.0.
/// - `sigma <= 0` (every containing document had the same TF): 1.0 when
///   `tf` exceeds the constant, 0.0 otherwise. Never NaN.
/// - Otherwise the standardized deviation `(tf − mu) / sigma`.
pub fn z_score(stats: Option<&TermStats>, tf: u32) -> f64 {
    let Some(stats) = stats else {
        return 0.0;
    };
    let tf = f64::from(tf);
    if stats.sigma <= 0.0 {
        return if tf > stats.mu { 1.0 } else { 0.0 };
    }
    (tf - stats.mu) / stats.sigma
}

/// Rank candidate documents by mean Z-score over `query_terms`,
/// descending, with ascending doc id breaking ties.
pub fn rank(
    index: &Index,
    candidates: &HashSet<DocId>,
    query_terms: &BTreeSet<String>,
) -> Vec<DocId> {
    // One trie descent per query term up front; the per-candidate probe is
    // then a hash hit instead of a fresh walk.
    let term_postings: Vec<(&str, HashMap<DocId, u32>)> = query_terms
        .iter()
        .map(|term| {
            let by_doc = index
                .trie()
                .lookup(term)
                .iter()
                .map(|p| (p.doc, p.tf))
                .collect();
            (term.as_str(), by_doc)
        })
        .collect();

    let mut ranked: Vec<(f64, DocId)> = Vec::with_capacity(candidates.len());
    for &doc in candidates {
        let mut sum = 0.0;
        let mut matched = 0u32;
        for (term, by_doc) in &term_postings {
            let tf = by_doc.get(&doc).copied().unwrap_or(0);
            if tf > 0 {
                sum += z_score(index.term_stats(term), tf);
                matched += 1;
            }
        }
        if matched > 0 {
            ranked.push((sum / f64::from(matched), doc));
        }
    }

    ranked.sort_by(compare_ranked);
    ranked.into_iter().map(|(_, doc)| doc).collect()
}

/// Sort order: relevance descending, then doc id ascending for absolute
/// determinism.
fn compare_ranked(a: &(f64, DocId), b: &(f64, DocId)) -> Ordering {
    match b.0.partial_cmp(&a.0) {
        Some(Ordering::Equal) | None => a.1.cmp(&b.1),
        Some(ord) => ord,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ids, index_from_texts};

    fn stats(mu: f64, sigma: f64, df: u32) -> TermStats {
        TermStats { mu, sigma, df }
    }

    #[test]
    fn z_score_without_stats_is_zero() {
        assert_eq!(z_score(None, 100), 0.0);
    }

    #[test]
    fn z_score_standardizes_against_mu_and_sigma() {
        let s = stats(4.0, 3.0, 2);
        assert!((z_score(Some(&s), 10) - 2.0).abs() < 1e-12);
        assert!((z_score(Some(&s), 2) + 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_sigma_never_produces_nan() {
        let s = stats(3.0, 0.0, 5);
        assert_eq!(z_score(Some(&s), 4), 1.0);
        assert_eq!(z_score(Some(&s), 3), 0.0);
        assert_eq!(z_score(Some(&s), 1), 0.0);
    }

    #[test]
    fn higher_tf_ranks_first_for_a_single_term() {
        // Doc 1 has tf 10, doc 2 has tf 2; both contain "t".
        let heavy = "t ".repeat(10);
        let index = index_from_texts(&[heavy.as_str(), "t t", "t t t"]);

        let candidates: HashSet<DocId> = [DocId(1), DocId(2)].into_iter().collect();
        let terms: BTreeSet<String> = ["t".to_string()].into_iter().collect();
        assert_eq!(ids(&rank(&index, &candidates, &terms)), vec![1, 2]);
    }

    #[test]
    fn equal_relevance_ties_break_by_doc_id() {
        let index = index_from_texts(&["same same", "same same", "same same"]);

        let candidates: HashSet<DocId> = [DocId(3), DocId(1), DocId(2)].into_iter().collect();
        let terms: BTreeSet<String> = ["same".to_string()].into_iter().collect();
        assert_eq!(ids(&rank(&index, &candidates, &terms)), vec![1, 2, 3]);
    }

    #[test]
    fn candidates_without_any_query_term_are_dropped() {
        let index = index_from_texts(&["apple", "banana"]);

        // Doc 2 is a candidate (e.g. via an OR branch) but contains
        // neither query term.
        let candidates: HashSet<DocId> = [DocId(1), DocId(2)].into_iter().collect();
        let terms: BTreeSet<String> = ["apple".to_string()].into_iter().collect();
        assert_eq!(ids(&rank(&index, &candidates, &terms)), vec![1]);
    }
}
