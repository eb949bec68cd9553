//! Property-based tests for trie, query, and ranking invariants.

mod common;

use common::{index_from_texts, postings};
use proptest::prelude::*;
use proptest::string::string_regex;
use std::collections::{BTreeSet, HashMap};
use talpa::{
    evaluate, search, term_frequencies, to_postfix, tokenize_query, CompactTrie, DocId,
};

/// Terms drawn from the exact alphabet the tokenizer produces.
fn term_strategy() -> impl Strategy<Value = String> {
    string_regex("[a-z0-9&-]{1,8}").unwrap()
}

/// Posting triples with distinct (term, doc) pairs.
fn triples_strategy() -> impl Strategy<Value = Vec<(String, u32, u32)>> {
    prop::collection::vec((term_strategy(), 1u32..16, 1u32..50), 1..40).prop_map(|raw| {
        let mut seen = BTreeSet::new();
        raw.into_iter()
            .filter(|(term, doc, _)| seen.insert((term.clone(), *doc)))
            .collect()
    })
}

fn build_trie(triples: &[(String, u32, u32)]) -> CompactTrie {
    let mut trie = CompactTrie::new();
    for (term, doc, tf) in triples {
        trie.insert(term, DocId(*doc), *tf);
    }
    trie
}

fn posting_multiset(trie: &CompactTrie, term: &str) -> BTreeSet<(u32, u32)> {
    postings(trie, term).into_iter().collect()
}

fn doc_texts_strategy() -> impl Strategy<Value = Vec<String>> {
    let word = string_regex("[a-z]{2,6}").unwrap();
    let doc = prop::collection::vec(word, 1..12).prop_map(|words| words.join(" "));
    prop::collection::vec(doc, 1..6)
}

proptest! {
    #[test]
    fn every_inserted_triple_is_found(triples in triples_strategy()) {
        let trie = build_trie(&triples);
        for (term, doc, tf) in &triples {
            let postings = posting_multiset(&trie, term);
            prop_assert!(
                postings.contains(&(*doc, *tf)),
                "({}, {}, {}) missing from {:?}", term, doc, tf, postings
            );
        }
    }

    #[test]
    fn uninserted_terms_and_strict_prefixes_miss(triples in triples_strategy()) {
        let trie = build_trie(&triples);
        let inserted: BTreeSet<&str> =
            triples.iter().map(|(t, _, _)| t.as_str()).collect();

        // A term longer than anything inserted cannot be found.
        let absent = format!("{}0&z", triples[0].0);
        if !inserted.contains(absent.as_str()) {
            prop_assert!(trie.lookup(&absent).is_empty());
        }

        // Strict prefixes of inserted terms that were not themselves
        // inserted must miss too.
        for term in &inserted {
            for cut in 1..term.len() {
                if !term.is_char_boundary(cut) {
                    continue;
                }
                let prefix = &term[..cut];
                if !inserted.contains(prefix) {
                    prop_assert!(
                        trie.lookup(prefix).is_empty(),
                        "prefix {:?} of {:?} should miss", prefix, term
                    );
                }
            }
        }
    }

    #[test]
    fn structural_invariants_hold_after_any_insert_sequence(triples in triples_strategy()) {
        let trie = build_trie(&triples);
        prop_assert!(trie.check_well_formed());
    }

    #[test]
    fn serialization_roundtrip_preserves_every_lookup(triples in triples_strategy()) {
        let trie = build_trie(&triples);
        let mut buf = Vec::new();
        trie.write_to(&mut buf).unwrap();
        let restored = CompactTrie::read_from(buf.as_slice()).unwrap();

        prop_assert_eq!(&restored, &trie);
        for (term, _, _) in &triples {
            prop_assert_eq!(
                posting_multiset(&restored, term),
                posting_multiset(&trie, term)
            );
        }
    }

    #[test]
    fn insertion_order_does_not_change_lookups(triples in triples_strategy()) {
        let forward = build_trie(&triples);
        let mut reversed_triples = triples.clone();
        reversed_triples.reverse();
        let reversed = build_trie(&reversed_triples);

        for (term, _, _) in &triples {
            prop_assert_eq!(
                posting_multiset(&forward, term),
                posting_multiset(&reversed, term)
            );
        }
    }

    #[test]
    fn boolean_algebra_identities(
        a in prop::collection::btree_set(1u32..24, 0..8),
        b in prop::collection::btree_set(1u32..24, 0..8),
        c in prop::collection::btree_set(1u32..24, 0..8),
    ) {
        let mut trie = CompactTrie::new();
        for (term, docs) in [("a", &a), ("b", &b), ("c", &c)] {
            for doc in docs {
                trie.insert(term, DocId(*doc), 1);
            }
        }

        let eval = |query: &str| -> BTreeSet<u32> {
            let postfix = to_postfix(tokenize_query(query)).unwrap();
            evaluate(&postfix, &trie)
                .unwrap()
                .into_iter()
                .map(DocId::get)
                .collect()
        };

        // Idempotence.
        prop_assert_eq!(eval("a AND a"), eval("a"));
        prop_assert_eq!(eval("a OR a"), eval("a"));
        // Commutativity.
        prop_assert_eq!(eval("a AND b"), eval("b AND a"));
        prop_assert_eq!(eval("a OR b"), eval("b OR a"));
        // Distributivity.
        prop_assert_eq!(eval("a AND (b OR c)"), eval("(a AND b) OR (a AND c)"));
        // AND binds tighter than OR.
        prop_assert_eq!(eval("a OR b AND c"), eval("a OR (b AND c)"));
        // Ground truth from plain set arithmetic.
        let expected_and: BTreeSet<u32> = a.intersection(&b).copied().collect();
        prop_assert_eq!(eval("a AND b"), expected_and);
        let expected_or: BTreeSet<u32> = a.union(&b).copied().collect();
        prop_assert_eq!(eval("a OR b"), expected_or);
    }

    #[test]
    fn indexed_documents_report_exact_term_frequencies(texts in doc_texts_strategy()) {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let index = index_from_texts(&refs);

        for (i, text) in texts.iter().enumerate() {
            let doc = DocId(i as u32 + 1);
            let expected: HashMap<String, u32> = term_frequencies(text);
            for (term, tf) in expected {
                prop_assert_eq!(index.lookup_tf(&term, doc), tf);
            }
        }
    }

    #[test]
    fn identical_query_on_identical_corpus_is_deterministic(texts in doc_texts_strategy()) {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let index = index_from_texts(&refs);
        let rebuilt = index_from_texts(&refs);

        // Query for the first word of the first document, OR'd with a term
        // that misses, to exercise both set paths and the ranker.
        let seed = texts[0].split(' ').next().unwrap_or("x");
        let query = format!("{} OR qqqqqqq", seed);

        let first = search(&index, &query).unwrap();
        prop_assert_eq!(&search(&index, &query).unwrap(), &first);
        prop_assert_eq!(&search(&rebuilt, &query).unwrap(), &first);
    }
}
