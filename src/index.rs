//! Index construction: documents in, sealed index out.
//!
//! The indexer consumes a stream of `(external_id, text)` pairs, assigns
//! dense document ids starting at 1, tokenizes, and feeds per-document term
//! frequencies into the trie while accumulating the running sums the
//! Z-score statistics need. Corpus acquisition is the caller's problem;
//! this module never opens a directory.
//!
//! The mutable/sealed split captures the write-once lifecycle in the types:
//! [`IndexBuilder`] is the only writer, [`seal`](IndexBuilder::seal)
//! computes `mu`/`sigma` per term and hands back an [`Index`] that nothing
//! mutates afterwards. Multiple readers may share a sealed index without
//! synchronization.

use crate::error::Error;
use crate::scoring;
use crate::trie::CompactTrie;
use crate::types::{DocId, DocMap, StatsMap, TermStats};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// True for the characters a term may contain. Anything else, including
/// every non-ASCII character, terminates a token.
#[inline]
fn is_term_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '&' || c == '-'
}

/// Split text into terms: lowercase, then every maximal run of
/// `[a-z0-9&-]`. Leading or trailing hyphens and ampersands are kept
/// verbatim.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in lowered.chars() {
        if is_term_char(c) {
            current.push(c);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Term → occurrence count for one document.
pub fn term_frequencies(text: &str) -> HashMap<String, u32> {
    let mut tf = HashMap::new();
    for token in tokenize(text) {
        *tf.entry(token).or_insert(0) += 1;
    }
    tf
}

/// Running sums accumulated per term during the build pass.
#[derive(Debug, Clone, Copy, Default)]
struct RawStats {
    df: u32,
    sum_tf: u64,
    sum_tf2: u64,
}

/// Mutable build phase of an index.
///
/// Feed documents with [`add_document`](Self::add_document), then call
/// [`seal`](Self::seal). Document order determines id assignment.
#[derive(Debug)]
pub struct IndexBuilder {
    trie: CompactTrie,
    doc_map: DocMap,
    raw: BTreeMap<String, RawStats>,
    next_doc: u32,
}

impl IndexBuilder {
    pub fn new() -> Self {
        IndexBuilder {
            trie: CompactTrie::new(),
            doc_map: DocMap::new(),
            raw: BTreeMap::new(),
            next_doc: 1,
        }
    }

    /// Number of documents added so far.
    pub fn doc_count(&self) -> usize {
        self.doc_map.len()
    }

    /// Ingest one document and return its assigned id.
    ///
    /// Aggregates TF per term before touching the trie, so a `(term, doc)`
    /// pair lands in a posting list exactly once.
    pub fn add_document(&mut self, external_id: &str, text: &str) -> DocId {
        let doc = DocId(self.next_doc);
        self.next_doc += 1;
        self.doc_map.insert(doc, external_id.to_string());

        for (term, tf) in term_frequencies(text) {
            self.trie.insert(&term, doc, tf);

            let raw = self.raw.entry(term).or_default();
            raw.df += 1;
            raw.sum_tf += u64::from(tf);
            raw.sum_tf2 += u64::from(tf) * u64::from(tf);
        }
        doc
    }

    /// Finish the build: compute per-term statistics and freeze everything.
    pub fn seal(self) -> Index {
        let mut stats = StatsMap::new();
        for (term, raw) in self.raw {
            let df = f64::from(raw.df);
            let mu = raw.sum_tf as f64 / df;
            // E[X²] − E[X]² can dip a hair below zero under floating point;
            // clamp before the square root.
            let variance = (raw.sum_tf2 as f64 / df - mu * mu).max(0.0);
            stats.insert(
                term,
                TermStats {
                    mu,
                    sigma: variance.sqrt(),
                    df: raw.df,
                },
            );
        }

        let index = Index {
            trie: self.trie,
            stats,
            doc_map: self.doc_map,
        };
        debug_assert!(index.trie.check_well_formed());
        index
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        IndexBuilder::new()
    }
}

/// Build a sealed index from a document stream in one call.
pub fn index_documents<I>(docs: I) -> Index
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut builder = IndexBuilder::new();
    for (external_id, text) in docs {
        builder.add_document(&external_id, &text);
    }
    builder.seal()
}

/// A sealed, read-only index: the trie, the per-term statistics, and the
/// doc-id map. Created once by [`IndexBuilder::seal`] or loaded from disk;
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    trie: CompactTrie,
    stats: StatsMap,
    doc_map: DocMap,
}

impl Index {
    pub(crate) fn from_parts(trie: CompactTrie, stats: StatsMap, doc_map: DocMap) -> Self {
        Index {
            trie,
            stats,
            doc_map,
        }
    }

    /// Total number of indexed documents.
    pub fn total_docs(&self) -> usize {
        self.doc_map.len()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.stats.len()
    }

    /// Map a document id back to the external identifier the caller
    /// supplied at indexing time.
    pub fn resolve(&self, doc: DocId) -> Option<&str> {
        self.doc_map.get(&doc).map(String::as_str)
    }

    /// TF of `term` in `doc`, or 0. Part of the snippet-support surface:
    /// presentation layers use this together with [`z_score`](Self::z_score)
    /// to pick each document's most surprising query term.
    pub fn lookup_tf(&self, term: &str, doc: DocId) -> u32 {
        self.trie.lookup_tf(term, doc)
    }

    /// Global statistics for a term, if it was ever indexed.
    pub fn term_stats(&self, term: &str) -> Option<&TermStats> {
        self.stats.get(term)
    }

    /// Z-score of observing `tf` for `term`, against the sealed statistics.
    pub fn z_score(&self, term: &str, tf: u32) -> f64 {
        scoring::z_score(self.term_stats(term), tf)
    }

    pub(crate) fn trie(&self) -> &CompactTrie {
        &self.trie
    }

    pub(crate) fn stats(&self) -> &StatsMap {
        &self.stats
    }

    pub(crate) fn doc_map(&self) -> &DocMap {
        &self.doc_map
    }

    /// Persist the three artifacts into `dir`. See [`crate::persist`].
    pub fn save(&self, dir: &Path) -> Result<(), Error> {
        crate::persist::save_index(self, dir)
    }

    /// Load a previously saved index from `dir`.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        crate::persist::load_index(dir)
    }
}
