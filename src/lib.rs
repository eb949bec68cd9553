//! Boolean full-text search over a compact radix trie with Z-score ranking.
//!
//! This crate is a small, single-threaded search core: documents go in
//! once, get sealed into an immutable index, and boolean queries with
//! statistical ranking come out. No stemming, no fuzzy matching, no
//! incremental updates: rebuild the index when the corpus changes.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  index.rs  │───▶│   trie.rs   │◀───│  query.rs   │
//! │ (tokenize, │    │ (CompactTrie│    │ (shunting-  │
//! │  TF, seal) │    │  + postings)│    │  yard, eval)│
//! └────────────┘    └─────────────┘    └─────────────┘
//!        │                 │                  │
//!        ▼                 ▼                  ▼
//! ┌────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ persist.rs │    │ scoring.rs  │◀───│  search.rs  │
//! │ (3 on-disk │    │ (Z-score,   │    │ (query →    │
//! │  artifacts)│    │  ranking)   │    │  ranked ids)│
//! └────────────┘    └─────────────┘    └─────────────┘
//! ```
//!
//! Index time: documents → tokenizer → trie inserts + raw statistics →
//! `mu`/`sigma` at seal → three persisted artifacts. Query time: query
//! string → tokens → postfix → candidate set via trie lookups and set
//! operations → ranked ids via Z-score aggregation.
//!
//! # Usage
//!
//! ```
//! use talpa::{index_documents, search};
//!
//! let index = index_documents(vec![
//!     ("a.txt".to_string(), "the quick brown fox".to_string()),
//!     ("b.txt".to_string(), "the slow brown bear".to_string()),
//! ]);
//!
//! let hits = search(&index, "brown AND (fox OR bear)").unwrap();
//! assert_eq!(hits.len(), 2);
//! assert_eq!(index.resolve(hits[0]), Some("a.txt"));
//! ```
//!
//! A sealed [`Index`] is immutable; share it freely across readers. All
//! failures are returned as [`Error`] values; the library never logs and
//! never exits the process.

// Module declarations
mod error;
mod index;
pub mod persist;
mod query;
mod scoring;
mod search;
mod trie;
mod types;

#[doc(hidden)]
pub mod testing;

// Re-exports for public API
pub use error::Error;
pub use index::{index_documents, tokenize, term_frequencies, Index, IndexBuilder};
pub use query::{evaluate, query_terms, to_postfix, tokenize_query, QueryToken};
pub use scoring::{rank, z_score};
pub use search::search;
pub use trie::CompactTrie;
pub use types::{DocId, DocMap, Posting, StatsMap, TermStats};
