//! The query-side façade: one call from query string to ranked ids.
//!
//! `search` wires the pipeline together: tokenize, shunting-yard, boolean
//! evaluation against the trie, then Z-score ranking of the surviving
//! candidates. The index is borrowed immutably for the whole call, so any
//! number of searches may run against one sealed index.

use crate::error::Error;
use crate::index::Index;
use crate::query::{evaluate, query_terms, to_postfix, tokenize_query};
use crate::scoring::rank;
use crate::types::DocId;

/// Run a boolean query and return matching document ids, most relevant
/// first.
///
/// A query with no tokens returns an empty list. A well-formed query with
/// no matches also returns an empty list; neither is an error. Structural
/// problems in the query surface as
/// [`Error::MalformedQuery`](Error::MalformedQuery).
pub fn search(index: &Index, query: &str) -> Result<Vec<DocId>, Error> {
    let tokens = tokenize_query(query);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let terms = query_terms(&tokens);
    let postfix = to_postfix(tokens)?;
    let matched = evaluate(&postfix, index.trie())?;
    if matched.is_empty() {
        return Ok(Vec::new());
    }

    Ok(rank(index, &matched, &terms))
}
