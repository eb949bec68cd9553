//! Boolean query pipeline: tokenize → postfix → evaluate.
//!
//! Queries are infix boolean expressions over terms: `rust AND (cargo OR
//! crate)`. Recognition is literal: the uppercase keywords `AND` and `OR`
//! are operators, parentheses group, and every other whitespace-separated
//! token is lowercased and treated as a term. There is no `NOT`.
//!
//! The shunting-yard conversion gives `AND` precedence over `OR`, both
//! left-associative. Evaluation walks the postfix stream with a stack of
//! document-id sets; a term that misses the trie simply contributes the
//! empty set. Structural problems — unmatched parentheses, operator
//! underflow, leftover operands — surface as
//! [`Error::MalformedQuery`](crate::Error::MalformedQuery) and leave the
//! index untouched.

use crate::error::Error;
use crate::trie::CompactTrie;
use crate::types::DocId;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// One token of a boolean query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    /// A (lowercased) search term.
    Term(String),
    And,
    Or,
    LParen,
    RParen,
}

impl QueryToken {
    /// Binding strength: `AND` binds tighter than `OR`. Zero for
    /// non-operators so they never win a precedence comparison.
    fn precedence(&self) -> u8 {
        match self {
            QueryToken::And => 2,
            QueryToken::Or => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryToken::Term(t) => write!(f, "{}", t),
            QueryToken::And => write!(f, "AND"),
            QueryToken::Or => write!(f, "OR"),
            QueryToken::LParen => write!(f, "("),
            QueryToken::RParen => write!(f, ")"),
        }
    }
}

/// Split a query string into tokens.
///
/// Parentheses need no surrounding whitespace; `a AND(b OR c)` works. A
/// lowercase `and` or `or` is a term, not an operator.
pub fn tokenize_query(query: &str) -> Vec<QueryToken> {
    let spaced = query.replace('(', " ( ").replace(')', " ) ");
    spaced
        .split_whitespace()
        .map(|token| match token {
            "AND" => QueryToken::And,
            "OR" => QueryToken::Or,
            "(" => QueryToken::LParen,
            ")" => QueryToken::RParen,
            term => QueryToken::Term(term.to_lowercase()),
        })
        .collect()
}

/// The distinct terms of a token stream, operators excluded.
///
/// A `BTreeSet` so downstream Z-score accumulation iterates in a fixed
/// order and ranked output is reproducible bit-for-bit.
pub fn query_terms(tokens: &[QueryToken]) -> BTreeSet<String> {
    tokens
        .iter()
        .filter_map(|token| match token {
            QueryToken::Term(t) => Some(t.clone()),
            _ => None,
        })
        .collect()
}

/// Shunting-yard: convert an infix token stream to reverse-polish order.
///
/// Fails with [`Error::MalformedQuery`] on unmatched parentheses.
pub fn to_postfix(tokens: Vec<QueryToken>) -> Result<Vec<QueryToken>, Error> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<QueryToken> = Vec::new();

    for token in tokens {
        match token {
            QueryToken::Term(_) => output.push(token),
            QueryToken::LParen => operators.push(token),
            QueryToken::RParen => loop {
                match operators.pop() {
                    Some(QueryToken::LParen) => break,
                    Some(op) => output.push(op),
                    None => {
                        return Err(Error::MalformedQuery(
                            "unmatched closing parenthesis".to_string(),
                        ));
                    }
                }
            },
            QueryToken::And | QueryToken::Or => {
                // Left associativity: pop operators of equal or higher
                // precedence before pushing this one.
                while let Some(top) = operators.last() {
                    if matches!(top, QueryToken::LParen) || top.precedence() < token.precedence() {
                        break;
                    }
                    if let Some(op) = operators.pop() {
                        output.push(op);
                    }
                }
                operators.push(token);
            }
        }
    }

    while let Some(op) = operators.pop() {
        if matches!(op, QueryToken::LParen) {
            return Err(Error::MalformedQuery(
                "unmatched opening parenthesis".to_string(),
            ));
        }
        output.push(op);
    }

    Ok(output)
}

/// Evaluate a postfix token stream against the trie, producing the set of
/// matching document ids.
///
/// The stream must reduce to exactly one operand; underflow or leftovers
/// fail with [`Error::MalformedQuery`]. Callers handle the zero-token
/// query before calling (it is an empty result, not an error).
pub fn evaluate(postfix: &[QueryToken], trie: &CompactTrie) -> Result<HashSet<DocId>, Error> {
    let mut operands: Vec<HashSet<DocId>> = Vec::new();

    for token in postfix {
        match token {
            QueryToken::Term(term) => {
                let docs: HashSet<DocId> = trie.lookup(term).iter().map(|p| p.doc).collect();
                operands.push(docs);
            }
            QueryToken::And | QueryToken::Or => {
                let (Some(b), Some(a)) = (operands.pop(), operands.pop()) else {
                    return Err(Error::MalformedQuery(format!(
                        "operator {} is missing an operand",
                        token
                    )));
                };
                let merged: HashSet<DocId> = match token {
                    QueryToken::And => a.intersection(&b).copied().collect(),
                    _ => a.union(&b).copied().collect(),
                };
                operands.push(merged);
            }
            QueryToken::LParen | QueryToken::RParen => {
                // to_postfix never emits these; seeing one means the caller
                // skipped the conversion.
                return Err(Error::MalformedQuery(
                    "parenthesis in postfix stream".to_string(),
                ));
            }
        }
    }

    let Some(result) = operands.pop() else {
        return Err(Error::MalformedQuery("empty expression".to_string()));
    };
    if !operands.is_empty() {
        return Err(Error::MalformedQuery(
            "query leaves dangling operands (missing operator?)".to_string(),
        ));
    }
    Ok(result)
}
