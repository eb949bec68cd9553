// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error values surfaced by the library.
//!
//! Everything is a value returned to the caller. The library never logs,
//! never panics on well-formed input, and never terminates the process;
//! wrappers decide how errors map to exit codes or HTTP statuses.

use std::fmt;
use std::io;

/// Everything that can go wrong while building, loading, or querying an
/// index.
#[derive(Debug)]
pub enum Error {
    /// The persistence layer could not read or write a required artifact.
    /// An index with an unreadable artifact is treated as "not loaded".
    Io(io::Error),
    /// A persisted artifact violates its grammar (bad trie line, mismatched
    /// child counts, unparsable JSON). The index is unusable; reindex.
    Corrupt {
        /// Artifact file name, e.g. `index.trie`.
        artifact: &'static str,
        /// 1-based line number where the violation was detected, if the
        /// artifact is line-oriented.
        line: Option<usize>,
        reason: String,
    },
    /// The query text itself is invalid: unmatched parentheses, operator
    /// underflow, or leftover operands. Only the offending query is
    /// affected; the index stays usable.
    MalformedQuery(String),
}

impl Error {
    pub(crate) fn corrupt(artifact: &'static str, line: usize, reason: impl Into<String>) -> Self {
        Error::Corrupt {
            artifact,
            line: Some(line),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "index artifact I/O failure: {}", e),
            Error::Corrupt {
                artifact,
                line: Some(line),
                reason,
            } => {
                write!(f, "corrupt {} at line {}: {}", artifact, line, reason)
            }
            Error::Corrupt {
                artifact,
                line: None,
                reason,
            } => write!(f, "corrupt {}: {}", artifact, reason),
            Error::MalformedQuery(reason) => write!(f, "malformed query: {}", reason),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_display_includes_artifact_and_line() {
        let e = Error::corrupt("index.trie", 3, "expected 4 fields, found 2");
        assert_eq!(
            e.to_string(),
            "corrupt index.trie at line 3: expected 4 fields, found 2"
        );
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error as _;
        let e = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(e.source().is_some());
    }
}
