// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the talpa command-line interface.
//!
//! Three subcommands: `index` to build the artifact set from a corpus
//! directory, `search` to run boolean queries against it, and `inspect`
//! to summarize what is on disk. The library itself never touches the
//! filesystem layout of a corpus; all of that lives here in the wrapper.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "talpa",
    about = "Boolean full-text search over a compact radix trie",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a directory of .txt documents
    Index {
        /// Corpus directory, walked recursively for *.txt files
        #[arg(short, long)]
        corpus: String,

        /// Output directory for the three index artifacts
        #[arg(short, long)]
        output: String,

        /// Rebuild even when a complete, loadable artifact set exists
        #[arg(long)]
        force: bool,
    },

    /// Run a boolean query and print ranked results
    Search {
        /// Index directory (as produced by `talpa index`)
        #[arg(short, long)]
        index: String,

        /// Query string, e.g. "rust AND (cargo OR crate)"
        query: String,

        /// Maximum number of results to print
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show summary information about an index
    Inspect {
        /// Index directory
        #[arg(short, long)]
        index: String,
    },
}
