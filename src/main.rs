// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! talpa CLI: build, query, and inspect radix-trie search indexes.
//!
//! ```bash
//! # Build an index from a directory of .txt files
//! talpa index --corpus ./bbc --output ./idx
//!
//! # Boolean search with Z-score ranking
//! talpa search --index ./idx "economy AND (growth OR trade)"
//!
//! # What is in there?
//! talpa inspect --index ./idx
//! ```
//!
//! The corpus walk, progress reporting, and exit-code mapping all live
//! here; the library underneath only ever sees `(external_id, text)`
//! pairs and returns errors as values.

use clap::Parser;
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use talpa::persist::{artifacts_present, ARTIFACT_FILES};
use talpa::{search, Error, Index, IndexBuilder};

mod cli;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Index {
            corpus,
            output,
            force,
        } => run_index(Path::new(&corpus), Path::new(&output), force),
        Commands::Search {
            index,
            query,
            limit,
        } => run_search(Path::new(&index), &query, limit),
        Commands::Inspect { index } => run_inspect(Path::new(&index)),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        // Malformed queries are the user's typo, not our failure.
        let code = match e {
            Error::MalformedQuery(_) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

/// Create a progress style for the indexing progress bar.
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━╸")
}

fn run_index(corpus: &Path, output: &Path, force: bool) -> Result<(), Error> {
    // Reuse an existing artifact set unless told otherwise.
    if !force && artifacts_present(output) {
        if let Ok(existing) = Index::load(output) {
            eprintln!(
                "✅ Index already present: {} documents │ {} terms (use --force to rebuild)",
                existing.total_docs(),
                existing.term_count()
            );
            return Ok(());
        }
        eprintln!("⚠️  Existing index is unreadable; rebuilding");
    }

    let files = collect_corpus_files(corpus)?;
    if files.is_empty() {
        eprintln!("⚠️  No .txt documents under {}; skipping build", corpus.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(create_progress_style());
    pb.set_prefix("Indexing");

    let mut builder = IndexBuilder::new();
    let mut skipped = 0usize;
    for path in &files {
        let external_id = path
            .strip_prefix(corpus)
            .unwrap_or(path)
            .display()
            .to_string();
        pb.set_message(external_id.clone());
        match fs::read_to_string(path) {
            Ok(text) => {
                builder.add_document(&external_id, &text);
            }
            Err(e) => {
                // One unreadable file should not sink the whole build.
                pb.suspend(|| eprintln!("⚠️  Skipping {}: {}", path.display(), e));
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("read {} documents", builder.doc_count()));

    let index = builder.seal();
    index.save(output)?;

    eprintln!(
        "✅ Build complete: {} documents │ {} terms → {}",
        index.total_docs(),
        index.term_count(),
        output.display()
    );
    if skipped > 0 {
        eprintln!("   ({} unreadable files skipped)", skipped);
    }
    Ok(())
}

/// Walk the corpus directory for `*.txt` files, sorted so DocId
/// assignment is reproducible across platforms and filesystems.
fn collect_corpus_files(corpus: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    // The corpus is plain data, not a source tree: no gitignore semantics.
    let walker = WalkBuilder::new(corpus).standard_filters(false).build();
    for entry in walker {
        let entry = entry.map_err(|e| Error::Io(io::Error::other(e)))?;
        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && entry.path().extension().is_some_and(|ext| ext == "txt") {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn run_search(index_dir: &Path, query: &str, limit: usize) -> Result<(), Error> {
    let index = Index::load(index_dir)?;
    let hits = search(&index, query)?;

    if hits.is_empty() {
        println!("no results for {:?}", query);
        return Ok(());
    }

    println!(
        "{} result{} for {:?}",
        hits.len(),
        if hits.len() == 1 { "" } else { "s" },
        query
    );
    for (rank, doc) in hits.iter().take(limit).enumerate() {
        let path = index.resolve(*doc).unwrap_or("<unknown document>");
        println!("{:>3}. [doc {}] {}", rank + 1, doc, path);
    }
    if hits.len() > limit {
        println!("    … and {} more (raise --limit to see them)", hits.len() - limit);
    }
    Ok(())
}

fn run_inspect(index_dir: &Path) -> Result<(), Error> {
    let index = Index::load(index_dir)?;

    println!("index at {}", index_dir.display());
    println!("  documents: {}", index.total_docs());
    println!("  terms:     {}", index.term_count());
    for name in ARTIFACT_FILES {
        let size = fs::metadata(index_dir.join(name)).map(|m| m.len()).unwrap_or(0);
        println!("  {:<16} {}", name, format_bytes(size as usize));
    }
    Ok(())
}

fn format_bytes(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
