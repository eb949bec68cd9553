// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! On-disk representation of a sealed index.
//!
//! Three artifacts live side by side in the index directory:
//!
//! | file              | format                                    |
//! |-------------------|-------------------------------------------|
//! | `index.trie`      | pre-order line serialization of the trie  |
//! | `doc_map.json`    | JSON object, stringified doc id → path    |
//! | `term_stats.json` | JSON object, term → `{mu, sigma, df}`     |
//!
//! Writes are atomic enough that a reader never observes a partial
//! artifact set: everything goes to `*.tmp` twins first and is renamed
//! only after all three temporaries are complete. Any failure along the
//! way removes temporaries and finals both, leaving "no index" rather
//! than "half an index"; the caller reindexes.
//!
//! Terms never contain `|`, `;`, `,` or newlines (the tokenizer's
//! character class forbids them), so the trie's line format needs no
//! escaping.

use crate::error::Error;
use crate::index::Index;
use crate::trie::CompactTrie;
use crate::types::{DocId, DocMap, StatsMap};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Trie artifact file name.
pub const TRIE_FILE: &str = "index.trie";
/// Doc-id map artifact file name.
pub const DOC_MAP_FILE: &str = "doc_map.json";
/// Per-term statistics artifact file name.
pub const STATS_FILE: &str = "term_stats.json";

/// All three artifact file names, in write/rename order.
pub const ARTIFACT_FILES: [&str; 3] = [TRIE_FILE, DOC_MAP_FILE, STATS_FILE];

fn temp_twin(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// True when every artifact file exists in `dir`.
///
/// Presence only; a corrupt artifact still fails at
/// [`load_index`] time.
pub fn artifacts_present(dir: &Path) -> bool {
    ARTIFACT_FILES.iter().all(|name| dir.join(name).is_file())
}

/// Persist all three artifacts into `dir`, creating it if needed.
///
/// On any failure the directory is swept clean of temporaries and final
/// artifacts alike, so a later [`artifacts_present`] check reports the
/// truth.
pub fn save_index(index: &Index, dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir)?;

    let result = write_and_rename(index, dir);
    if result.is_err() {
        for name in ARTIFACT_FILES {
            let final_path = dir.join(name);
            let _ = fs::remove_file(temp_twin(&final_path));
            let _ = fs::remove_file(final_path);
        }
    }
    result
}

fn write_and_rename(index: &Index, dir: &Path) -> Result<(), Error> {
    // 1. Write every artifact to its temporary twin.
    write_trie(index.trie(), &temp_twin(&dir.join(TRIE_FILE)))?;
    write_json(&stringify_doc_keys(index.doc_map()), &temp_twin(&dir.join(DOC_MAP_FILE)))?;
    write_json(index.stats(), &temp_twin(&dir.join(STATS_FILE)))?;

    // 2. Only now move the temporaries into place.
    for name in ARTIFACT_FILES {
        let final_path = dir.join(name);
        fs::rename(temp_twin(&final_path), final_path)?;
    }
    Ok(())
}

/// Load a sealed index from `dir`.
///
/// Missing or unreadable files are [`Error::Io`]; grammar violations in
/// any artifact are [`Error::Corrupt`]. Either way the caller should
/// treat the index as not loaded and rebuild.
pub fn load_index(dir: &Path) -> Result<Index, Error> {
    let trie_file = File::open(dir.join(TRIE_FILE))?;
    let trie = CompactTrie::read_from(BufReader::new(trie_file))?;

    let raw_map: BTreeMap<String, String> = read_json(&dir.join(DOC_MAP_FILE), DOC_MAP_FILE)?;
    let doc_map = parse_doc_keys(raw_map)?;

    let stats: StatsMap = read_json(&dir.join(STATS_FILE), STATS_FILE)?;

    Ok(Index::from_parts(trie, stats, doc_map))
}

fn write_trie(trie: &CompactTrie, path: &Path) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    trie.write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| Error::Io(io::Error::other(e)))?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, artifact: &'static str) -> Result<T, Error> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| json_read_error(artifact, e))
}

/// JSON object keys must be strings; doc ids round-trip through decimal.
fn stringify_doc_keys(doc_map: &DocMap) -> BTreeMap<String, &String> {
    doc_map
        .iter()
        .map(|(doc, path)| (doc.to_string(), path))
        .collect()
}

fn parse_doc_keys(raw: BTreeMap<String, String>) -> Result<DocMap, Error> {
    let mut doc_map = DocMap::new();
    for (key, path) in raw {
        let id: u32 = key.parse().map_err(|_| Error::Corrupt {
            artifact: DOC_MAP_FILE,
            line: None,
            reason: format!("doc id key is not a number: {:?}", key),
        })?;
        doc_map.insert(DocId(id), path);
    }
    Ok(doc_map)
}

fn json_read_error(artifact: &'static str, e: serde_json::Error) -> Error {
    match e.classify() {
        serde_json::error::Category::Io => Error::Io(io::Error::other(e)),
        _ => Error::Corrupt {
            artifact,
            line: Some(e.line()).filter(|&l| l > 0),
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index_documents;
    use crate::search::search;

    fn small_index() -> Index {
        index_documents(vec![
            ("a/first.txt".to_string(), "carro carga".to_string()),
            ("b/second.txt".to_string(), "carro carro motor".to_string()),
        ])
    }

    #[test]
    fn save_then_load_roundtrips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let index = small_index();
        save_index(&index, dir.path()).unwrap();
        assert!(artifacts_present(dir.path()));

        let loaded = load_index(dir.path()).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.resolve(DocId(2)), Some("b/second.txt"));
        assert_eq!(
            search(&loaded, "carro").unwrap(),
            search(&index, "carro").unwrap()
        );
    }

    #[test]
    fn no_temporaries_survive_a_successful_save() {
        let dir = tempfile::tempdir().unwrap();
        save_index(&small_index(), dir.path()).unwrap();
        for name in ARTIFACT_FILES {
            assert!(!temp_twin(&dir.path().join(name)).exists());
        }
    }

    #[test]
    fn load_from_empty_dir_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_index(dir.path()), Err(Error::Io(_))));
        assert!(!artifacts_present(dir.path()));
    }

    #[test]
    fn truncated_trie_artifact_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        save_index(&small_index(), dir.path()).unwrap();

        // Chop the trie mid-structure: keep the root line only.
        let trie_path = dir.path().join(TRIE_FILE);
        let text = fs::read_to_string(&trie_path).unwrap();
        let first_line = text.lines().next().unwrap();
        fs::write(&trie_path, format!("{}\n", first_line)).unwrap();

        assert!(matches!(
            load_index(dir.path()),
            Err(Error::Corrupt { artifact: "trie", .. })
        ));
    }

    #[test]
    fn mangled_stats_json_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        save_index(&small_index(), dir.path()).unwrap();
        fs::write(dir.path().join(STATS_FILE), "{ not json").unwrap();

        assert!(matches!(
            load_index(dir.path()),
            Err(Error::Corrupt {
                artifact: STATS_FILE,
                ..
            })
        ));
    }

    #[test]
    fn non_numeric_doc_map_key_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        save_index(&small_index(), dir.path()).unwrap();
        fs::write(
            dir.path().join(DOC_MAP_FILE),
            "{\"one\": \"a/first.txt\"}",
        )
        .unwrap();

        assert!(matches!(
            load_index(dir.path()),
            Err(Error::Corrupt {
                artifact: DOC_MAP_FILE,
                ..
            })
        ));
    }
}
