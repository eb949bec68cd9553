//! Compact radix trie mapping terms to inverted lists.
//!
//! Each node owns a label fragment; the concatenation of labels from the
//! root to a terminal node spells out a stored term. Terminal nodes carry
//! the term's posting list. Nodes with a shared prefix are merged, so space
//! grows with distinct characters, not with the sum of term lengths.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **SIBLING_KEYS_UNIQUE**: no two siblings share the first character of
//!    their labels; the child map is keyed by exactly that character.
//! 2. **LABELS_NON_EMPTY**: every node except the root has a non-empty
//!    label.
//! 3. **NO_REDUNDANT_CHAINS**: a non-terminal internal node has at least
//!    two children, otherwise it would have been merged into its child.
//! 4. **POSTINGS_UNIQUE_PER_DOC**: a `(term, doc)` pair appears at most
//!    once in a posting list. `insert` appends blindly; the indexer
//!    guarantees this by aggregating TF per document first.
//!
//! Children are kept in a `BTreeMap` keyed by first label character, which
//! makes the ascending-order serialization contract fall out of iteration
//! order for free.

use crate::error::Error;
use crate::types::{DocId, Posting};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

/// Artifact label used in corruption errors.
const ARTIFACT: &str = "trie";

/// A single node of the compact trie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieNode {
    /// Label fragment this node contributes to the path from its parent.
    /// Empty only at the root.
    label: String,
    /// Children keyed by the first character of their label.
    children: BTreeMap<char, TrieNode>,
    /// Whether a term ends at this node.
    terminal: bool,
    /// The term's inverted list; non-empty only if `terminal`.
    postings: Vec<Posting>,
}

impl TrieNode {
    fn with_label(label: String) -> Self {
        TrieNode {
            label,
            ..TrieNode::default()
        }
    }

    fn leaf(label: &str, doc: DocId, tf: u32) -> Self {
        TrieNode {
            label: label.to_string(),
            children: BTreeMap::new(),
            terminal: true,
            postings: vec![Posting { doc, tf }],
        }
    }
}

/// Compact radix trie: term → inverted list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactTrie {
    root: TrieNode,
}

/// Byte length of the longest common prefix of `a` and `b`, cut at a
/// character boundary of both.
fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

impl CompactTrie {
    pub fn new() -> Self {
        CompactTrie::default()
    }

    /// Insert one posting for `term`.
    ///
    /// Appends without deduplicating: inserting the same `(term, doc)`
    /// twice produces two postings. Aggregate TF per document before
    /// calling (the indexer does).
    ///
    /// `term` must be non-empty; inserting an empty term is a no-op in
    /// release builds and a panic under debug assertions.
    pub fn insert(&mut self, term: &str, doc: DocId, tf: u32) {
        debug_assert!(!term.is_empty(), "callers must not insert empty terms");
        let mut node = &mut self.root;
        let mut remaining = term;

        while let Some(first) = remaining.chars().next() {
            if !node.children.contains_key(&first) {
                // No path for this character: a fresh leaf takes the whole
                // remaining fragment.
                node.children.insert(first, TrieNode::leaf(remaining, doc, tf));
                return;
            }

            let lcp = common_prefix_len(remaining, &node.children[&first].label);
            let label_len = node.children[&first].label.len();

            if lcp == remaining.len() && lcp == label_len {
                // Exact match: the node becomes (or already is) terminal.
                if let Some(child) = node.children.get_mut(&first) {
                    child.terminal = true;
                    child.postings.push(Posting { doc, tf });
                }
                return;
            }

            if lcp == label_len {
                // The child label is a strict prefix of the term: descend
                // and keep consuming. This may repeat over several levels.
                remaining = &remaining[lcp..];
                match node.children.get_mut(&first) {
                    Some(child) => node = child,
                    None => return,
                }
                continue;
            }

            // The term ends inside the label or diverges from it. Take the
            // child out, trim it to its unshared suffix, and hang it under
            // a replacement node.
            let Some(mut old) = node.children.remove(&first) else {
                return;
            };

            if lcp == remaining.len() {
                // The term is a strict prefix of the label: the new node
                // spells the term and adopts the trimmed child.
                old.label.drain(..lcp);
                let old_key = first_label_char(&old);
                let mut new_node = TrieNode::leaf(remaining, doc, tf);
                new_node.children.insert(old_key, old);
                node.children.insert(first, new_node);
            } else {
                // True divergence: a non-terminal split node owns the
                // shared prefix, with the trimmed child and a new leaf
                // below it.
                let shared = old.label[..lcp].to_string();
                old.label.drain(..lcp);
                let old_key = first_label_char(&old);
                let mut split = TrieNode::with_label(shared);
                split.children.insert(old_key, old);
                let new_leaf = TrieNode::leaf(&remaining[lcp..], doc, tf);
                let leaf_key = first_label_char(&new_leaf);
                split.children.insert(leaf_key, new_leaf);
                node.children.insert(first, split);
            }
            return;
        }
    }

    /// Look up a term and return its inverted list, or an empty slice when
    /// the term is absent (including when it is only a prefix of a stored
    /// term, or lands on a non-terminal split node).
    pub fn lookup(&self, term: &str) -> &[Posting] {
        let mut node = &self.root;
        let mut remaining = term;

        while let Some(first) = remaining.chars().next() {
            let Some(child) = node.children.get(&first) else {
                return &[];
            };
            let lcp = common_prefix_len(remaining, &child.label);

            if lcp < child.label.len() {
                // The term ends inside the label or diverges: no node
                // spells it.
                return &[];
            }
            if lcp == remaining.len() {
                return if child.terminal { &child.postings } else { &[] };
            }
            node = child;
            remaining = &remaining[lcp..];
        }
        &[]
    }

    /// TF of `term` in `doc`, or 0 when the pair is absent.
    pub fn lookup_tf(&self, term: &str, doc: DocId) -> u32 {
        self.lookup(term)
            .iter()
            .find(|p| p.doc == doc)
            .map_or(0, |p| p.tf)
    }

    /// Number of distinct terms stored (terminal nodes).
    pub fn term_count(&self) -> usize {
        fn walk(node: &TrieNode) -> usize {
            usize::from(node.terminal) + node.children.values().map(walk).sum::<usize>()
        }
        walk(&self.root)
    }

    // =========================================================================
    // SERIALIZATION
    // =========================================================================
    //
    // One node per line, pre-order, children in ascending first-character
    // order:
    //
    //     label|terminal_flag|child_count|doc1,tf1;doc2,tf2;...
    //
    // The label is empty only on the first (root) line. Terms never contain
    // '|', ';', ',' or newlines, so no escaping is needed.

    /// Serialize the trie in pre-order, one node per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write_node(&self.root, &mut writer)
    }

    /// Rebuild a trie from its line serialization.
    ///
    /// Grammar violations (wrong field count, bad flag, non-numeric
    /// postings, mismatched child counts, trailing lines) surface as
    /// [`Error::Corrupt`]; read failures as [`Error::Io`].
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut lines = reader.lines();
        let mut line_no = 1usize;

        let Some(first_line) = lines.next() else {
            return Err(Error::corrupt(ARTIFACT, 1, "empty trie file"));
        };
        let (root, root_child_count) = parse_node_line(&first_line?, line_no, true)?;

        if root_child_count == 0 {
            if lines.next().is_some() {
                return Err(Error::corrupt(
                    ARTIFACT,
                    line_no + 1,
                    "trailing data after completed trie",
                ));
            }
            return Ok(CompactTrie { root });
        }

        // Reconstruction stack of (partially built node, children still
        // expected). A node is attached to its parent once its own subtree
        // is complete; popping the last stack slot completes the root.
        let mut stack: Vec<(TrieNode, usize)> = vec![(root, root_child_count)];
        let mut finished_root: Option<TrieNode> = None;

        for line in lines {
            line_no += 1;
            let line = line?;
            if finished_root.is_some() {
                return Err(Error::corrupt(
                    ARTIFACT,
                    line_no,
                    "trailing data after completed trie",
                ));
            }

            let (node, child_count) = parse_node_line(&line, line_no, false)?;
            if child_count > 0 {
                stack.push((node, child_count));
                continue;
            }

            // Leaf line: attach it, then unwind every parent this
            // completes.
            let mut completed = node;
            loop {
                let Some((parent, remaining)) = stack.last_mut() else {
                    return Err(Error::corrupt(ARTIFACT, line_no, "node without a parent"));
                };
                attach_child(parent, completed, line_no)?;
                *remaining -= 1;
                if *remaining > 0 {
                    break;
                }
                let Some((done, _)) = stack.pop() else {
                    break;
                };
                if stack.is_empty() {
                    finished_root = Some(done);
                    break;
                }
                completed = done;
            }
        }

        match finished_root {
            Some(root) => Ok(CompactTrie { root }),
            None => Err(Error::corrupt(
                ARTIFACT,
                line_no,
                "trie file ended before all declared children were read",
            )),
        }
    }

    /// Structural invariant check used by tests and debug assertions.
    ///
    /// Verifies non-empty labels outside the root, child keys matching the
    /// first label character, no single-child non-terminal internal nodes,
    /// and at most one posting per document within each list.
    pub fn check_well_formed(&self) -> bool {
        fn walk(node: &TrieNode, is_root: bool) -> bool {
            if !is_root && node.label.is_empty() {
                return false;
            }
            if !is_root && !node.terminal && node.children.len() <= 1 {
                return false;
            }
            if !node.terminal && !node.postings.is_empty() {
                return false;
            }
            let mut seen = std::collections::HashSet::new();
            for p in &node.postings {
                if !seen.insert(p.doc) {
                    return false;
                }
            }
            node.children.iter().all(|(key, child)| {
                child.label.starts_with(*key) && walk(child, false)
            })
        }
        walk(&self.root, true)
    }
}

fn first_label_char(node: &TrieNode) -> char {
    debug_assert!(!node.label.is_empty());
    node.label.chars().next().unwrap_or('\0')
}

fn write_node<W: Write>(node: &TrieNode, writer: &mut W) -> io::Result<()> {
    write!(
        writer,
        "{}|{}|{}|",
        node.label,
        u8::from(node.terminal),
        node.children.len()
    )?;
    for (i, posting) in node.postings.iter().enumerate() {
        if i > 0 {
            writer.write_all(b";")?;
        }
        write!(writer, "{},{}", posting.doc, posting.tf)?;
    }
    writer.write_all(b"\n")?;

    // BTreeMap iteration: ascending first character, as the format requires.
    for child in node.children.values() {
        write_node(child, writer)?;
    }
    Ok(())
}

fn parse_node_line(
    line: &str,
    line_no: usize,
    is_root: bool,
) -> Result<(TrieNode, usize), Error> {
    let mut fields = line.splitn(4, '|');
    let (Some(label), Some(flag), Some(count), Some(list)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(Error::corrupt(
            ARTIFACT,
            line_no,
            "expected 4 '|'-separated fields",
        ));
    };

    if !is_root && label.is_empty() {
        return Err(Error::corrupt(
            ARTIFACT,
            line_no,
            "empty label outside the root line",
        ));
    }

    let terminal = match flag {
        "0" => false,
        "1" => true,
        other => {
            return Err(Error::corrupt(
                ARTIFACT,
                line_no,
                format!("terminal flag must be 0 or 1, found {:?}", other),
            ));
        }
    };

    let child_count: usize = count.parse().map_err(|_| {
        Error::corrupt(
            ARTIFACT,
            line_no,
            format!("child count is not a number: {:?}", count),
        )
    })?;

    let mut postings = Vec::new();
    if !list.is_empty() {
        for item in list.split(';') {
            let Some((doc, tf)) = item.split_once(',') else {
                return Err(Error::corrupt(
                    ARTIFACT,
                    line_no,
                    format!("posting is not doc,tf: {:?}", item),
                ));
            };
            let doc: u32 = doc.parse().map_err(|_| {
                Error::corrupt(ARTIFACT, line_no, format!("bad doc id: {:?}", doc))
            })?;
            let tf: u32 = tf.parse().map_err(|_| {
                Error::corrupt(ARTIFACT, line_no, format!("bad term frequency: {:?}", tf))
            })?;
            postings.push(Posting {
                doc: DocId(doc),
                tf,
            });
        }
    }

    Ok((
        TrieNode {
            label: label.to_string(),
            children: BTreeMap::new(),
            terminal,
            postings,
        },
        child_count,
    ))
}

fn attach_child(parent: &mut TrieNode, child: TrieNode, line_no: usize) -> Result<(), Error> {
    let Some(key) = child.label.chars().next() else {
        return Err(Error::corrupt(ARTIFACT, line_no, "child with empty label"));
    };
    if parent.children.insert(key, child).is_some() {
        return Err(Error::corrupt(
            ARTIFACT,
            line_no,
            format!("sibling labels share the first character {:?}", key),
        ));
    }
    Ok(())
}
