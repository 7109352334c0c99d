//! Subcommand implementations, written against generic readers and writers.

use std::io::{BufRead, Read, Write};

use anyhow::Context;
use merkletools_merkle::{
    Hash32, LeafStore, MerkleHasher, MerkleProof, MerkleTree, Sha256Hasher, TreeBuilder,
    from_hex, to_hex, verify_inclusion,
};
use serde::{Deserialize, Serialize};
use tracing::*;

/// Everything needed to check one leaf's inclusion without the tree.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct ProofDocument {
    pub(crate) index: usize,
    pub(crate) leaf: String,
    pub(crate) root: String,
    pub(crate) proof: MerkleProof<Hash32>,
}

/// Replacement for the leaf stored in a proof document.
#[derive(Debug, Clone)]
pub(crate) enum LeafOverride {
    /// Hex digest, taken verbatim.
    Hex(String),
    /// Raw value, hashed first.
    Value(String),
}

/// Reads one leaf per line.  Blank lines are skipped and trailing `\r` is
/// dropped so CRLF input behaves like LF input.
pub(crate) fn read_leaves<R: BufRead>(reader: R, hex: bool) -> anyhow::Result<LeafStore<Hash32>> {
    let mut store = LeafStore::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", n + 1))?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() {
            continue;
        }

        if hex {
            store
                .push_hex(line.trim())
                .with_context(|| format!("line {}: invalid leaf digest", n + 1))?;
        } else {
            store.push_value::<Sha256Hasher>(line);
        }
    }

    debug!(leaves = store.len(), hex, "read leaves");
    Ok(store)
}

pub(crate) fn build_tree(
    store: &LeafStore<Hash32>,
    builder: &TreeBuilder,
) -> anyhow::Result<MerkleTree<Hash32>> {
    builder
        .build::<Sha256Hasher>(store.snapshot())
        .context("building merkle tree")
}

pub(crate) fn write_root<W: Write>(tree: &MerkleTree<Hash32>, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "{}", to_hex(tree.root()))?;
    Ok(())
}

pub(crate) fn write_proof<W: Write>(
    tree: &MerkleTree<Hash32>,
    index: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    let proof = tree
        .gen_proof(index)
        .with_context(|| format!("generating proof for leaf {index}"))?;
    let doc = ProofDocument {
        index,
        leaf: to_hex(&tree.leaves()[index]),
        root: to_hex(tree.root()),
        proof,
    };
    info!(index, steps = doc.proof.len(), "generated proof");

    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

/// Verifies a proof document, optionally against a different leaf or root.
/// Prints and returns the result.
pub(crate) fn verify<R: Read, W: Write>(
    doc: R,
    leaf: Option<&LeafOverride>,
    root: Option<&str>,
    out: &mut W,
) -> anyhow::Result<bool> {
    let doc: ProofDocument = serde_json::from_reader(doc).context("parsing proof document")?;

    let leaf = match leaf {
        Some(LeafOverride::Hex(hex)) => from_hex(hex).context("invalid leaf digest")?,
        Some(LeafOverride::Value(raw)) => Sha256Hasher::hash(raw.as_bytes()),
        None => from_hex(&doc.leaf).context("invalid leaf digest in proof document")?,
    };
    let root: Hash32 = from_hex(root.unwrap_or(&doc.root)).context("invalid root digest")?;

    let ok = verify_inclusion::<Sha256Hasher>(&leaf, &doc.proof, &root);
    info!(index = doc.index, ok, "verified proof");

    writeln!(out, "{ok}")?;
    Ok(ok)
}

pub(crate) fn write_dump<W: Write>(tree: &MerkleTree<Hash32>, out: &mut W) -> anyhow::Result<()> {
    write!(out, "{}", tree.dump())?;
    Ok(())
}
