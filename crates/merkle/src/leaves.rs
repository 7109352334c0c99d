//! Append-only leaf storage.

use crate::encoding::from_hex;
use crate::error::EncodingError;
use crate::hasher::{MerkleHash, MerkleHasher};

/// Ordered, append-only sequence of leaf digests.
///
/// A tree is built from a [`snapshot`](Self::snapshot) of the store, never
/// from the store itself, so appending after a build leaves the built tree
/// stale but intact.  Rebuild to bring them back in sync.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeafStore<H: MerkleHash> {
    leaves: Vec<H>,
}

impl<H: MerkleHash> Default for LeafStore<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: MerkleHash> LeafStore<H> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self { leaves: Vec::new() }
    }

    /// Appends an already-hashed leaf verbatim.
    pub fn push_digest(&mut self, leaf: H) {
        self.leaves.push(leaf);
    }

    /// Appends already-hashed leaves verbatim.
    pub fn extend_digests(&mut self, leaves: impl IntoIterator<Item = H>) {
        self.leaves.extend(leaves);
    }

    /// Hashes a raw value with `MH` and appends the digest.
    pub fn push_value<MH>(&mut self, value: impl AsRef<[u8]>)
    where
        MH: MerkleHasher<Hash = H>,
    {
        self.leaves.push(MH::hash(value.as_ref()));
    }

    /// Hashes each raw value with `MH` and appends the digests in order.
    pub fn extend_values<MH, V>(&mut self, values: impl IntoIterator<Item = V>)
    where
        MH: MerkleHasher<Hash = H>,
        V: AsRef<[u8]>,
    {
        self.leaves
            .extend(values.into_iter().map(|v| MH::hash(v.as_ref())));
    }

    /// Decodes a hex digest and appends it verbatim.
    pub fn push_hex(&mut self, s: &str) -> Result<(), EncodingError> {
        self.leaves.push(from_hex(s)?);
        Ok(())
    }

    /// Decodes hex digests and appends them in order.
    ///
    /// All-or-nothing: if any entry fails to decode the store is unchanged.
    pub fn extend_hex<S: AsRef<str>>(
        &mut self,
        values: impl IntoIterator<Item = S>,
    ) -> Result<(), EncodingError> {
        let decoded = values
            .into_iter()
            .map(|s| from_hex(s.as_ref()))
            .collect::<Result<Vec<H>, _>>()?;
        self.leaves.extend(decoded);
        Ok(())
    }

    /// Returns the leaf at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&H> {
        self.leaves.get(index)
    }

    /// Returns the number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns if there are no leaves.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Returns the leaves in insertion order.
    pub fn as_slice(&self) -> &[H] {
        &self.leaves
    }

    /// Returns an owned copy of the current leaves, suitable for building.
    pub fn snapshot(&self) -> Vec<H> {
        self.leaves.clone()
    }
}

impl<H: MerkleHash> Extend<H> for LeafStore<H> {
    fn extend<I: IntoIterator<Item = H>>(&mut self, iter: I) {
        self.extend_digests(iter);
    }
}

impl<H: MerkleHash> FromIterator<H> for LeafStore<H> {
    fn from_iter<I: IntoIterator<Item = H>>(iter: I) -> Self {
        Self {
            leaves: iter.into_iter().collect(),
        }
    }
}
