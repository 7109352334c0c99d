//! Stateful leaf collection and tree management.

use std::fmt;
use std::marker::PhantomData;

use tracing::*;

use crate::Sha256Hasher;
use crate::builder::TreeBuilder;
use crate::encoding::{from_hex, to_hex};
use crate::error::{EncodingError, MerkleError};
use crate::hasher::MerkleHasher;
use crate::leaves::LeafStore;
use crate::proof::MerkleProof;
use crate::tree::MerkleTree;

/// Collects leaves, builds a tree on demand and answers root and proof
/// queries against it.
///
/// Appending leaves drops the current tree, so [`is_ready`](Self::is_ready)
/// is `false` until [`make_tree`](Self::make_tree) is called again.
pub struct MerkleTools<MH: MerkleHasher = Sha256Hasher> {
    leaves: LeafStore<MH::Hash>,
    tree: Option<MerkleTree<MH::Hash>>,
    builder: TreeBuilder,
    _hasher: PhantomData<MH>,
}

impl<MH: MerkleHasher> fmt::Debug for MerkleTools<MH> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTools")
            .field("leaves", &self.leaves.len())
            .field("ready", &self.is_ready())
            .field("builder", &self.builder)
            .finish()
    }
}

impl<MH: MerkleHasher> Default for MerkleTools<MH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<MH: MerkleHasher> MerkleTools<MH> {
    /// Creates an empty instance with the default [`TreeBuilder`].
    pub fn new() -> Self {
        Self::with_builder(TreeBuilder::new())
    }

    /// Creates an empty instance that builds trees with `builder`.
    pub fn with_builder(builder: TreeBuilder) -> Self {
        Self {
            leaves: LeafStore::new(),
            tree: None,
            builder,
            _hasher: PhantomData,
        }
    }

    /// Drops all leaves and the built tree.
    pub fn reset(&mut self) {
        debug!("resetting merkle tools");
        self.leaves = LeafStore::new();
        self.tree = None;
    }

    /// Appends already-hashed leaves verbatim.
    pub fn add_leaf_digests(&mut self, leaves: impl IntoIterator<Item = MH::Hash>) {
        self.invalidate();
        self.leaves.extend_digests(leaves);
    }

    /// Hashes each raw value and appends the digests.
    pub fn add_leaf_values<V: AsRef<[u8]>>(&mut self, values: impl IntoIterator<Item = V>) {
        self.invalidate();
        self.leaves.extend_values::<MH, V>(values);
    }

    /// Decodes hex digests and appends them verbatim.
    ///
    /// On error no leaves are added, though the current tree is still
    /// dropped.
    pub fn add_leaf_hex<S: AsRef<str>>(
        &mut self,
        values: impl IntoIterator<Item = S>,
    ) -> Result<(), EncodingError> {
        self.invalidate();
        self.leaves.extend_hex(values)
    }

    fn invalidate(&mut self) {
        if self.tree.take().is_some() {
            debug!("leaves changed, dropping built tree");
        }
    }

    /// Returns the leaf at `index`, if present.
    pub fn leaf(&self, index: usize) -> Option<&MH::Hash> {
        self.leaves.get(index)
    }

    /// Returns the leaf at `index` as lowercase hex, if present.
    pub fn leaf_hex(&self, index: usize) -> Option<String> {
        self.leaf(index).map(to_hex)
    }

    /// Returns the number of leaves added so far.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Returns the leaf store.
    pub fn leaves(&self) -> &LeafStore<MH::Hash> {
        &self.leaves
    }

    /// Returns if a tree is built over the current leaves.
    pub fn is_ready(&self) -> bool {
        self.tree.is_some()
    }

    /// Builds a tree over a snapshot of the current leaves.
    ///
    /// Returns [`MerkleError::EmptyInput`] if no leaves were added, leaving
    /// the instance not ready.
    pub fn make_tree(&mut self) -> Result<&MerkleTree<MH::Hash>, MerkleError> {
        self.tree = None;
        let tree = self.builder.build::<MH>(self.leaves.snapshot())?;
        Ok(&*self.tree.insert(tree))
    }

    /// Returns the built tree, if any.
    pub fn tree(&self) -> Option<&MerkleTree<MH::Hash>> {
        self.tree.as_ref()
    }

    fn built_tree(&self) -> Result<&MerkleTree<MH::Hash>, MerkleError> {
        self.tree.as_ref().ok_or(MerkleError::TreeNotBuilt)
    }

    /// Returns the root of the built tree.
    pub fn root(&self) -> Result<&MH::Hash, MerkleError> {
        Ok(self.built_tree()?.root())
    }

    /// Returns the root of the built tree as lowercase hex.
    pub fn root_hex(&self) -> Result<String, MerkleError> {
        Ok(to_hex(self.root()?))
    }

    /// Generates an inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof<MH::Hash>, MerkleError> {
        self.built_tree()?.gen_proof(index)
    }

    /// Checks `proof` for `leaf` against `root`.  Doesn't need a built tree.
    pub fn validate_proof(
        &self,
        proof: &MerkleProof<MH::Hash>,
        leaf: &MH::Hash,
        root: &MH::Hash,
    ) -> bool {
        proof.verify_with_root::<MH>(root, leaf)
    }

    /// Like [`validate_proof`](Self::validate_proof) but with hex leaf and
    /// root.
    pub fn validate_proof_hex(
        &self,
        proof: &MerkleProof<MH::Hash>,
        leaf: &str,
        root: &str,
    ) -> Result<bool, EncodingError> {
        let leaf = from_hex(leaf)?;
        let root = from_hex(root)?;
        Ok(self.validate_proof(proof, &leaf, &root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_until_built() {
        let mut mt = MerkleTools::<Sha256Hasher>::new();
        assert!(!mt.is_ready());
        assert_eq!(mt.root(), Err(MerkleError::TreeNotBuilt));
        assert_eq!(mt.proof(0), Err(MerkleError::TreeNotBuilt));

        mt.add_leaf_values(["some string", "some other string"]);
        assert!(!mt.is_ready());
        assert_eq!(mt.root_hex(), Err(MerkleError::TreeNotBuilt));

        mt.make_tree().unwrap();
        assert!(mt.is_ready());
        assert!(mt.root().is_ok());
    }

    #[test]
    fn empty_build_fails() {
        let mut mt = MerkleTools::<Sha256Hasher>::new();
        assert_eq!(mt.make_tree().unwrap_err(), MerkleError::EmptyInput);
        assert!(!mt.is_ready());
        assert_eq!(mt.proof(0), Err(MerkleError::TreeNotBuilt));
    }

    #[test]
    fn append_invalidates_tree() {
        let mut mt = MerkleTools::<Sha256Hasher>::new();
        mt.add_leaf_values(["a", "b"]);
        let old_root = *mt.make_tree().unwrap().root();

        mt.add_leaf_values(["c"]);
        assert!(!mt.is_ready());
        assert_eq!(mt.proof(0), Err(MerkleError::TreeNotBuilt));

        let new_root = *mt.make_tree().unwrap().root();
        assert_ne!(old_root, new_root);
        assert_eq!(mt.tree().map(MerkleTree::num_leaves), Some(3));
    }

    #[test]
    fn get_proof_and_validate() {
        let mut mt = MerkleTools::<Sha256Hasher>::new();
        mt.add_leaf_values(["some string", "some other string"]);
        mt.make_tree().unwrap();

        let target = to_hex(&Sha256Hasher::hash(b"some string"));
        assert_eq!(mt.leaf_hex(0), Some(target.clone()));

        let proof = mt.proof(0).unwrap();
        let root = mt.root_hex().unwrap();
        assert_eq!(mt.validate_proof_hex(&proof, &target, &root), Ok(true));

        let other = to_hex(&Sha256Hasher::hash(b"some other string"));
        assert_eq!(mt.validate_proof_hex(&proof, &other, &root), Ok(false));
        assert_eq!(
            mt.validate_proof_hex(&proof, "xyz", &root),
            Err(EncodingError::OddLength)
        );
    }

    #[test]
    fn hex_and_digest_leaves() {
        let a = Sha256Hasher::hash(b"a");
        let b = Sha256Hasher::hash(b"b");

        let mut hexed = MerkleTools::<Sha256Hasher>::new();
        hexed.add_leaf_hex([to_hex(&a), to_hex(&b).to_uppercase()]).unwrap();
        hexed.make_tree().unwrap();

        let mut from_digests = MerkleTools::<Sha256Hasher>::new();
        from_digests.add_leaf_digests([a, b]);
        from_digests.make_tree().unwrap();

        let mut from_values = MerkleTools::<Sha256Hasher>::new();
        from_values.add_leaf_values([b"a", b"b"]);
        from_values.make_tree().unwrap();

        assert_eq!(hexed.root(), from_digests.root());
        assert_eq!(hexed.root(), from_values.root());
        assert_eq!(from_values.leaf(1), Some(&b));
        assert_eq!(from_values.leaf(2), None);
    }

    #[test]
    fn bad_hex_adds_nothing() {
        let mut mt = MerkleTools::<Sha256Hasher>::new();
        let err = mt.add_leaf_hex(["00"]).unwrap_err();
        assert_eq!(
            err,
            EncodingError::InvalidLength {
                expected: 32,
                actual: 1
            }
        );
        assert_eq!(mt.leaf_count(), 0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut mt = MerkleTools::<Sha256Hasher>::new();
        mt.add_leaf_values(["a"]);
        mt.make_tree().unwrap();
        mt.reset();
        assert_eq!(mt.leaf_count(), 0);
        assert!(!mt.is_ready());
        assert!(mt.leaves().is_empty());
    }

    #[test]
    fn custom_builder() {
        let builder = TreeBuilder::new().with_parallel_threshold(2);
        let mut mt = MerkleTools::<Sha256Hasher>::with_builder(builder);
        mt.add_leaf_values((0u32..33).map(|i| i.to_be_bytes()));
        let root = *mt.make_tree().unwrap().root();

        let mut plain = MerkleTools::<Sha256Hasher>::default();
        plain.add_leaf_values((0u32..33).map(|i| i.to_be_bytes()));
        assert_eq!(plain.make_tree().unwrap().root(), &root);
    }
}
