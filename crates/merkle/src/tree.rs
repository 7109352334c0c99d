//! Binary Merkle tree over an arbitrary number of leaves.
//!
//! Construct from leaves, generate inclusion proofs, and verify those proofs.
//! Odd levels carry their last node up unchanged, so the tree is unbalanced
//! towards the left rather than padded.
use std::fmt;

use crate::builder::TreeBuilder;
use crate::encoding::to_hex_upper;
use crate::error::MerkleError;
use crate::hasher::{MerkleHash, MerkleHasher};
use crate::proof::{MerkleProof, ProofStep, Side};

/// Immutable binary Merkle tree, stored level by level.
///
/// `levels()[0]` is the leaf row and the last level holds only the root.
/// Each level has `ceil(len / 2)` nodes of the level below it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MerkleTree<H: MerkleHash> {
    levels: Vec<Vec<H>>,
}

impl<H: MerkleHash> MerkleTree<H> {
    /// Wraps levels produced by [`TreeBuilder`].
    pub(crate) fn from_levels(levels: Vec<Vec<H>>) -> Self {
        debug_assert!(levels.last().is_some_and(|l| l.len() == 1));
        Self { levels }
    }

    /// Builds a tree from leaf hashes with the default [`TreeBuilder`].
    ///
    /// Returns [`MerkleError::EmptyInput`] if there are no leaves.
    pub fn from_leaves<MH>(leaves: impl Into<Vec<H>>) -> Result<Self, MerkleError>
    where
        MH: MerkleHasher<Hash = H>,
    {
        TreeBuilder::new().build::<MH>(leaves)
    }

    /// Returns all levels, leaves first.
    pub fn levels(&self) -> &[Vec<H>] {
        &self.levels
    }

    /// Returns the level at `i`, where 0 is the leaf row.
    pub fn level(&self, i: usize) -> Option<&[H]> {
        self.levels.get(i).map(Vec::as_slice)
    }

    /// Returns the number of leaves in the tree.
    pub fn num_leaves(&self) -> usize {
        self.levels[0].len()
    }

    /// Returns a slice of the leaf nodes.
    pub fn leaves(&self) -> &[H] {
        &self.levels[0]
    }

    /// Returns the number of levels, leaves and root included.
    ///
    /// This is `ceil(log2(num_leaves)) + 1`.
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Returns the tree root.
    ///
    /// For a single-leaf tree this is the leaf itself.
    pub fn root(&self) -> &H {
        &self.levels[self.levels.len() - 1][0]
    }

    /// Generates an inclusion proof for the leaf at `index`.
    ///
    /// Steps are ordered from the leaf level up.  A node carried up from an
    /// odd level has no sibling there and contributes no step.
    pub fn gen_proof(&self, index: usize) -> Result<MerkleProof<H>, MerkleError> {
        let leaf_count = self.num_leaves();
        if index >= leaf_count {
            return Err(MerkleError::IndexOutOfRange { index, leaf_count });
        }

        let mut idx = index;
        let mut steps = Vec::with_capacity(self.height() - 1);

        // The root level has nothing to contribute.
        for level in &self.levels[..self.levels.len() - 1] {
            let len = level.len();
            let is_carry = idx == len - 1 && len % 2 == 1;
            if !is_carry {
                let step = if idx % 2 == 1 {
                    ProofStep::new(level[idx - 1], Side::Left)
                } else {
                    ProofStep::new(level[idx + 1], Side::Right)
                };
                steps.push(step);
            }

            idx /= 2;
        }

        Ok(MerkleProof::from_steps(steps))
    }

    /// Verifies a `proof` for `leaf` against this tree's root.
    pub fn verify_proof<MH>(&self, proof: &MerkleProof<H>, leaf: &H) -> bool
    where
        MH: MerkleHasher<Hash = H>,
    {
        proof.verify_with_root::<MH>(self.root(), leaf)
    }

    /// Returns a [`Display`](fmt::Display) dump of every level, leaves first.
    pub fn dump(&self) -> TreeDump<'_, H> {
        TreeDump { tree: self }
    }
}

/// Diagnostic rendering of a [`MerkleTree`].
///
/// Prints each level number and node count, then one tab-indented uppercase
/// hex digest per node.
#[derive(Debug)]
pub struct TreeDump<'t, H: MerkleHash> {
    tree: &'t MerkleTree<H>,
}

impl<H: MerkleHash> fmt::Display for TreeDump<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, level) in self.tree.levels().iter().enumerate() {
            writeln!(f, "{i} ({} nodes)", level.len())?;
            for node in level {
                writeln!(f, "\t{}", to_hex_upper(node))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::MerkleTree;
    use crate::proof::{MerkleProof, ProofStep, Side};
    use crate::{MerkleError, MerkleHasher, Sha256Hasher};

    type H = [u8; 32];
    type MH = Sha256Hasher;

    fn make_leaves(n: usize) -> Vec<H> {
        (0..n).map(|i| MH::hash(&i.to_be_bytes())).collect()
    }

    #[test]
    fn empty_tree_rejected() {
        let err = MerkleTree::from_leaves::<MH>(&[][..]).unwrap_err();
        assert_eq!(err, MerkleError::EmptyInput);
    }

    #[test]
    fn test_nodes() {
        let a = MH::hash(&[1]);
        let b = MH::hash(&[2]);
        let c = MH::hash(&[3]);
        let d = MH::hash(&[4]);
        let ab = MH::hash_node(a, b);
        let cd = MH::hash_node(c, d);
        let abcd = MH::hash_node(ab, cd);

        let tree = MerkleTree::from_leaves::<MH>(vec![a, b, c, d]).unwrap();
        assert_eq!(tree.levels, vec![vec![a, b, c, d], vec![ab, cd], vec![abcd]]);
    }

    #[test]
    fn single_leaf_tree() {
        let leaf = [1u8; 32];
        let tree: MerkleTree<H> = MerkleTree::from_leaves::<MH>(vec![leaf]).unwrap();
        assert_eq!(tree.root(), &leaf);
        assert_eq!(tree.num_leaves(), 1);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.leaves(), &[leaf]);

        let proof: MerkleProof<H> = tree.gen_proof(0).expect("proof exists");
        assert!(proof.is_empty());
        assert!(tree.verify_proof::<MH>(&proof, &leaf));
        assert!(!tree.verify_proof::<MH>(&proof, &[2u8; 32]));
    }

    #[test]
    fn three_leaves_carry() {
        let l = make_leaves(3);
        let ab = MH::hash_node(l[0], l[1]);
        let root = MH::hash_node(ab, l[2]);
        let tree = MerkleTree::from_leaves::<MH>(l.clone()).unwrap();

        assert_eq!(tree.level(1), Some(&[ab, l[2]][..]));
        assert_eq!(tree.root(), &root);

        let p0 = tree.gen_proof(0).unwrap();
        assert_eq!(
            p0.steps(),
            &[
                ProofStep::new(l[1], Side::Right),
                ProofStep::new(l[2], Side::Right)
            ]
        );

        let p1 = tree.gen_proof(1).unwrap();
        assert_eq!(
            p1.steps(),
            &[
                ProofStep::new(l[0], Side::Left),
                ProofStep::new(l[2], Side::Right)
            ]
        );

        // The carry node skips the leaf level entirely.
        let p2 = tree.gen_proof(2).unwrap();
        assert_eq!(p2.steps(), &[ProofStep::new(ab, Side::Left)]);
    }

    #[test]
    fn build_and_verify() {
        let num_leaves = 4;
        let leaves = make_leaves(num_leaves);
        let tree: MerkleTree<H> = MerkleTree::from_leaves::<MH>(leaves.clone()).unwrap();
        assert_eq!(tree.leaves().to_vec(), leaves.clone());
        assert_eq!(tree.num_leaves(), num_leaves);

        for (i, leaf) in leaves.iter().enumerate() {
            let proof: MerkleProof<H> = tree.gen_proof(i).unwrap();
            assert!(tree.verify_proof::<MH>(&proof, leaf));
        }
    }

    #[test]
    fn index_out_of_range() {
        let tree = MerkleTree::from_leaves::<MH>(make_leaves(5)).unwrap();
        assert_eq!(
            tree.gen_proof(5).unwrap_err(),
            MerkleError::IndexOutOfRange {
                index: 5,
                leaf_count: 5
            }
        );
        assert!(tree.gen_proof(4).is_ok());
    }

    #[test]
    fn level_lookup() {
        let tree = MerkleTree::from_leaves::<MH>(make_leaves(6)).unwrap();
        assert_eq!(tree.level(0).map(<[H]>::len), Some(6));
        assert_eq!(tree.level(1).map(<[H]>::len), Some(3));
        assert_eq!(tree.level(2).map(<[H]>::len), Some(2));
        assert_eq!(tree.level(3).map(<[H]>::len), Some(1));
        assert_eq!(tree.level(4), None);
    }

    #[test]
    fn dump_lists_levels() {
        let leaves = vec![[0xab; 32], [0xcd; 32]];
        let tree = MerkleTree::from_leaves::<MH>(leaves).unwrap();
        let out = tree.dump().to_string();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "0 (2 nodes)");
        assert_eq!(lines[1], format!("\t{}", "AB".repeat(32)));
        assert_eq!(lines[2], format!("\t{}", "CD".repeat(32)));
        assert_eq!(lines[3], "1 (1 nodes)");
        assert!(lines[4].starts_with('\t'));
    }

    proptest! {
        #[test]
        fn every_leaf_verifies(n in 1usize..200) {
            let leaves = make_leaves(n);
            let tree = MerkleTree::from_leaves::<MH>(leaves.clone()).unwrap();
            for (i, leaf) in leaves.iter().enumerate() {
                let proof = tree.gen_proof(i).unwrap();
                prop_assert!(proof.len() < tree.height());
                prop_assert!(tree.verify_proof::<MH>(&proof, leaf));
            }
        }

        #[test]
        fn level_sizes_halve(n in 1usize..500) {
            let tree = MerkleTree::from_leaves::<MH>(make_leaves(n)).unwrap();
            let expected_height = n.next_power_of_two().trailing_zeros() as usize + 1;
            prop_assert_eq!(tree.height(), expected_height);
            for w in tree.levels().windows(2) {
                prop_assert_eq!(w[1].len(), w[0].len().div_ceil(2));
            }
            prop_assert_eq!(tree.levels().last().map(Vec::len), Some(1));
        }

        #[test]
        fn rebuild_is_deterministic(n in 1usize..100) {
            let leaves = make_leaves(n);
            let a = MerkleTree::from_leaves::<MH>(leaves.clone()).unwrap();
            let b = MerkleTree::from_leaves::<MH>(leaves).unwrap();
            prop_assert_eq!(a.root(), b.root());
        }
    }
}
