//! Level-by-level tree construction.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::*;

use crate::error::MerkleError;
use crate::hasher::{MerkleHash, MerkleHasher};
use crate::tree::MerkleTree;

/// Default minimum level width for hashing a level on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 12;

/// Builds [`MerkleTree`]s from leaf digests.
///
/// Each round pairs `node[i]` with `node[i + 1]` for even `i` and hashes them
/// left operand first.  If the level is odd the last node is carried up
/// unchanged, without being duplicated or rehashed.
///
/// With the `parallel` feature, levels at least
/// [`parallel_threshold`](Self::parallel_threshold) wide are hashed on the
/// rayon pool.  A level is always finished before the next one starts, and
/// the result is identical to the sequential build.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TreeBuilder {
    parallel_threshold: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Sets the minimum level width hashed in parallel.
    ///
    /// Has no effect without the `parallel` feature.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns the minimum level width hashed in parallel.
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Builds a tree from leaf hashes.
    ///
    /// Takes ownership of (or copies) the leaves, so the caller's buffer can't
    /// affect the tree afterwards.  Returns [`MerkleError::EmptyInput`] if
    /// there are no leaves.
    pub fn build<MH>(
        &self,
        leaves: impl Into<Vec<MH::Hash>>,
    ) -> Result<MerkleTree<MH::Hash>, MerkleError>
    where
        MH: MerkleHasher,
    {
        let leaves = leaves.into();
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let num_leaves = leaves.len();
        let mut levels = Vec::with_capacity(level_count(num_leaves));
        levels.push(leaves);

        // Stop when the top level has one node, as that single node is the root.
        while let Some(cur) = levels.last().filter(|l| l.len() > 1) {
            let next = self.next_level::<MH>(cur);
            trace!(level = levels.len(), nodes = next.len(), "hashed level");
            levels.push(next);
        }

        debug!(num_leaves, num_levels = levels.len(), "built merkle tree");
        Ok(MerkleTree::from_levels(levels))
    }

    /// Computes the level above `level`.
    fn next_level<MH>(&self, level: &[MH::Hash]) -> Vec<MH::Hash>
    where
        MH: MerkleHasher,
    {
        let (pairs, carry) = split_carry(level);

        let mut next = self.hash_pairs::<MH>(pairs);
        next.extend(carry.copied());
        next
    }

    #[cfg(feature = "parallel")]
    fn hash_pairs<MH>(&self, pairs: &[MH::Hash]) -> Vec<MH::Hash>
    where
        MH: MerkleHasher,
    {
        if pairs.len() >= self.parallel_threshold {
            trace!(nodes = pairs.len(), "hashing level in parallel");
            let mut next = Vec::with_capacity(pairs.len() / 2 + 1);
            pairs
                .par_chunks_exact(2)
                .map(|p| MH::hash_node(p[0], p[1]))
                .collect_into_vec(&mut next);
            return next;
        }

        hash_pairs_seq::<MH>(pairs)
    }

    #[cfg(not(feature = "parallel"))]
    fn hash_pairs<MH>(&self, pairs: &[MH::Hash]) -> Vec<MH::Hash>
    where
        MH: MerkleHasher,
    {
        hash_pairs_seq::<MH>(pairs)
    }
}

/// Splits a level into its even-length pairing set and the odd carry node, if
/// any.
fn split_carry<H: MerkleHash>(level: &[H]) -> (&[H], Option<&H>) {
    match level.split_last() {
        Some((last, rest)) if level.len() % 2 == 1 => (rest, Some(last)),
        _ => (level, None),
    }
}

fn hash_pairs_seq<MH: MerkleHasher>(pairs: &[MH::Hash]) -> Vec<MH::Hash> {
    let mut next = Vec::with_capacity(pairs.len() / 2 + 1);
    next.extend(pairs.chunks_exact(2).map(|p| MH::hash_node(p[0], p[1])));
    next
}

/// Number of levels in a tree over `num_leaves` leaves, leaves and root
/// included.  This is `ceil(log2(n)) + 1` for `n >= 1`.
pub(crate) fn level_count(num_leaves: usize) -> usize {
    if num_leaves == 0 {
        return 0;
    }
    num_leaves.next_power_of_two().ilog2() as usize + 1
}
