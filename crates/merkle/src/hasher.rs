//! Hashing primitives for the tree: digest types and hashing strategies.
use std::fmt::Debug;

use digest::Digest;

/// Digest type stored in tree levels and proofs.
///
/// Implementors are plain values compared byte-wise, so a copy taken at
/// ingestion can never be changed by later mutation of the caller's data.
pub trait MerkleHash: Copy + Clone + Debug + Eq + Send + Sync + 'static {
    /// Length of the hash in bytes.
    const HASH_LEN: usize;

    /// Returns a zero hash.
    fn zero() -> Self;

    /// Returns the raw digest bytes.
    fn as_bytes(&self) -> &[u8];

    /// Copies a digest out of a slice, or `None` if the length is not
    /// [`Self::HASH_LEN`].
    fn try_from_slice(buf: &[u8]) -> Option<Self>;

    /// Checks if two hashes are equal, attempting to do it in constant time.
    fn eq_ct(a: &Self, b: &Self) -> bool;

    /// Returns if a hash is the zero hash.
    fn is_zero(h: &Self) -> bool {
        Self::eq_ct(h, &Self::zero())
    }
}

impl<const LEN: usize> MerkleHash for [u8; LEN] {
    const HASH_LEN: usize = LEN;

    fn zero() -> Self {
        [0; LEN]
    }

    fn as_bytes(&self) -> &[u8] {
        self
    }

    fn try_from_slice(buf: &[u8]) -> Option<Self> {
        buf.try_into().ok()
    }

    fn eq_ct(a: &Self, b: &Self) -> bool {
        // Fold every byte so the loop never exits early on the first mismatch.
        let mut acc: u8 = 0;
        for i in 0..LEN {
            acc |= a[i] ^ b[i];
        }

        acc == 0
    }
}

/// Hash function plugged into tree construction and proof verification.
pub trait MerkleHasher {
    /// Hash value.
    type Hash: MerkleHash;

    /// Hashes an arbitrary byte string.  Used for raw leaf values.
    fn hash(buf: &[u8]) -> Self::Hash;

    /// Hashes a node's left and right children to compute the node's hash.
    ///
    /// This is `hash(left || right)`, left operand first.  Implementations
    /// may override it to avoid the intermediate buffer but must not change
    /// the result.
    fn hash_node(left: Self::Hash, right: Self::Hash) -> Self::Hash {
        let len = <Self::Hash as MerkleHash>::HASH_LEN;
        let mut buf = Vec::with_capacity(2 * len);
        buf.extend_from_slice(left.as_bytes());
        buf.extend_from_slice(right.as_bytes());
        Self::hash(&buf)
    }

    /// Convenience function that returns a zero hash from the associated hash
    /// type.
    fn zero_hash() -> Self::Hash {
        <Self::Hash as MerkleHash>::zero()
    }
}

/// Merkle hasher for an arbitrary [`Digest`] impl, producing `[u8; N]`.
///
/// Nodes are hashed as `H(left || right)` with no leaf/node prefixes, which
/// keeps roots interoperable with other plain binary Merkle trees.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DigestMerkleHasher<D: Digest, const N: usize>(std::marker::PhantomData<D>);

impl<D: Digest, const N: usize> std::fmt::Debug for DigestMerkleHasher<D, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DigestMerkleHasher<{N}>")
    }
}

impl<D: Digest, const N: usize> MerkleHasher for DigestMerkleHasher<D, N> {
    type Hash = [u8; N];

    fn hash(buf: &[u8]) -> Self::Hash {
        let result = D::digest(buf);
        result
            .as_slice()
            .try_into()
            .expect("digest output length mismatch")
    }

    fn hash_node(left: Self::Hash, right: Self::Hash) -> Self::Hash {
        let mut context = D::new();
        context.update(left);
        context.update(right);

        let result = context.finalize();
        result
            .as_slice()
            .try_into()
            .expect("digest output length mismatch")
    }
}
