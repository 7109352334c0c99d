//! Error types for tree construction, proofs and the hex boundary.
use thiserror::Error;

/// Errors from building trees and generating proofs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum MerkleError {
    /// Tried to build a tree from zero leaves.
    #[error("no leaves to build a merkle tree from")]
    EmptyInput,

    /// Requested a proof for a leaf that does not exist.
    #[error("leaf index {index} out of range (leaf count {leaf_count})")]
    IndexOutOfRange {
        /// Index that was requested.
        index: usize,
        /// Number of leaves in the tree.
        leaf_count: usize,
    },

    /// Requested a root or proof before a tree was successfully built.
    #[error("merkle tree has not been built")]
    TreeNotBuilt,
}

/// Errors from decoding hex-encoded digests.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum EncodingError {
    /// Hex string had an odd number of characters.
    #[error("odd number of hex digits")]
    OddLength,

    /// Hex string contained a character outside `[0-9a-fA-F]`.
    #[error("invalid hex character {c:?} at position {index}")]
    InvalidCharacter {
        /// The offending character.
        c: char,
        /// Its position in the input.
        index: usize,
    },

    /// Decoded bytes do not have the digest length.
    #[error("expected {expected} digest bytes, got {actual}")]
    InvalidLength {
        /// Digest length of the target hash type.
        expected: usize,
        /// Number of bytes decoded.
        actual: usize,
    },
}
