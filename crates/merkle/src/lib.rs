//! Binary Merkle trees with self-contained inclusion proofs.
//!
//! ```rust
//! # #![allow(unused_crate_dependencies)]
//! use merkletools_merkle::{MerkleHasher, MerkleTree, Sha256Hasher, verify_inclusion};
//!
//! let leaves: Vec<[u8; 32]> = ["a", "b", "c"]
//!     .iter()
//!     .map(|v| Sha256Hasher::hash(v.as_bytes()))
//!     .collect();
//! let tree = MerkleTree::from_leaves::<Sha256Hasher>(leaves.clone())?;
//!
//! let proof = tree.gen_proof(2)?;
//! assert!(verify_inclusion::<Sha256Hasher>(&leaves[2], &proof, tree.root()));
//! # Ok::<(), merkletools_merkle::MerkleError>(())
//! ```
//!
//! # Modules
//!
//! - `hasher`: hash and hasher traits, and the [`Digest`](digest::Digest) adapter
//! - `leaves`: [`LeafStore`] - append-only leaf sequence
//! - `builder`: [`TreeBuilder`] - level-by-level construction
//! - `tree`: [`MerkleTree`] - built tree, proof generation and dump
//! - `proof`: [`MerkleProof`] and verification
//! - `encoding`: hex helpers for digests
//! - `tools`: [`MerkleTools`] - stateful leaves-plus-tree wrapper
//!
//! # Features
//!
//! - `parallel` (default): hash wide levels on the rayon pool
//! - `serde`: serde impls for proofs
//! - `borsh`: borsh impls for proofs

// stupid linter issue
#[cfg(test)]
use criterion as _;

// Test-only dependencies used in serde roundtrip tests when the `serde`
// feature is disabled, to satisfy unused dependency lint for dev-deps.
#[cfg(all(test, not(feature = "serde")))]
use bincode as _;
#[cfg(all(test, not(feature = "serde")))]
use serde_json as _;

#[cfg(feature = "borsh")]
mod borsh_impl;
pub mod builder;
pub mod encoding;
pub mod error;
pub mod hasher;
pub mod leaves;
pub mod proof;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod tools;
pub mod tree;

use hasher::DigestMerkleHasher;
use sha2::Sha256;

/// Merkle hash impl for SHA-256 `Digest` impl.
pub type Sha256Hasher = DigestMerkleHasher<Sha256, 32>;

/// Digest produced by [`Sha256Hasher`].
pub type Hash32 = [u8; 32];

// Common re-exports for ergonomic access at the crate root.
pub use builder::TreeBuilder;
pub use encoding::{from_hex, to_hex, to_hex_upper};
pub use error::{EncodingError, MerkleError};
pub use hasher::{MerkleHash, MerkleHasher};
pub use leaves::LeafStore;
pub use proof::{MerkleProof, ProofStep, Side, verify_inclusion};
pub use tools::MerkleTools;
pub use tree::{MerkleTree, TreeDump};

/// A convenient prelude bringing common types into scope.
pub mod prelude {
    pub use crate::Sha256Hasher;
    pub use crate::builder::TreeBuilder;
    pub use crate::hasher::{DigestMerkleHasher, MerkleHash, MerkleHasher};
    pub use crate::leaves::LeafStore;
    pub use crate::proof::{MerkleProof, ProofStep, Side, verify_inclusion};
    pub use crate::tools::MerkleTools;
    pub use crate::tree::MerkleTree;
}
