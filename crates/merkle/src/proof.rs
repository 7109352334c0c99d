//! Inclusion proofs and their verification.
//!
//! A proof carries its sibling digests by value, so it can be stored, sent
//! and checked without the tree that produced it.

use crate::hasher::{MerkleHash, MerkleHasher};

/// Which side of the running hash a sibling sits on when combined.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "borsh", derive(borsh::BorshSerialize, borsh::BorshDeserialize))]
pub enum Side {
    /// Sibling is the left operand: `hash(sibling || running)`.
    Left,
    /// Sibling is the right operand: `hash(running || sibling)`.
    Right,
}

impl Side {
    /// Returns the byte tag used by binary encodings.
    pub fn as_u8(self) -> u8 {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// Parses a byte tag, or `None` if it isn't 0 or 1.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Side::Left),
            1 => Some(Side::Right),
            _ => None,
        }
    }

    /// Returns the lowercase name, `"left"` or `"right"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// One level of an inclusion proof.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProofStep<H: MerkleHash> {
    pub(crate) sibling: H,
    pub(crate) side: Side,
}

impl<H: MerkleHash> ProofStep<H> {
    /// Creates a new step.
    pub fn new(sibling: H, side: Side) -> Self {
        Self { sibling, side }
    }

    /// Returns the sibling digest.
    pub fn sibling(&self) -> &H {
        &self.sibling
    }

    /// Returns which side the sibling is on.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Combines the running hash with this step's sibling.
    pub fn apply<MH>(&self, running: H) -> H
    where
        MH: MerkleHasher<Hash = H>,
    {
        match self.side {
            Side::Left => MH::hash_node(self.sibling, running),
            Side::Right => MH::hash_node(running, self.sibling),
        }
    }
}

/// Inclusion proof for a leaf, as an ordered list of steps from the leaf
/// level up to the root.
///
/// If the tree that produced this proof is rebuilt with different leaves, the
/// proof has to be regenerated.  An empty proof is only valid for a
/// single-leaf tree, where the leaf is the root.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MerkleProof<H: MerkleHash> {
    pub(crate) steps: Vec<ProofStep<H>>,
}

impl<H: MerkleHash> MerkleProof<H> {
    /// Constructs a proof from its steps, leaf level first.
    pub fn from_steps(steps: Vec<ProofStep<H>>) -> Self {
        Self { steps }
    }

    /// Constructs an empty proof.
    pub fn new_empty() -> Self {
        Self::from_steps(Vec::new())
    }

    /// Returns the steps, leaf level first.
    pub fn steps(&self) -> &[ProofStep<H>] {
        &self.steps
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns if the proof has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Discards the wrapper and returns the steps.
    pub fn into_steps(self) -> Vec<ProofStep<H>> {
        self.steps
    }

    /// Computes the root obtained by applying this proof to `leaf`.
    ///
    /// The caller specifies the merkle hasher implementation via `MH`.
    pub fn compute_root<MH>(&self, leaf: &H) -> H
    where
        MH: MerkleHasher<Hash = H>,
    {
        self.steps
            .iter()
            .fold(*leaf, |cur, step| step.apply::<MH>(cur))
    }

    /// Verifies this proof for `leaf` against the expected `root`.
    ///
    /// A mismatch is a normal `false`, not an error.
    pub fn verify_with_root<MH>(&self, root: &H, leaf: &H) -> bool
    where
        MH: MerkleHasher<Hash = H>,
    {
        let computed = self.compute_root::<MH>(leaf);
        <H as MerkleHash>::eq_ct(&computed, root)
    }
}

impl<H: MerkleHash> Default for MerkleProof<H> {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl<H: MerkleHash> From<Vec<ProofStep<H>>> for MerkleProof<H> {
    fn from(steps: Vec<ProofStep<H>>) -> Self {
        Self::from_steps(steps)
    }
}

impl<H: MerkleHash> FromIterator<ProofStep<H>> for MerkleProof<H> {
    fn from_iter<I: IntoIterator<Item = ProofStep<H>>>(iter: I) -> Self {
        Self::from_steps(iter.into_iter().collect())
    }
}

impl<'a, H: MerkleHash> IntoIterator for &'a MerkleProof<H> {
    type Item = &'a ProofStep<H>;
    type IntoIter = std::slice::Iter<'a, ProofStep<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Checks that `proof` links `leaf` to `root`.
///
/// Needs only the proof, the leaf and the claimed root, never the tree.
pub fn verify_inclusion<MH>(
    leaf: &MH::Hash,
    proof: &MerkleProof<MH::Hash>,
    root: &MH::Hash,
) -> bool
where
    MH: MerkleHasher,
{
    proof.verify_with_root::<MH>(root, leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sha256Hasher;

    type H = [u8; 32];
    type MH = Sha256Hasher;

    #[test]
    fn empty_proof_compares_contents() {
        let leaf = MH::hash(b"only");
        // A separate value with the same bytes must still match.
        let root: H = leaf.to_vec().try_into().unwrap();
        let proof = MerkleProof::<H>::new_empty();
        assert!(verify_inclusion::<MH>(&leaf, &proof, &root));
        assert!(!verify_inclusion::<MH>(&leaf, &proof, &MH::hash(b"other")));
    }

    #[test]
    fn sides_control_operand_order() {
        let a = MH::hash(b"a");
        let b = MH::hash(b"b");

        let left = MerkleProof::from_steps(vec![ProofStep::new(a, Side::Left)]);
        assert_eq!(left.compute_root::<MH>(&b), MH::hash_node(a, b));

        let right = MerkleProof::from_steps(vec![ProofStep::new(b, Side::Right)]);
        assert_eq!(right.compute_root::<MH>(&a), MH::hash_node(a, b));
    }

    #[test]
    fn flipped_side_rejected() {
        let a = MH::hash(b"a");
        let b = MH::hash(b"b");
        let root = MH::hash_node(a, b);

        let good: MerkleProof<H> = [ProofStep::new(b, Side::Right)].into_iter().collect();
        let bad: MerkleProof<H> = [ProofStep::new(b, Side::Left)].into_iter().collect();
        assert!(good.verify_with_root::<MH>(&root, &a));
        assert!(!bad.verify_with_root::<MH>(&root, &a));
    }

    #[test]
    fn side_tags() {
        for side in [Side::Left, Side::Right] {
            assert_eq!(Side::from_u8(side.as_u8()), Some(side));
        }
        assert_eq!(Side::from_u8(2), None);
        assert_eq!(Side::Left.as_str(), "left");
        assert_eq!(Side::Right.as_str(), "right");
    }

    #[test]
    fn step_accessors() {
        let step = ProofStep::new([3u8; 32], Side::Right);
        assert_eq!(step.sibling(), &[3u8; 32]);
        assert_eq!(step.side(), Side::Right);

        let proof = MerkleProof::from(vec![step, step]);
        assert_eq!(proof.len(), 2);
        assert_eq!((&proof).into_iter().count(), 2);
        assert_eq!(proof.into_steps(), vec![step, step]);
    }
}
