//! Borsh serialization support for proof types.
//! Enable via `--features borsh`.
//!
//! A step is its side byte followed by the raw `HASH_LEN` sibling bytes, with
//! no length prefix since the digest size is fixed by the hash type.

use borsh::{BorshDeserialize, BorshSerialize, io};

use crate::hasher::MerkleHash;
use crate::proof::{MerkleProof, ProofStep, Side};

// ProofStep

impl<H> BorshSerialize for ProofStep<H>
where
    H: MerkleHash,
{
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.side.serialize(writer)?;
        writer.write_all(self.sibling.as_bytes())
    }
}

impl<H> BorshDeserialize for ProofStep<H>
where
    H: MerkleHash,
{
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let side = Side::deserialize_reader(reader)?;
        let mut buf = vec![0u8; H::HASH_LEN];
        reader.read_exact(&mut buf)?;
        let sibling = H::try_from_slice(&buf).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "sibling digest length mismatch")
        })?;
        Ok(Self { sibling, side })
    }
}

// MerkleProof

impl<H> BorshSerialize for MerkleProof<H>
where
    H: MerkleHash,
{
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.steps.serialize(writer)
    }
}

impl<H> BorshDeserialize for MerkleProof<H>
where
    H: MerkleHash,
{
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let steps = <Vec<ProofStep<H>>>::deserialize_reader(reader)?;
        Ok(Self { steps })
    }
}
