//! Serde serialization support for proof types.
//! Enable via `--features serde`.
//!
//! ## Human-Readable Format (JSON, TOML, etc.)
//!
//! Each proof step is a single-entry map from side to lowercase hex sibling,
//! and a proof is the list of its steps:
//!
//! ```text
//! [{"right":"3e23e8..."},{"left":"2e7d2c..."}]
//! ```
//!
//! ## Binary Format (bincode, etc.)
//!
//! Each step is the tuple `(side_u8, digest_bytes)`, with 0 for left and 1
//! for right.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoding::{from_hex, to_hex};
use crate::hasher::MerkleHash;
use crate::proof::{MerkleProof, ProofStep, Side};

// Side

impl Serialize for Side {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(self.as_str())
        } else {
            serializer.serialize_u8(self.as_u8())
        }
    }
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            parse_side(&s).map_err(de::Error::custom)
        } else {
            let v = u8::deserialize(deserializer)?;
            Side::from_u8(v).ok_or_else(|| de::Error::custom(format!("invalid side tag {v}")))
        }
    }
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s {
        "left" => Ok(Side::Left),
        "right" => Ok(Side::Right),
        other => Err(format!("invalid side {other:?}, expected \"left\" or \"right\"")),
    }
}

// ProofStep

/// Serializes a digest as a byte string rather than a sequence of `u8`s.
struct DigestBytes<'a>(&'a [u8]);

impl Serialize for DigestBytes<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.0)
    }
}

/// Reads a fixed-length digest from a byte string or a sequence of `u8`s.
struct OwnedDigest<H>(H);

impl<'de, H: MerkleHash> Deserialize<'de> for OwnedDigest<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DigestVisitor<H>(PhantomData<H>);

        impl<'de, H: MerkleHash> Visitor<'de> for DigestVisitor<H> {
            type Value = OwnedDigest<H>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{} digest bytes", H::HASH_LEN)
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                H::try_from_slice(v)
                    .map(OwnedDigest)
                    .ok_or_else(|| E::invalid_length(v.len(), &self))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut buf = Vec::with_capacity(H::HASH_LEN);
                while let Some(b) = seq.next_element::<u8>()? {
                    buf.push(b);
                }
                self.visit_bytes(&buf)
            }
        }

        deserializer.deserialize_bytes(DigestVisitor(PhantomData))
    }
}

impl<H: MerkleHash> Serialize for ProofStep<H> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let mut map = serializer.serialize_map(Some(1))?;
            map.serialize_entry(self.side.as_str(), &to_hex(&self.sibling))?;
            map.end()
        } else {
            let mut tuple = serializer.serialize_tuple(2)?;
            tuple.serialize_element(&self.side.as_u8())?;
            tuple.serialize_element(&DigestBytes(self.sibling.as_bytes()))?;
            tuple.end()
        }
    }
}

impl<'de, H: MerkleHash> Deserialize<'de> for ProofStep<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StepVisitor<H>(PhantomData<H>);

        impl<'de, H: MerkleHash> Visitor<'de> for StepVisitor<H> {
            type Value = ProofStep<H>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a single-entry map {\"left\"|\"right\": hex} or a tuple (u8, bytes)")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let (side, hex) = map
                    .next_entry::<String, String>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }

                let side = parse_side(&side).map_err(de::Error::custom)?;
                let sibling = from_hex::<H>(&hex)
                    .map_err(|e| de::Error::custom(format!("invalid sibling digest: {e}")))?;
                Ok(ProofStep::new(sibling, side))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let tag: u8 = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let OwnedDigest(sibling) = seq
                    .next_element::<OwnedDigest<H>>()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;

                let side = Side::from_u8(tag)
                    .ok_or_else(|| de::Error::custom(format!("invalid side tag {tag}")))?;
                Ok(ProofStep::new(sibling, side))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_map(StepVisitor(PhantomData))
        } else {
            deserializer.deserialize_tuple(2, StepVisitor(PhantomData))
        }
    }
}

// MerkleProof

impl<H: MerkleHash> Serialize for MerkleProof<H> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.steps.serialize(serializer)
    }
}

impl<'de, H: MerkleHash> Deserialize<'de> for MerkleProof<H> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let steps = <Vec<ProofStep<H>>>::deserialize(deserializer)?;
        Ok(Self { steps })
    }
}
