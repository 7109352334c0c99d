//! Hex encoding of digests for display and transport.

use hex::FromHexError;

use crate::error::EncodingError;
use crate::hasher::MerkleHash;

/// Encodes a digest as lowercase hex.
pub fn to_hex<H: MerkleHash>(h: &H) -> String {
    hex::encode(h.as_bytes())
}

/// Encodes a digest as uppercase hex.
pub fn to_hex_upper<H: MerkleHash>(h: &H) -> String {
    hex::encode_upper(h.as_bytes())
}

/// Decodes a digest from hex.  Either case is accepted, and the input must be
/// exactly `2 * H::HASH_LEN` characters.
pub fn from_hex<H: MerkleHash>(s: &str) -> Result<H, EncodingError> {
    let bytes = hex::decode(s).map_err(EncodingError::from)?;
    H::try_from_slice(&bytes).ok_or(EncodingError::InvalidLength {
        expected: H::HASH_LEN,
        actual: bytes.len(),
    })
}

impl From<FromHexError> for EncodingError {
    fn from(err: FromHexError) -> Self {
        match err {
            FromHexError::OddLength => EncodingError::OddLength,
            FromHexError::InvalidHexCharacter { c, index } => {
                EncodingError::InvalidCharacter { c, index }
            }
            // Only produced when decoding into a fixed buffer, which we don't do.
            FromHexError::InvalidStringLength => EncodingError::OddLength,
        }
    }
}
