//! Byte codec helpers
//!
//! Conversion between `0x`-prefixed hex text and raw bytes, plus the
//! fixed-length byte types used for label hashes and contract addresses.
//!
//! Entity keys are always the lowercase, `0x`-prefixed rendering produced by
//! [`encode_hex`], so two events that reference the same on-chain value map to
//! the same key regardless of how the feed spelled it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Byte decoding errors
///
/// All of these are fatal: malformed hex is never truncated or padded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Hex string must have an even number of characters (got {len})")]
    OddLength { len: usize },

    #[error("Invalid hex character {c:?} at position {index}")]
    InvalidCharacter { c: char, index: usize },

    #[error("Expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Decode hex text into bytes. A leading `0x` / `0X` is optional.
pub fn decode_hex(s: &str) -> CodecResult<Vec<u8>> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.len() % 2 != 0 {
        return Err(CodecError::OddLength { len: digits.len() });
    }

    hex::decode(digits).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            CodecError::InvalidCharacter { c, index }
        }
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            CodecError::OddLength { len: digits.len() }
        }
    })
}

/// Encode bytes as lowercase `0x`-prefixed hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Concatenate two byte sequences (byte concatenation, not string).
pub fn concat(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

/// Fixed-length byte sequence rendered as `0x` hex in JSON
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedBytes<const N: usize>(pub [u8; N]);

/// 32-byte hash (label hash, domain hash, root node)
pub type H256 = FixedBytes<32>;

/// 20-byte contract or account address
pub type Address = FixedBytes<20>;

impl<const N: usize> FixedBytes<N> {
    pub const fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    pub const fn zero() -> Self {
        Self([0u8; N])
    }

    /// Parse from hex, requiring exactly `N` bytes.
    pub fn from_hex(s: &str) -> CodecResult<Self> {
        Self::from_slice(&decode_hex(s)?)
    }

    pub fn from_slice(bytes: &[u8]) -> CodecResult<Self> {
        let arr: [u8; N] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase `0x` hex, the canonical entity key form.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }
}

impl<const N: usize> AsRef<[u8]> for FixedBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for FixedBytes<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes)
    }
}

impl<const N: usize> FromStr for FixedBytes<N> {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl<const N: usize> fmt::Display for FixedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<const N: usize> fmt::Debug for FixedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<const N: usize> Serialize for FixedBytes<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedBytes<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
