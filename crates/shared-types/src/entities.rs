//! # Primitive Entities
//!
//! Identity and numeric primitives shared by the consensus crates.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// The 64-bit proof-of-work nonce carried in a block header.
///
/// Stored big-endian, matching how the value is laid out on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockNonce(pub [u8; 8]);

impl BlockNonce {
    /// The zero nonce, mandatory once the chain runs proof-of-stake.
    pub const ZERO: BlockNonce = BlockNonce([0u8; 8]);

    /// Encode an integer as a nonce.
    pub const fn encode(value: u64) -> Self {
        BlockNonce(value.to_be_bytes())
    }

    /// Decode the nonce as an integer.
    pub const fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// Raw bytes of the nonce.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl From<u64> for BlockNonce {
    fn from(value: u64) -> Self {
        BlockNonce::encode(value)
    }
}

impl fmt::Display for BlockNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.as_u64())
    }
}
