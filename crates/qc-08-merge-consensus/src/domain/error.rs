//! Error types for the merge-transition engine
//!
//! Each invariant a post-merge header can break has its own variant so
//! callers can match on the exact failure.

use shared_types::{BlockNonce, Hash, U256};

/// Consensus error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("unknown ancestor")]
    UnknownAncestor,

    #[error("invalid nonce: have {have}, want 0")]
    InvalidNonce { have: BlockNonce },

    #[error("invalid uncle hash: {have:?}")]
    InvalidUncleHash { have: Hash },

    #[error("invalid difficulty: have {have:?}, want {want}")]
    InvalidDifficulty { have: Option<U256>, want: U256 },

    #[error("extra-data longer than {max} bytes ({len})")]
    InvalidExtraDataLength { len: usize, max: usize },

    #[error("invalid gasLimit: have {have}, max {max}")]
    InvalidGasLimit { have: u64, max: u64 },

    #[error("invalid gasUsed: have {used}, gasLimit {limit}")]
    InvalidGasUsed { used: u64, limit: u64 },

    #[error("invalid block number: parent {parent}, have {number}")]
    InvalidBlockNumberSequence { parent: u64, number: u64 },

    #[error("too many uncles: {count}")]
    TooManyUncles { count: usize },

    #[error("fee market violation: {0}")]
    FeeMarketViolation(String),

    #[error("nested consensus engine")]
    NestedEngine,

    #[error("legacy engine: {0}")]
    Legacy(String),

    #[error("verification ended before the header was checked")]
    Interrupted,
}

impl ConsensusError {
    /// Stable label for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            ConsensusError::UnknownAncestor => "unknown_ancestor",
            ConsensusError::InvalidNonce { .. } => "invalid_nonce",
            ConsensusError::InvalidUncleHash { .. } => "invalid_uncle_hash",
            ConsensusError::InvalidDifficulty { .. } => "invalid_difficulty",
            ConsensusError::InvalidExtraDataLength { .. } => "invalid_extra_data_length",
            ConsensusError::InvalidGasLimit { .. } => "invalid_gas_limit",
            ConsensusError::InvalidGasUsed { .. } => "invalid_gas_used",
            ConsensusError::InvalidBlockNumberSequence { .. } => "invalid_block_number",
            ConsensusError::TooManyUncles { .. } => "too_many_uncles",
            ConsensusError::FeeMarketViolation(_) => "fee_market",
            ConsensusError::NestedEngine => "nested_engine",
            ConsensusError::Legacy(_) => "legacy",
            ConsensusError::Interrupted => "interrupted",
        }
    }
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
