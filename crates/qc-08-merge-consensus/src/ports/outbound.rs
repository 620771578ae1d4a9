//! Driven ports (Outbound dependencies)
//!
//! Everything here is owned by the host node. The engine only reads.

use crate::domain::{Header, MergeConfig};
use shared_types::{Hash, U256};

/// Read-only view of the persisted chain.
///
/// Ancestor data is immutable once written, so implementations must be safe
/// to query from several verification tasks at once.
pub trait ChainView: Send + Sync {
    /// Chain configuration, including the terminal total difficulty
    fn config(&self) -> &MergeConfig;

    /// Header by hash and number
    fn header(&self, hash: &Hash, number: u64) -> Option<Header>;

    /// Cumulative difficulty from genesis up to and including the block
    fn total_difficulty(&self, hash: &Hash, number: u64) -> Option<U256>;
}

/// Base-fee rules of the fee market.
///
/// The engine only invokes this; the base-fee formula itself lives with
/// the implementor.
pub trait FeeMarketValidator: Send + Sync {
    /// Check `header.base_fee_per_gas` against its parent.
    fn verify_header(&self, config: &MergeConfig, parent: &Header, header: &Header)
        -> Result<(), String>;
}

/// State database being finalized into a block.
pub trait StateDb {
    /// Commit pending changes and return the resulting state root.
    fn intermediate_root(&mut self, delete_empty_objects: bool) -> Hash;
}
