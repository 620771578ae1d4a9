//! # qc-08-merge-consensus
//!
//! Merge-transition consensus for Quantum-Chain.
//!
//! ## Architecture
//!
//! `MergeEngine` wraps the legacy proof-of-work engine and switches rules once
//! the chain's cumulative difficulty crosses the configured terminal total
//! difficulty (TTD). Every engine call is classified per header:
//!
//! ```text
//!                   ┌── Legacy ─────────► embedded engine (PoW rules)
//! Header ─► classify┤
//!                   └── Transitioned ───► HeaderValidator (PoS invariants)
//! ```
//!
//! Post-merge blocks are produced and attested by an external consensus
//! layer, so this engine never seals them, pays no rewards and accepts no
//! uncles.
//!
//! ### Batch Verification
//!
//! Header batches that straddle the merge are split at the first header
//! whose parent reached the TTD and verified concurrently. Results are
//! re-serialized into input order and the whole run can be cancelled with the
//! returned `CancelSignal`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qc_08_merge_consensus::{ConsensusEngine, MergeEngine};
//!
//! let engine = MergeEngine::new(ethash, fee_market)?;
//!
//! // Single header
//! engine.verify_header(chain.as_ref(), &header, true)?;
//!
//! // Batch, in input order
//! let (cancel, mut results) = engine.verify_headers(chain, headers, seals);
//! while let Some(result) = results.recv().await {
//!     result?;
//! }
//! ```
//!
//! ## Configuration
//!
//! `MergeConfig::from_env` reads `QC_TERMINAL_TOTAL_DIFFICULTY`,
//! `QC_MAX_EXTRA_DATA_SIZE` and `QC_MAX_GAS_LIMIT`.

pub mod adapters;
pub mod batch;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod transition;
pub mod validation;

// Re-export main types
pub use adapters::InMemoryChain;
pub use batch::{BatchVerifier, CancelSignal, HeaderResults, ResultSender};
pub use domain::{
    Block, ConsensusError, ConsensusResult, Header, MergeConfig, Phase, Receipt, Transaction,
    EMPTY_UNCLE_HASH, POS_DIFFICULTY, POS_NONCE,
};
pub use ports::{ChainView, ConsensusEngine, FeeMarketValidator, RpcApi, StateDb, ThreadTuning};
pub use service::MergeEngine;
pub use transition::{classify, is_parent_ttd_reached, is_ttd_reached, transition_index};
pub use validation::HeaderValidator;
