//! # Merge Consensus Metrics
//!
//! Prometheus metrics for header verification across the merge.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-08-merge-consensus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `merge_headers_verified_total` - Headers accepted, by phase
//! - `merge_headers_rejected_total` - Headers rejected, by reason
//! - `merge_batch_splits_total` - Batches split at the merge boundary

use crate::domain::{ConsensusResult, Phase};

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Headers accepted, labeled by phase
    pub static ref HEADERS_VERIFIED: IntCounterVec = register_int_counter_vec!(
        "merge_headers_verified_total",
        "Total number of headers that passed verification",
        &["phase"]
    )
    .expect("Failed to create HEADERS_VERIFIED metric");

    /// Headers rejected, labeled by reason
    pub static ref HEADERS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "merge_headers_rejected_total",
        "Total number of headers that failed verification",
        &["reason"]
    )
    .expect("Failed to create HEADERS_REJECTED metric");

    /// Batches split at the merge boundary
    pub static ref BATCH_SPLITS: IntCounter = register_int_counter!(
        "merge_batch_splits_total",
        "Total number of header batches split at the merge boundary"
    )
    .expect("Failed to create BATCH_SPLITS metric");
}

/// Record an accepted header
#[cfg(feature = "metrics")]
pub fn record_header_verified(phase: Phase) {
    HEADERS_VERIFIED.with_label_values(&[phase.as_str()]).inc();
}

/// Record a rejected header with reason
#[cfg(feature = "metrics")]
pub fn record_header_rejected(reason: &str) {
    HEADERS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record a batch split into legacy and post-merge groups
#[cfg(feature = "metrics")]
pub fn record_batch_split(_legacy: usize, _transitioned: usize) {
    BATCH_SPLITS.inc();
}

/// Record the outcome of verifying one header under `phase` rules
pub fn record_verification(phase: Phase, result: &ConsensusResult<()>) {
    match result {
        Ok(()) => record_header_verified(phase),
        Err(err) => record_header_rejected(err.reason()),
    }
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_header_verified(_phase: Phase) {}

#[cfg(not(feature = "metrics"))]
pub fn record_header_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_split(_legacy: usize, _transitioned: usize) {}
