//! Concurrent verification of header batches.
//!
//! A batch that straddles the merge is split at the first header whose
//! parent reached the terminal total difficulty. The legacy prefix goes to the embedded engine's own batch
//! verifier, the proof-of-stake suffix to an internal pipeline, and a merge
//! task re-serializes both into input order:
//!
//! ```text
//!  headers[..split] ──► legacy.verify_headers ──┐
//!                                               ├──► merge ──► HeaderResults
//!  headers[split..] ──► transitioned pipeline ──┘
//! ```

mod cancel;
mod merge;
mod pipeline;
mod results;

pub use cancel::CancelSignal;
pub use results::{HeaderResults, ResultSender};

use crate::domain::Header;
use crate::metrics;
use crate::ports::{ChainView, ConsensusEngine, FeeMarketValidator};
use crate::transition::transition_index;
use std::sync::Arc;
use tracing::{debug, trace};

/// Batch header verification across the merge boundary
pub struct BatchVerifier {
    legacy: Arc<dyn ConsensusEngine>,
    fee_market: Arc<dyn FeeMarketValidator>,
}

impl BatchVerifier {
    pub fn new(legacy: Arc<dyn ConsensusEngine>, fee_market: Arc<dyn FeeMarketValidator>) -> Self {
        Self { legacy, fee_market }
    }

    /// Verify an ordered, contiguous batch of headers.
    ///
    /// Yields exactly one result per header, in input order, unless the
    /// returned signal is cancelled. Must be called within a Tokio runtime.
    pub fn verify(
        &self,
        chain: Arc<dyn ChainView>,
        mut headers: Vec<Header>,
        mut seals: Vec<bool>,
    ) -> (CancelSignal, HeaderResults) {
        if headers.is_empty() {
            let cancel = CancelSignal::new();
            return (cancel.clone(), HeaderResults::empty(cancel));
        }
        let split = match transition_index(chain.as_ref(), &headers) {
            Ok(Some(split)) => split,
            Ok(None) => {
                debug!(count = headers.len(), "Delegating header batch to legacy engine");
                return self.legacy.verify_headers(chain, headers, seals);
            }
            Err(err) => {
                trace!(count = headers.len(), %err, "TTD lookup failed, delegating header batch");
                return self.legacy.verify_headers(chain, headers, seals);
            }
        };
        let cancel = CancelSignal::new();

        if split == 0 {
            debug!(count = headers.len(), "Verifying post-merge header batch");
            let results = pipeline::spawn_transitioned(
                chain,
                Arc::clone(&self.fee_market),
                headers,
                None,
                cancel.clone(),
            );
            return (cancel, results);
        }

        let total = headers.len();
        let transitioned = headers.split_off(split);
        seals.truncate(split);
        let ancestor = headers.last().cloned();
        debug!(
            pre = split,
            post = transitioned.len(),
            first_pos = transitioned[0].number,
            "Splitting header batch at merge boundary"
        );
        metrics::record_batch_split(split, transitioned.len());

        let (legacy_cancel, legacy_results) =
            self.legacy.verify_headers(Arc::clone(&chain), headers, seals);
        let transitioned_results = pipeline::spawn_transitioned(
            chain,
            Arc::clone(&self.fee_market),
            transitioned,
            ancestor,
            cancel.clone(),
        );
        let results = merge::spawn_merge(
            legacy_results,
            legacy_cancel,
            transitioned_results,
            split,
            total,
            cancel.clone(),
        );
        (cancel, results)
    }
}
