//! Merge Engine - consensus engine spanning the proof-of-work to
//! proof-of-stake transition
//!
//! # Architecture
//! - Wraps one legacy engine; every call is classified as legacy or
//!   transitioned and either delegated or handled here
//! - Post-merge, consensus is attested externally: no rewards, no sealing,
//!   no uncles, fixed seal fields
//! - Transition detected from the parent's total difficulty (TTD)

use crate::batch::{BatchVerifier, CancelSignal, HeaderResults};
use crate::domain::{
    Block, ConsensusError, ConsensusResult, Header, Phase, Receipt, Transaction, POS_DIFFICULTY,
};
use crate::metrics;
use crate::ports::{
    ChainView, ConsensusEngine, FeeMarketValidator, RpcApi, StateDb, ThreadTuning,
};
use crate::transition::{classify, is_parent_ttd_reached, is_ttd_reached};
use crate::validation::HeaderValidator;
use shared_types::{Address, Hash, U256};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Merge-transition consensus engine
pub struct MergeEngine {
    legacy: Arc<dyn ConsensusEngine>,
    fee_market: Arc<dyn FeeMarketValidator>,
    batch: BatchVerifier,
}

impl MergeEngine {
    /// Wrap `legacy`, which must not itself wrap another engine.
    pub fn new(
        legacy: Arc<dyn ConsensusEngine>,
        fee_market: Arc<dyn FeeMarketValidator>,
    ) -> ConsensusResult<Self> {
        if legacy.embedded_engine().is_some() {
            return Err(ConsensusError::NestedEngine);
        }
        let batch = BatchVerifier::new(Arc::clone(&legacy), Arc::clone(&fee_market));
        Ok(Self {
            legacy,
            fee_market,
            batch,
        })
    }

    /// Classify a header by its difficulty.
    ///
    /// Not usable before the difficulty is set, i.e. from `prepare` or
    /// `calc_difficulty`.
    ///
    /// # Panics
    ///
    /// Panics if `header.difficulty` is unset.
    pub fn classify(&self, header: &Header) -> Phase {
        classify(header)
    }

    /// Whether the header belongs to the proof-of-stake phase.
    pub fn is_pos_header(&self, header: &Header) -> bool {
        self.classify(header) == Phase::Transitioned
    }

    /// The embedded legacy engine.
    pub fn inner_engine(&self) -> Arc<dyn ConsensusEngine> {
        Arc::clone(&self.legacy)
    }

    /// Forward the mining thread count to the legacy engine, if it mines.
    pub fn set_threads(&self, threads: i32) {
        ThreadTuning::set_threads(self, threads);
    }
}

impl ConsensusEngine for MergeEngine {
    fn author(&self, header: &Header) -> ConsensusResult<Address> {
        match self.classify(header) {
            Phase::Legacy => self.legacy.author(header),
            Phase::Transitioned => Ok(header.beneficiary),
        }
    }

    fn verify_header(
        &self,
        chain: &dyn ChainView,
        header: &Header,
        seal: bool,
    ) -> ConsensusResult<()> {
        // An unknown parent is left for the legacy engine to report.
        let reached = is_parent_ttd_reached(chain, header).unwrap_or_else(|err| {
            trace!(number = header.number, %err, "TTD lookup failed, using legacy rules");
            false
        });
        if !reached {
            let result = self.legacy.verify_header(chain, header, seal);
            metrics::record_verification(Phase::Legacy, &result);
            return result;
        }

        let parent = header
            .parent_number()
            .and_then(|number| chain.header(&header.parent_hash, number))
            .ok_or(ConsensusError::UnknownAncestor)?;

        let result = HeaderValidator::validate_pos_header(
            header,
            &parent,
            chain.config(),
            self.fee_market.as_ref(),
        );
        if let Err(err) = &result {
            debug!(number = header.number, %err, "Post-merge header rejected");
        }
        metrics::record_verification(Phase::Transitioned, &result);
        result
    }

    fn verify_headers(
        &self,
        chain: Arc<dyn ChainView>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (CancelSignal, HeaderResults) {
        self.batch.verify(chain, headers, seals)
    }

    fn verify_uncles(&self, chain: &dyn ChainView, block: &Block) -> ConsensusResult<()> {
        match self.classify(block.header()) {
            Phase::Legacy => self.legacy.verify_uncles(chain, block),
            Phase::Transitioned if !block.uncles().is_empty() => {
                Err(ConsensusError::TooManyUncles {
                    count: block.uncles().len(),
                })
            }
            Phase::Transitioned => Ok(()),
        }
    }

    fn prepare(&self, chain: &dyn ChainView, header: &mut Header) -> ConsensusResult<()> {
        if !is_parent_ttd_reached(chain, header)? {
            return self.legacy.prepare(chain, header);
        }
        header.difficulty = Some(POS_DIFFICULTY);
        Ok(())
    }

    fn finalize(
        &self,
        chain: &dyn ChainView,
        header: &mut Header,
        state: &mut dyn StateDb,
        txs: &[Transaction],
        uncles: &[Header],
    ) {
        match self.classify(header) {
            Phase::Legacy => self.legacy.finalize(chain, header, state, txs, uncles),
            // Rewards are issued by the external consensus layer.
            Phase::Transitioned => header.state_root = state.intermediate_root(true),
        }
    }

    fn finalize_and_assemble(
        &self,
        chain: &dyn ChainView,
        mut header: Header,
        state: &mut dyn StateDb,
        txs: Vec<Transaction>,
        uncles: Vec<Header>,
        receipts: &[Receipt],
    ) -> ConsensusResult<Block> {
        if self.classify(&header) == Phase::Legacy {
            return self
                .legacy
                .finalize_and_assemble(chain, header, state, txs, uncles, receipts);
        }
        self.finalize(chain, &mut header, state, &txs, &uncles);
        Ok(Block::new(header, txs, uncles, receipts))
    }

    fn seal(
        &self,
        chain: &dyn ChainView,
        block: Block,
        results: mpsc::Sender<Block>,
        stop: CancelSignal,
    ) -> ConsensusResult<()> {
        if self.classify(block.header()) == Phase::Legacy {
            return self.legacy.seal(chain, block, results, stop);
        }
        // Sealed externally. Nothing is ever sent on `results`.
        trace!(number = block.number(), "Skipping seal of post-merge block");
        Ok(())
    }

    fn seal_hash(&self, header: &Header) -> Hash {
        self.legacy.seal_hash(header)
    }

    fn calc_difficulty(&self, chain: &dyn ChainView, time: u64, parent: &Header) -> U256 {
        match is_ttd_reached(chain, &parent.hash(), parent.number) {
            Ok(true) => POS_DIFFICULTY,
            _ => self.legacy.calc_difficulty(chain, time, parent),
        }
    }

    fn apis(&self, chain: &dyn ChainView) -> Vec<RpcApi> {
        self.legacy.apis(chain)
    }

    fn close(&self) -> ConsensusResult<()> {
        self.legacy.close()
    }

    fn thread_tuning(&self) -> Option<&dyn ThreadTuning> {
        Some(self)
    }

    fn embedded_engine(&self) -> Option<&dyn ConsensusEngine> {
        Some(self.legacy.as_ref())
    }
}

impl ThreadTuning for MergeEngine {
    fn set_threads(&self, threads: i32) {
        if let Some(tuning) = self.legacy.thread_tuning() {
            tuning.set_threads(threads);
        }
    }
}
