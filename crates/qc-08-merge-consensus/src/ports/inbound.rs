//! Driving ports (Inbound API)
//!
//! [`ConsensusEngine`] is the capability set shared by the legacy engines and
//! the merge wrapper, so either can be handed to the rest of the node.

use crate::batch::{CancelSignal, HeaderResults};
use crate::domain::{Block, ConsensusResult, Header, Receipt, Transaction};
use crate::ports::{ChainView, StateDb};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, U256};
use std::sync::Arc;
use tokio::sync::mpsc;

/// An RPC namespace an engine exposes to users
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcApi {
    pub namespace: String,
    pub version: String,
    pub public: bool,
}

/// Consensus engine capability set
pub trait ConsensusEngine: Send + Sync {
    /// Address of the account that minted the block.
    fn author(&self, header: &Header) -> ConsensusResult<Address>;

    /// Verify a single header against the consensus rules.
    ///
    /// `seal` asks the engine to also verify the seal; post-merge this is a
    /// no-op since sealing happens outside the execution layer.
    fn verify_header(&self, chain: &dyn ChainView, header: &Header, seal: bool)
        -> ConsensusResult<()>;

    /// Verify an ordered, contiguous batch of headers concurrently.
    ///
    /// Results arrive in input order, one per header. Cancelling the returned
    /// signal stops the verification; nothing is received after that.
    ///
    /// Must be called from within a Tokio runtime.
    fn verify_headers(
        &self,
        chain: Arc<dyn ChainView>,
        headers: Vec<Header>,
        seals: Vec<bool>,
    ) -> (CancelSignal, HeaderResults);

    /// Verify the uncles carried by a block.
    fn verify_uncles(&self, chain: &dyn ChainView, block: &Block) -> ConsensusResult<()>;

    /// Initialize the consensus fields of a header under construction.
    fn prepare(&self, chain: &dyn ChainView, header: &mut Header) -> ConsensusResult<()>;

    /// Apply post-transaction state changes (e.g. rewards) and set the state root.
    fn finalize(
        &self,
        chain: &dyn ChainView,
        header: &mut Header,
        state: &mut dyn StateDb,
        txs: &[Transaction],
        uncles: &[Header],
    );

    /// Finalize and assemble the final block.
    fn finalize_and_assemble(
        &self,
        chain: &dyn ChainView,
        header: Header,
        state: &mut dyn StateDb,
        txs: Vec<Transaction>,
        uncles: Vec<Header>,
        receipts: &[Receipt],
    ) -> ConsensusResult<Block>;

    /// Start sealing `block`, pushing any sealed result to `results`.
    ///
    /// Returns immediately; results are delivered asynchronously and an engine
    /// is free to deliver none. Callers must not block on `results`.
    fn seal(
        &self,
        chain: &dyn ChainView,
        block: Block,
        results: mpsc::Sender<Block>,
        stop: CancelSignal,
    ) -> ConsensusResult<()>;

    /// Hash of a header prior to sealing.
    fn seal_hash(&self, header: &Header) -> Hash;

    /// Difficulty a child of `parent` created at `time` should have.
    fn calc_difficulty(&self, chain: &dyn ChainView, time: u64, parent: &Header) -> U256;

    /// RPC APIs provided by this engine.
    fn apis(&self, chain: &dyn ChainView) -> Vec<RpcApi>;

    /// Release any background resources.
    fn close(&self) -> ConsensusResult<()>;

    /// Optional mining thread control.
    fn thread_tuning(&self) -> Option<&dyn ThreadTuning> {
        None
    }

    /// The engine wrapped by this one, if any.
    fn embedded_engine(&self) -> Option<&dyn ConsensusEngine> {
        None
    }
}

/// Engines that mine on a configurable number of threads.
pub trait ThreadTuning: Send + Sync {
    /// Update the number of mining threads. Zero means "one per core",
    /// a negative value stops mining.
    fn set_threads(&self, threads: i32);
}
