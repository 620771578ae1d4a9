use super::{CancelSignal, HeaderResults};
use crate::domain::{ConsensusError, Header, Phase};
use crate::metrics;
use crate::ports::{ChainView, FeeMarketValidator};
use crate::validation::HeaderValidator;
use std::sync::Arc;
use tracing::trace;

/// Spawn a task validating `headers` with the proof-of-stake rules.
///
/// Each header is checked against its predecessor in the batch, which must be
/// its actual parent by hash. The first header is checked against `ancestor`
/// when given, otherwise against its parent looked up in the chain.
pub(crate) fn spawn_transitioned(
    chain: Arc<dyn ChainView>,
    fee_market: Arc<dyn FeeMarketValidator>,
    headers: Vec<Header>,
    ancestor: Option<Header>,
    cancel: CancelSignal,
) -> HeaderResults {
    let (tx, results) = HeaderResults::channel(headers.len(), cancel);

    tokio::spawn(async move {
        let first_parent = ancestor.or_else(|| {
            headers.first().and_then(|first| {
                first
                    .parent_number()
                    .and_then(|number| chain.header(&first.parent_hash, number))
            })
        });

        for (index, header) in headers.iter().enumerate() {
            let parent = if index == 0 {
                first_parent.as_ref()
            } else {
                let previous = &headers[index - 1];
                (previous.hash() == header.parent_hash).then_some(previous)
            };

            let result = match parent {
                Some(parent) => HeaderValidator::validate_pos_header(
                    header,
                    parent,
                    chain.config(),
                    fee_market.as_ref(),
                ),
                None => Err(ConsensusError::UnknownAncestor),
            };
            metrics::record_verification(Phase::Transitioned, &result);

            if !tx.send(result).await {
                trace!(number = header.number, "Transitioned pipeline stopped");
                return;
            }
        }
    });

    results
}
