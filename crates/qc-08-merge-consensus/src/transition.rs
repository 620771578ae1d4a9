//! Terminal total difficulty detection and header classification.

use crate::domain::{ConsensusError, ConsensusResult, Header, Phase, POS_DIFFICULTY};
use crate::ports::ChainView;
use shared_types::Hash;

/// Check whether the block `(hash, number)` has reached the terminal total
/// difficulty, i.e. whether its children are governed by proof-of-stake.
///
/// Without a configured threshold the chain never transitions. The block must
/// already be persisted; otherwise `UnknownAncestor` is returned.
pub fn is_ttd_reached(chain: &dyn ChainView, hash: &Hash, number: u64) -> ConsensusResult<bool> {
    let Some(ttd) = chain.config().terminal_total_difficulty else {
        return Ok(false);
    };
    let td = chain
        .total_difficulty(hash, number)
        .ok_or(ConsensusError::UnknownAncestor)?;
    Ok(td >= ttd)
}

/// Whether the parent of `header` has reached the terminal total difficulty.
///
/// Genesis has no parent and is always legacy.
pub fn is_parent_ttd_reached(chain: &dyn ChainView, header: &Header) -> ConsensusResult<bool> {
    match header.parent_number() {
        Some(number) => is_ttd_reached(chain, &header.parent_hash, number),
        None => Ok(false),
    }
}

/// Index of the first header in an ordered batch whose parent has reached the
/// terminal total difficulty.
///
/// Only the parent of `headers[0]` is looked up; cumulative difficulty is
/// then carried through the batch. `Ok(None)` means the whole batch stays on
/// legacy rules, either because no threshold is configured or because it is
/// never reached.
pub fn transition_index(
    chain: &dyn ChainView,
    headers: &[Header],
) -> ConsensusResult<Option<usize>> {
    let Some(ttd) = chain.config().terminal_total_difficulty else {
        return Ok(None);
    };
    let Some(first) = headers.first() else {
        return Ok(None);
    };
    let mut parent_td = match first.parent_number() {
        Some(number) => Some(
            chain
                .total_difficulty(&first.parent_hash, number)
                .ok_or(ConsensusError::UnknownAncestor)?,
        ),
        None => None,
    };

    for (index, header) in headers.iter().enumerate() {
        if parent_td.is_some_and(|td| td >= ttd) {
            return Ok(Some(index));
        }
        let td = parent_td
            .unwrap_or_default()
            .saturating_add(header.difficulty.unwrap_or_default());
        parent_td = Some(td);
    }
    Ok(None)
}

/// Classify a header by its difficulty sentinel.
///
/// Only valid once the difficulty has been populated, so it cannot be used
/// from `prepare` or `calc_difficulty`.
///
/// # Panics
///
/// Panics if `header.difficulty` is unset.
pub fn classify(header: &Header) -> Phase {
    match header.difficulty {
        Some(difficulty) if difficulty == POS_DIFFICULTY => Phase::Transitioned,
        Some(_) => Phase::Legacy,
        None => panic!("header {} classified with unset difficulty", header.number),
    }
}
