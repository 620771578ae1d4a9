use super::{CancelSignal, HeaderResults};
use crate::domain::{ConsensusError, ConsensusResult};
use tracing::{trace, warn};

/// Spawn the task merging a split batch back into input order.
///
/// `legacy` yields the results of headers `0..split`, `transitioned` those
/// of `split..total`. Both arrive in order within their own range but
/// interleave arbitrarily, so completions ahead of the next expected index
/// are parked until the gap fills.
///
/// A source that closes early still accounts for every header: its missing
/// results are filled with errors so the stream always yields `total` items.
///
/// Cancelling `cancel` stops the merge and forwards cancellation to the
/// legacy run (`legacy_cancel`); the transitioned pipeline already shares
/// `cancel`.
pub(crate) fn spawn_merge(
    mut legacy: HeaderResults,
    legacy_cancel: CancelSignal,
    mut transitioned: HeaderResults,
    split: usize,
    total: usize,
    cancel: CancelSignal,
) -> HeaderResults {
    let (tx, results) = HeaderResults::channel(total, cancel.clone());

    tokio::spawn(async move {
        let mut parked: Vec<Option<ConsensusResult<()>>> = vec![None; total];
        let mut next_legacy = 0;
        let mut next_transitioned = split;
        let mut out = 0;

        loop {
            while let Some(result) = parked.get_mut(out).and_then(Option::take) {
                if !tx.send(result).await {
                    trace!(delivered = out, "Merge stopped by cancellation");
                    legacy_cancel.cancel();
                    return;
                }
                out += 1;
            }
            if out == total {
                return;
            }

            let legacy_pending = next_legacy < split;
            let transitioned_pending = next_transitioned < total;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    trace!(delivered = out, "Merge observed cancellation");
                    legacy_cancel.cancel();
                    return;
                }
                result = legacy.recv(), if legacy_pending => match result {
                    Some(result) => {
                        parked[next_legacy] = Some(result);
                        next_legacy += 1;
                    }
                    None => {
                        warn!(
                            received = next_legacy,
                            expected = split,
                            "Legacy verification closed early"
                        );
                        for slot in &mut parked[next_legacy..split] {
                            *slot = Some(Err(ConsensusError::Legacy(
                                "verification ended before the header was checked".to_string(),
                            )));
                        }
                        next_legacy = split;
                    }
                },
                result = transitioned.recv(), if transitioned_pending => match result {
                    Some(result) => {
                        parked[next_transitioned] = Some(result);
                        next_transitioned += 1;
                    }
                    None => {
                        warn!(
                            received = next_transitioned - split,
                            expected = total - split,
                            "Post-merge verification closed early"
                        );
                        for slot in &mut parked[next_transitioned..total] {
                            *slot = Some(Err(ConsensusError::Interrupted));
                        }
                        next_transitioned = total;
                    }
                },
            }
        }
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn source(
        results: Vec<ConsensusResult<()>>,
        delay: Duration,
        cancel: CancelSignal,
    ) -> HeaderResults {
        let (tx, rx) = HeaderResults::channel(results.len(), cancel);
        tokio::spawn(async move {
            for result in results {
                tokio::time::sleep(delay).await;
                if !tx.send(result).await {
                    return;
                }
            }
        });
        rx
    }

    fn tagged(index: u64) -> ConsensusResult<()> {
        Err(ConsensusError::InvalidBlockNumberSequence {
            parent: index,
            number: index,
        })
    }

    #[tokio::test]
    async fn test_merge_preserves_order_when_tail_finishes_first() {
        let cancel = CancelSignal::new();
        let legacy_cancel = CancelSignal::new();
        let legacy = source(
            (0..3).map(tagged).collect(),
            Duration::from_millis(30),
            legacy_cancel.clone(),
        );
        let transitioned = source((3..6).map(tagged).collect(), Duration::ZERO, cancel.clone());

        let merged = spawn_merge(legacy, legacy_cancel, transitioned, 3, 6, cancel);
        let results = merged.collect().await;

        assert_eq!(results, (0..6).map(tagged).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_merge_fills_results_when_sources_close_early() {
        let cancel = CancelSignal::new();
        let legacy_cancel = CancelSignal::new();
        let legacy = source(vec![tagged(0)], Duration::ZERO, legacy_cancel.clone());
        let transitioned = source(vec![tagged(2)], Duration::ZERO, cancel.clone());

        let merged = spawn_merge(legacy, legacy_cancel, transitioned, 2, 4, cancel);
        let results = tokio::time::timeout(Duration::from_secs(1), merged.collect())
            .await
            .expect("merge must terminate");

        assert_eq!(results.len(), 4);
        assert_eq!(results[0], tagged(0));
        assert!(matches!(results[1], Err(ConsensusError::Legacy(_))));
        assert_eq!(results[2], tagged(2));
        assert_eq!(results[3], Err(ConsensusError::Interrupted));
    }

    #[tokio::test]
    async fn test_merge_fills_legacy_gap_behind_finished_tail() {
        let cancel = CancelSignal::new();
        let legacy_cancel = CancelSignal::new();
        let legacy = source(vec![], Duration::ZERO, legacy_cancel.clone());
        let transitioned = source((3..5).map(tagged).collect(), Duration::ZERO, cancel.clone());

        let merged = spawn_merge(legacy, legacy_cancel, transitioned, 3, 5, cancel);
        let results = merged.collect().await;

        assert_eq!(results.len(), 5);
        assert!(results[..3]
            .iter()
            .all(|result| matches!(result, Err(ConsensusError::Legacy(_)))));
        assert_eq!(results[3..].to_vec(), vec![tagged(3), tagged(4)]);
    }

    #[tokio::test]
    async fn test_cancel_propagates_to_legacy_run() {
        let cancel = CancelSignal::new();
        let legacy_cancel = CancelSignal::new();
        let legacy = source(
            (0..4).map(tagged).collect(),
            Duration::from_millis(50),
            legacy_cancel.clone(),
        );
        let transitioned = source((4..8).map(tagged).collect(), Duration::ZERO, cancel.clone());

        let _merged = spawn_merge(legacy, legacy_cancel.clone(), transitioned, 4, 8, cancel.clone());
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), legacy_cancel.cancelled())
            .await
            .expect("legacy run not cancelled");
    }
}
