use super::CancelSignal;
use crate::domain::ConsensusResult;
use tokio::sync::mpsc;

/// Producer half of a verification result stream.
pub struct ResultSender {
    tx: mpsc::Sender<ConsensusResult<()>>,
    cancel: CancelSignal,
}

impl ResultSender {
    /// Deliver one result unless the run was cancelled.
    ///
    /// Returns `false` once the run is cancelled or the receiver is gone; the
    /// producer should stop. Observing the signal and sending is a single
    /// step: nothing is sent once cancellation is visible.
    pub async fn send(&self, result: ConsensusResult<()>) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            permit = self.tx.reserve() => match permit {
                Ok(permit) if !self.cancel.is_cancelled() => {
                    permit.send(result);
                    true
                }
                _ => false,
            },
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Ordered stream of per-header verification results.
///
/// Yields `None` once every result was delivered or the run was cancelled;
/// results still buffered at cancellation are discarded.
pub struct HeaderResults {
    rx: mpsc::Receiver<ConsensusResult<()>>,
    cancel: CancelSignal,
}

impl HeaderResults {
    /// Create a result stream for `capacity` headers bound to `cancel`.
    ///
    /// Size the capacity to the batch so producers never wait on a slow
    /// consumer.
    pub fn channel(capacity: usize, cancel: CancelSignal) -> (ResultSender, HeaderResults) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            ResultSender {
                tx,
                cancel: cancel.clone(),
            },
            HeaderResults { rx, cancel },
        )
    }

    /// A stream that yields nothing.
    pub fn empty(cancel: CancelSignal) -> HeaderResults {
        let (_tx, results) = Self::channel(1, cancel);
        results
    }

    /// Next result in input order.
    pub async fn recv(&mut self) -> Option<ConsensusResult<()>> {
        let cancel = self.cancel.clone();
        if cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.rx.recv() => result.filter(|_| !cancel.is_cancelled()),
        }
    }

    /// Drain the stream.
    pub async fn collect(mut self) -> Vec<ConsensusResult<()>> {
        let mut results = Vec::new();
        while let Some(result) = self.recv().await {
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConsensusError;

    #[tokio::test]
    async fn test_results_in_send_order() {
        let cancel = CancelSignal::new();
        let (tx, results) = HeaderResults::channel(3, cancel);

        assert!(tx.send(Ok(())).await);
        assert!(tx.send(Err(ConsensusError::UnknownAncestor)).await);
        assert!(tx.send(Ok(())).await);
        drop(tx);

        assert_eq!(
            results.collect().await,
            vec![Ok(()), Err(ConsensusError::UnknownAncestor), Ok(())]
        );
    }

    #[tokio::test]
    async fn test_send_refused_after_cancel() {
        let cancel = CancelSignal::new();
        let (tx, _results) = HeaderResults::channel(4, cancel.clone());
        cancel.cancel();
        assert!(!tx.send(Ok(())).await);
        assert!(tx.is_cancelled());
    }

    #[tokio::test]
    async fn test_buffered_results_dropped_on_cancel() {
        let cancel = CancelSignal::new();
        let (tx, mut results) = HeaderResults::channel(4, cancel.clone());

        assert!(tx.send(Ok(())).await);
        assert!(tx.send(Ok(())).await);
        assert_eq!(results.recv().await, Some(Ok(())));

        cancel.cancel();
        assert_eq!(results.recv().await, None);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let mut results = HeaderResults::empty(CancelSignal::new());
        assert_eq!(results.recv().await, None);
    }
}
