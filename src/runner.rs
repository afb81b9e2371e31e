use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::probe::ProbeResult;

/// How a batched run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchStatus {
    Completed,
    Cancelled,
}

/// Run independent probes over `identities` in contiguous batches of
/// `batch_size`, bounding peak concurrent sockets and child processes.
///
/// Probes within a batch run concurrently; the whole batch is drained
/// before the next one starts, so a batch abandoned by cancellation still
/// releases its resources. `on_batch` fires before each batch launch,
/// `on_result` as each probe completes. Both callbacks run on the driving
/// task, so result delivery is serialized and never torn.
///
/// The token is checked at every batch boundary. Once cancellation is
/// requested, no further batch is scheduled and results still arriving
/// from the in-flight batch are discarded.
pub async fn run_batches<T, F, Fut>(
    identities: &[T],
    batch_size: usize,
    batch_pause: Duration,
    cancel: &CancellationToken,
    probe: F,
    mut on_batch: impl FnMut(&[T]),
    mut on_result: impl FnMut(ProbeResult<T>),
) -> BatchStatus
where
    T: Clone,
    F: Fn(T) -> Fut,
    Fut: Future<Output = ProbeResult<T>>,
{
    let batch_size = batch_size.max(1);
    for batch in identities.chunks(batch_size) {
        if cancel.is_cancelled() {
            return BatchStatus::Cancelled;
        }
        on_batch(batch);
        let mut results = stream::iter(batch.iter().cloned())
            .map(&probe)
            .buffer_unordered(batch.len());
        while let Some(result) = results.next().await {
            if !cancel.is_cancelled() {
                on_result(result);
            }
        }
        if !batch_pause.is_zero() && !cancel.is_cancelled() {
            tokio::time::sleep(batch_pause).await;
        }
    }
    if cancel.is_cancelled() {
        BatchStatus::Cancelled
    } else {
        BatchStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn immediate(identity: u32) -> ProbeResult<u32> {
        ProbeResult {
            identity,
            success: identity % 2 == 0,
            rtt: Duration::from_millis(1),
            detail: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn every_identity_yields_exactly_one_result() {
        let identities: Vec<u32> = (1..=254).collect();
        let cancel = CancellationToken::new();
        let mut batch_sizes = Vec::new();
        let mut results = Vec::new();
        let status = run_batches(
            &identities,
            50,
            Duration::from_millis(50),
            &cancel,
            immediate,
            |batch| batch_sizes.push(batch.len()),
            |result| results.push(result.identity),
        )
        .await;
        assert_eq!(status, BatchStatus::Completed);
        assert_eq!(results.len(), 254);
        assert_eq!(batch_sizes, vec![50, 50, 50, 50, 50, 4]);
        let mut sorted = results.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 254);
    }

    #[tokio::test(start_paused = true)]
    async fn batches_are_strictly_ordered() {
        let identities: Vec<u32> = (1..=20).collect();
        let cancel = CancellationToken::new();
        let mut firsts = Vec::new();
        let mut results = Vec::new();
        run_batches(
            &identities,
            5,
            Duration::ZERO,
            &cancel,
            immediate,
            |batch| firsts.push(batch[0]),
            |result| results.push(result.identity),
        )
        .await;
        assert_eq!(firsts, vec![1, 6, 11, 16]);
        // all of batch N is reported before batch N+1 launches
        for (index, chunk) in results.chunks(5).enumerate() {
            let lo = index as u32 * 5 + 1;
            let hi = lo + 4;
            assert!(chunk.iter().all(|id| (lo..=hi).contains(id)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_scheduling_and_discards_late_results() {
        let identities: Vec<u32> = (1..=100).collect();
        let cancel = CancellationToken::new();
        let mut batches = 0;
        let mut reported = 0;
        let status = run_batches(
            &identities,
            10,
            Duration::ZERO,
            &cancel,
            immediate,
            |_| batches += 1,
            |_| {
                reported += 1;
                // request cancellation from inside the first batch
                cancel.cancel();
            },
        )
        .await;
        assert_eq!(status, BatchStatus::Cancelled);
        // only the first batch was launched, and results arriving after the
        // request were discarded
        assert_eq!(batches, 1);
        assert_eq!(reported, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_batch_size_is_clamped() {
        let identities = vec![1u32, 2, 3];
        let cancel = CancellationToken::new();
        let mut results = 0;
        run_batches(
            &identities,
            0,
            Duration::ZERO,
            &cancel,
            immediate,
            |_| {},
            |_| results += 1,
        )
        .await;
        assert_eq!(results, 3);
    }
}
