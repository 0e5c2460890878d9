use crate::types::{ProbeOutcome, ProbeRequest};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run-wide cancellation flag, shared between the dispatcher, the Ctrl-C
/// handler and the optional run timer.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Dispatch probes across a bounded pool of workers.
///
/// At most `worker_count` requests are in flight; candidates are pulled on
/// demand, never queued ahead, and the bounded channel applies backpressure
/// on the consumer side. Outcomes arrive in completion order; the original
/// candidate index rides in each outcome so the consumer can reconstruct
/// source order. Cancellation stops dispatch of new candidates and lets
/// in-flight probes finish; outcomes already produced are preserved.
///
/// `worker_count = 1` degenerates to the legacy fully sequential behavior.
pub fn run<F, Fut>(
    requests: Vec<ProbeRequest>,
    worker_count: usize,
    cancel: CancelToken,
    probe_fn: F,
) -> mpsc::Receiver<ProbeOutcome>
where
    F: Fn(ProbeRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeOutcome> + Send + 'static,
{
    let workers = worker_count.max(1);
    let (tx, rx) = mpsc::channel(workers);

    tokio::spawn(async move {
        let mut outcomes = stream::iter(requests)
            .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
            .map(probe_fn)
            .buffer_unordered(workers);

        while let Some(outcome) = outcomes.next().await {
            if tx.send(outcome).await.is_err() {
                // consumer dropped, stop draining
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProbeError, ProbeResult};
    use std::time::Duration;
    use url::Url;

    fn requests(n: usize) -> Vec<ProbeRequest> {
        (0..n)
            .map(|i| ProbeRequest {
                index: i,
                candidate: format!("path-{}", i),
                url: Url::parse(&format!("http://target.test/path-{}", i)).unwrap(),
            })
            .collect()
    }

    fn ok_outcome(req: ProbeRequest) -> ProbeOutcome {
        ProbeOutcome {
            index: req.index,
            candidate: req.candidate,
            url: req.url.to_string(),
            result: ProbeResult::Success {
                status: 200,
                body: None,
                elapsed: Duration::from_millis(1),
            },
        }
    }

    async fn collect(mut rx: mpsc::Receiver<ProbeOutcome>) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    #[tokio::test]
    async fn test_one_outcome_per_candidate() {
        for workers in [1usize, 10, 100] {
            let rx = run(requests(25), workers, CancelToken::new(), |req| async move {
                ok_outcome(req)
            });
            let outcomes = collect(rx).await;
            assert_eq!(outcomes.len(), 25, "worker_count = {}", workers);

            let mut indexes: Vec<usize> = outcomes.iter().map(|o| o.index).collect();
            indexes.sort_unstable();
            assert_eq!(indexes, (0..25).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_empty_input_completes_cleanly() {
        let rx = run(Vec::new(), 10, CancelToken::new(), |req| async move {
            ok_outcome(req)
        });
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_the_run() {
        let rx = run(requests(8), 4, CancelToken::new(), |req| async move {
            if req.index == 3 {
                ProbeOutcome::failure(
                    req.index,
                    req.candidate,
                    req.url.to_string(),
                    ProbeError::Timeout,
                )
            } else {
                ok_outcome(req)
            }
        });
        let outcomes = collect(rx).await;
        assert_eq!(outcomes.len(), 8);

        let failed: Vec<&ProbeOutcome> = outcomes
            .iter()
            .filter(|o| matches!(o.result, ProbeResult::Failure(_)))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].index, 3);
    }

    #[tokio::test]
    async fn test_cancellation_stops_dispatch() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let rx = run(requests(50), 4, cancel, |req| async move { ok_outcome(req) });
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_mode_preserves_source_order() {
        let rx = run(requests(10), 1, CancelToken::new(), |req| async move {
            ok_outcome(req)
        });
        let indexes: Vec<usize> = collect(rx).await.iter().map(|o| o.index).collect();
        assert_eq!(indexes, (0..10).collect::<Vec<_>>());
    }
}
