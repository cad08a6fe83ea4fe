//! Dispatcher: the single producer feeding the bounded batch queue.

use crate::error::Result;
use crate::queue::BatchSender;
use crate::types::Batch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Spawns the dispatcher task.
///
/// Drives the source, enqueuing each batch (suspending on backpressure), then
/// enqueues exactly `num_workers` shutdown markers so every worker eventually
/// observes one. The markers are sent on every exit path, including source
/// failure and cancellation; skipping them would leave workers suspended on
/// the queue forever.
///
/// The returned handle resolves to the number of batches dispatched, or to
/// the source error once all markers have been enqueued.
pub fn spawn<S>(
    source: S,
    sender: BatchSender,
    num_workers: usize,
    cancel: CancellationToken,
) -> JoinHandle<Result<usize>>
where
    S: Iterator<Item = Result<Batch>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut dispatched = 0usize;
        let mut source_error = None;

        for next in source {
            if cancel.is_cancelled() {
                debug!(dispatched, "Cancellation observed, stopping dispatch");
                break;
            }
            match next {
                Ok(batch) => {
                    let index = batch.index;
                    tokio::select! {
                        sent = sender.send_batch(batch) => {
                            if sent.is_err() {
                                warn!(batch = index, "Batch queue closed, stopping dispatch");
                                break;
                            }
                            debug!(batch = index, "Dispatched batch");
                            dispatched += 1;
                        }
                        () = cancel.cancelled() => {
                            debug!(batch = index, "Cancelled while waiting for queue space");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, dispatched, "Batch source failed");
                    source_error = Some(e);
                    break;
                }
            }
        }

        // One marker per worker, unconditionally.
        for _ in 0..num_workers {
            if sender.send_shutdown().await.is_err() {
                warn!("Batch queue closed before all shutdown markers were enqueued");
                break;
            }
        }

        info!(dispatched, workers = num_workers, "Dispatcher finished");
        match source_error {
            Some(e) => Err(e),
            None => Ok(dispatched),
        }
    })
}
