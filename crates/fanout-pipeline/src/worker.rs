//! Worker pool: N workers, each bound to one endpoint, competing for batches.

use crate::queue::{BatchReceiver, QueueMessage};
use crate::types::{Batch, BatchFailure, ResultBatch, WorkerOutput};
use fanout_abstraction::{Endpoint, RemoteClient};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Spawns one worker per endpoint.
///
/// Workers are symmetric: they pull from the shared queue rather than being
/// assigned batches up front, so load drifts toward faster endpoints. Each
/// worker exits when it pulls a shutdown marker or the queue closes. After
/// cancellation a worker keeps pulling but discards batches unprocessed, so
/// the queue drains and the dispatcher's markers can get through.
pub fn spawn_workers(
    endpoints: &[Endpoint],
    client: Arc<dyn RemoteClient>,
    receiver: BatchReceiver,
    results_tx: mpsc::UnboundedSender<WorkerOutput>,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    endpoints
        .iter()
        .enumerate()
        .map(|(worker_id, endpoint)| {
            let endpoint = endpoint.clone();
            let client = Arc::clone(&client);
            let receiver = receiver.clone();
            let results_tx = results_tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                run_worker(worker_id, endpoint, client, receiver, results_tx, cancel).await;
            })
        })
        .collect()
}

async fn run_worker(
    worker_id: usize,
    endpoint: Endpoint,
    client: Arc<dyn RemoteClient>,
    receiver: BatchReceiver,
    results_tx: mpsc::UnboundedSender<WorkerOutput>,
    cancel: CancellationToken,
) {
    debug!(worker = worker_id, endpoint = %endpoint, "Worker started");
    loop {
        let Some(message) = receiver.recv().await else {
            debug!(worker = worker_id, "Batch queue closed");
            break;
        };
        let batch = match message {
            QueueMessage::Shutdown => {
                debug!(worker = worker_id, "Worker received shutdown marker");
                break;
            }
            QueueMessage::Batch(batch) => batch,
        };

        if cancel.is_cancelled() {
            debug!(worker = worker_id, batch = batch.index, "Discarding batch after cancellation");
            continue;
        }

        let output = process_batch(&*client, &endpoint, batch).await;
        if results_tx.send(output).is_err() {
            warn!(worker = worker_id, "Results channel closed, worker exiting");
            break;
        }
    }
    debug!(worker = worker_id, endpoint = %endpoint.name, "Worker stopped");
}

/// Processes every item of a batch sequentially, preserving item order.
///
/// A client error aborts the batch at the failing item and is reported as a
/// [`WorkerOutput::Failed`] record; outputs of earlier items in the batch are
/// dropped with it, keeping the one-output-per-batch accounting exact.
async fn process_batch(
    client: &dyn RemoteClient,
    endpoint: &Endpoint,
    batch: Batch,
) -> WorkerOutput {
    debug!(endpoint = %endpoint.name, batch = batch.index, items = batch.len(), "Processing batch");
    let mut outputs = Vec::with_capacity(batch.len());
    for (item_index, item) in batch.items.iter().enumerate() {
        match client.call(endpoint, &item.text).await {
            Ok(output) => outputs.push(output),
            Err(e) => {
                warn!(
                    endpoint = %endpoint.name,
                    batch = batch.index,
                    item = item_index,
                    error = %e,
                    "Item call failed, aborting batch"
                );
                return WorkerOutput::Failed(BatchFailure {
                    batch_index: batch.index,
                    endpoint: endpoint.clone(),
                    item_index,
                    error: e.to_string(),
                });
            }
        }
    }
    WorkerOutput::Completed(ResultBatch {
        batch_index: batch.index,
        endpoint: endpoint.clone(),
        outputs,
    })
}
