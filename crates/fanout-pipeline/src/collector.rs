//! Collector: aggregates worker outputs into the final outcome.

use crate::types::{PipelineOutcome, WorkerOutput};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drains the results channel until `expected_batches` outputs have arrived.
///
/// Every batch produces exactly one [`WorkerOutput`] (completed or failed),
/// so receiving that many is the termination condition; no polling and no
/// timeout is needed for correctness. The liveness window only logs a warning
/// when nothing arrives for a while, as a stall diagnostic.
///
/// On cancellation the collector stops counting and instead drains whatever
/// the workers still emit until the channel closes, reporting a partial,
/// cancelled outcome.
pub async fn collect(
    results_rx: &mut mpsc::UnboundedReceiver<WorkerOutput>,
    expected_batches: usize,
    liveness_timeout: Duration,
    cancel: &CancellationToken,
) -> PipelineOutcome {
    let mut outcome = PipelineOutcome::default();
    let mut received = 0usize;

    while received < expected_batches {
        tokio::select! {
            () = cancel.cancelled() => {
                info!(received, expected = expected_batches, "Cancellation observed, draining remaining results");
                outcome.cancelled = true;
                break;
            }
            next = tokio::time::timeout(liveness_timeout, results_rx.recv()) => match next {
                Ok(Some(output)) => {
                    received += 1;
                    record(&mut outcome, output);
                }
                Ok(None) => {
                    warn!(received, expected = expected_batches, "Results channel closed before all batches arrived");
                    break;
                }
                Err(_) => {
                    // Diagnostic only; keep waiting.
                    warn!(
                        received,
                        expected = expected_batches,
                        window_secs = liveness_timeout.as_secs(),
                        "No result batch within liveness window"
                    );
                }
            },
        }
    }

    if outcome.cancelled {
        while let Some(output) = results_rx.recv().await {
            received += 1;
            record(&mut outcome, output);
        }
    }

    debug!(
        received,
        outputs = outcome.outputs.len(),
        failures = outcome.failures.len(),
        cancelled = outcome.cancelled,
        "Collection finished"
    );
    outcome
}

fn record(outcome: &mut PipelineOutcome, output: WorkerOutput) {
    match output {
        WorkerOutput::Completed(rb) => {
            debug!(batch = rb.batch_index, endpoint = %rb.endpoint.name, items = rb.outputs.len(), "Collected result batch");
            outcome.outputs.extend(rb.outputs);
        }
        WorkerOutput::Failed(failure) => {
            warn!(batch = failure.batch_index, endpoint = %failure.endpoint.name, "Collected failure record");
            outcome.failures.push(failure);
        }
    }
}
