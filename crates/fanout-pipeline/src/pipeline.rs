//! Top-level pipeline run: wiring, task lifecycle, aggregation.

use crate::collector;
use crate::config::PipelineConfig;
use crate::dispatcher;
use crate::error::Result;
use crate::queue;
use crate::source::BatchSource;
use crate::types::{Item, PipelineOutcome};
use crate::worker;
use fanout_abstraction::RemoteClient;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The concurrent batch-dispatch pipeline.
///
/// Splits an ordered input into batches, fans them out over one worker per
/// configured endpoint through a bounded queue, and collects per-item outputs
/// back into a flat, unordered collection. Each run owns its channels and
/// tasks; the value itself is reusable across runs.
pub struct Pipeline {
    config: PipelineConfig,
    client: Arc<dyn RemoteClient>,
}

impl Pipeline {
    /// Creates a pipeline, validating the configuration up front.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfiguration` before any task is
    /// spawned if the configuration is invalid.
    pub fn new(config: PipelineConfig, client: Arc<dyn RemoteClient>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// Runs the pipeline over the given items to completion.
    ///
    /// The returned outputs are complete as a multiset (one per input item
    /// when `failures` is empty) but in no particular order; callers that
    /// need correlation must put an identifier in the item payload and have
    /// the client echo it back.
    pub async fn run(&self, items: Vec<Item>) -> Result<PipelineOutcome> {
        self.run_with_cancel(items, CancellationToken::new()).await
    }

    /// Runs the pipeline, stopping early when `cancel` fires.
    ///
    /// On cancellation no further batches are dispatched, queued batches are
    /// discarded, every worker still receives its shutdown marker, and the
    /// outcome carries whatever outputs were already collected with
    /// `cancelled` set.
    pub async fn run_with_cancel(
        &self,
        items: Vec<Item>,
        cancel: CancellationToken,
    ) -> Result<PipelineOutcome> {
        let total_items = items.len();
        let expected_batches = BatchSource::expected_batches(total_items, self.config.batch_size);
        let source = BatchSource::new(items, self.config.batch_size)?;

        info!(
            total_items,
            expected_batches,
            batch_size = self.config.batch_size,
            max_batches_in_flight = self.config.max_batches_in_flight,
            workers = self.config.num_workers(),
            "Starting pipeline run"
        );

        let (batch_tx, batch_rx) = queue::bounded(self.config.max_batches_in_flight);
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();

        let dispatcher_handle =
            dispatcher::spawn(source, batch_tx, self.config.num_workers(), cancel.clone());
        let worker_handles = worker::spawn_workers(
            &self.config.endpoints,
            Arc::clone(&self.client),
            batch_rx,
            results_tx,
            cancel.clone(),
        );

        let outcome = collector::collect(
            &mut results_rx,
            expected_batches,
            self.config.liveness_timeout(),
            &cancel,
        )
        .await;

        // All batches are accounted for, so the tasks are finished or about
        // to finish; join them before reporting.
        match dispatcher_handle.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                error!(error = %e, "Batch source failed during run");
                return Err(e);
            }
            Err(e) => error!(error = %e, "Dispatcher join error"),
        }
        for (worker_id, handle) in worker_handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker = worker_id, error = %e, "Worker join error");
            }
        }

        info!(
            outputs = outcome.outputs.len(),
            failures = outcome.failures.len(),
            cancelled = outcome.cancelled,
            "Pipeline run finished"
        );
        Ok(outcome)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("config", &self.config).finish_non_exhaustive()
    }
}
