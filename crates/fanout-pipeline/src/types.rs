//! Data types flowing through the batch pipeline.

use fanout_abstraction::Endpoint;
use serde::{Deserialize, Serialize};

/// One unit of input: a row with a textual payload.
///
/// Items are immutable once read. If the caller needs to correlate outputs
/// with inputs, the payload itself must carry an identifier the remote client
/// echoes back; the pipeline does not guarantee output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// The textual payload sent to the remote client.
    pub text: String,
}

impl Item {
    /// Creates a new item from a payload.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A fixed-size chunk of input items, processed as a unit by one worker.
///
/// Batches are never split once created; the last batch of a source may be
/// smaller than the configured batch size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch in the source sequence.
    pub index: usize,
    /// The items of this batch, in input order.
    pub items: Vec<Item>,
}

impl Batch {
    /// Returns the number of items in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the batch holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outputs for one batch, one per item, in the batch's item order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBatch {
    /// Index of the batch these outputs were derived from.
    pub batch_index: usize,
    /// The endpoint whose worker produced the outputs.
    pub endpoint: Endpoint,
    /// One output string per item.
    pub outputs: Vec<String>,
}

/// Record of a batch that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Index of the failed batch.
    pub batch_index: usize,
    /// The endpoint whose worker hit the failure.
    pub endpoint: Endpoint,
    /// Index within the batch of the item whose call failed.
    pub item_index: usize,
    /// The client error, rendered as text.
    pub error: String,
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "batch {} item {} failed on {}: {}",
            self.batch_index, self.item_index, self.endpoint, self.error
        )
    }
}

/// What a worker reports back for each batch it pulled: either a full set of
/// outputs, or a failure record. Exactly one of these is emitted per batch,
/// which is what lets the collector count instead of poll.
#[derive(Debug, Clone)]
pub enum WorkerOutput {
    /// The batch completed; one output per item.
    Completed(ResultBatch),
    /// The batch was aborted at the recorded item.
    Failed(BatchFailure),
}

/// Aggregate result of a pipeline run.
///
/// Output order is unspecified: workers compete for batches, so outputs are
/// only guaranteed to be complete as a multiset when `failures` is empty and
/// the run was not cancelled.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    /// All collected output strings, unordered.
    pub outputs: Vec<String>,
    /// Failure records for batches that did not complete.
    pub failures: Vec<BatchFailure>,
    /// Whether the run was cancelled before all batches were collected.
    pub cancelled: bool,
}

impl PipelineOutcome {
    /// Returns `true` if every batch completed and the run was not cancelled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}
