//! Concurrent batch-dispatch pipeline.
//!
//! Splits a large ordered dataset into batches, distributes those batches to
//! a fixed pool of workers bound 1:1 to remote endpoints, and collects the
//! per-item outputs into one aggregate result.
//!
//! Data flow:
//!
//! ```text
//! items -> BatchSource -> bounded batch queue -> worker pool -> results channel -> collector
//! ```
//!
//! The dispatcher is the single producer; it enqueues every batch and then
//! exactly one shutdown marker per worker, so the pool always terminates.
//! Workers compete for batches from the shared queue (work-stealing), which
//! naturally balances load toward faster endpoints at the cost of output
//! ordering. The collector counts one output per dispatched batch instead of
//! polling.
//!
//! ```no_run
//! use fanout_abstraction::{EchoClient, Endpoint};
//! use fanout_pipeline::{Item, Pipeline, PipelineConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> fanout_pipeline::Result<()> {
//! let config = PipelineConfig::new(vec![
//!     Endpoint::new("a", "http://10.0.0.1:8000/v1"),
//!     Endpoint::new("b", "http://10.0.0.2:8000/v1"),
//! ])
//! .with_batch_size(5);
//!
//! let pipeline = Pipeline::new(config, Arc::new(EchoClient))?;
//! let outcome = pipeline.run(vec![Item::new("classify this")]).await?;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod source;
pub mod types;
pub mod worker;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::Pipeline;
pub use source::BatchSource;
pub use types::{Batch, BatchFailure, Item, PipelineOutcome, ResultBatch, WorkerOutput};
