// Error types for the batch pipeline

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Invalid configuration, rejected before any task is spawned
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The batch source failed mid-iteration
    #[error("Batch source failed: {0}")]
    Source(String),

    /// The run was cancelled by the caller
    #[error("Pipeline run cancelled")]
    Cancelled,
}
