//! Pipeline configuration.

use crate::error::{PipelineError, Result};
use fanout_abstraction::Endpoint;
use serde::Deserialize;
use std::time::Duration;

fn default_batch_size() -> usize {
    10
}

fn default_max_batches_in_flight() -> usize {
    4
}

fn default_liveness_timeout_secs() -> u64 {
    30
}

/// Configuration for a pipeline run.
///
/// Can be built in code or deserialized from TOML:
///
/// ```toml
/// batch_size = 5
/// max_batches_in_flight = 2
///
/// [[endpoints]]
/// name = "a"
/// url = "http://10.0.0.1:8000/v1"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Items per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Capacity of the bounded batch queue. Bounds in-flight memory to
    /// `max_batches_in_flight * batch_size` items regardless of input size.
    #[serde(default = "default_max_batches_in_flight")]
    pub max_batches_in_flight: usize,
    /// Remote backends; one worker is started per endpoint.
    pub endpoints: Vec<Endpoint>,
    /// Liveness window for the collector, in seconds. Expiry only logs a
    /// warning; it never terminates collection.
    #[serde(default = "default_liveness_timeout_secs")]
    pub liveness_timeout_secs: u64,
}

impl PipelineConfig {
    /// Creates a configuration with default batching parameters.
    #[must_use]
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            batch_size: default_batch_size(),
            max_batches_in_flight: default_max_batches_in_flight(),
            endpoints,
            liveness_timeout_secs: default_liveness_timeout_secs(),
        }
    }

    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the batch queue capacity.
    #[must_use]
    pub fn with_max_batches_in_flight(mut self, max_batches_in_flight: usize) -> Self {
        self.max_batches_in_flight = max_batches_in_flight;
        self
    }

    /// Number of workers, one per configured endpoint.
    #[must_use]
    pub fn num_workers(&self) -> usize {
        self.endpoints.len()
    }

    /// The collector liveness window as a `Duration`.
    #[must_use]
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfiguration` if any batching parameter
    /// is zero or no endpoints are configured.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.max_batches_in_flight == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "max_batches_in_flight must be greater than zero".to_string(),
            ));
        }
        if self.endpoints.is_empty() {
            return Err(PipelineError::InvalidConfiguration(
                "at least one endpoint is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a configuration from a TOML document.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfiguration` if the document does not
    /// parse or fails validation.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| PipelineError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Vec<Endpoint> {
        vec![Endpoint::new("a", "http://localhost:8000/v1")]
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new(endpoints());
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_batches_in_flight, 4);
        assert_eq!(config.num_workers(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = PipelineConfig::new(endpoints()).with_batch_size(0);
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let config = PipelineConfig::new(endpoints()).with_max_batches_in_flight(0);
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_empty_endpoints_rejected() {
        let config = PipelineConfig::new(vec![]);
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_from_toml() {
        let raw = r#"
            batch_size = 5
            max_batches_in_flight = 2

            [[endpoints]]
            name = "a"
            url = "http://10.0.0.1:8000/v1"

            [[endpoints]]
            name = "b"
            url = "http://10.0.0.2:8000/v1"
        "#;
        let config = PipelineConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.max_batches_in_flight, 2);
        assert_eq!(config.num_workers(), 2);
        assert_eq!(config.liveness_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(PipelineConfig::from_toml_str("endpoints = []").is_err());
        assert!(PipelineConfig::from_toml_str("not toml at all [").is_err());
    }
}
