//! End-to-end pipeline tests against in-process clients.

use async_trait::async_trait;
use fanout_abstraction::{ClientError, EchoClient, Endpoint, Failsafe, RemoteClient};
use fanout_pipeline::{Item, Pipeline, PipelineConfig, PipelineError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn three_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::new("a", "http://10.0.0.1:8000/v1"),
        Endpoint::new("b", "http://10.0.0.2:8000/v1"),
        Endpoint::new("c", "http://10.0.0.3:8000/v1"),
    ]
}

fn items(n: usize) -> Vec<Item> {
    (0..n).map(|i| Item::new(format!("item-{}", i))).collect()
}

/// Echoes after a fixed delay, standing in for a slow backend.
struct SlowClient {
    delay: Duration,
}

#[async_trait]
impl RemoteClient for SlowClient {
    async fn call(&self, _endpoint: &Endpoint, payload: &str) -> Result<String, ClientError> {
        tokio::time::sleep(self.delay).await;
        Ok(payload.to_string())
    }
}

/// Fails on payloads containing "poison", echoes everything else.
struct PoisonClient;

#[async_trait]
impl RemoteClient for PoisonClient {
    async fn call(&self, _endpoint: &Endpoint, payload: &str) -> Result<String, ClientError> {
        if payload.contains("poison") {
            Err(ClientError::ResponseError("poisoned payload".to_string()))
        } else {
            Ok(payload.to_string())
        }
    }
}

#[tokio::test]
async fn identity_round_trip_preserves_multiset() {
    // 23 items, batch_size 5, queue capacity 2, 3 endpoints: 5 batches of
    // sizes 5,5,5,5,3 over 3 workers.
    let config = PipelineConfig::new(three_endpoints())
        .with_batch_size(5)
        .with_max_batches_in_flight(2);
    let pipeline = Pipeline::new(config, Arc::new(EchoClient)).unwrap();

    let input = items(23);
    let mut expected: Vec<String> = input.iter().map(|i| i.text.clone()).collect();
    let outcome = pipeline.run(input).await.unwrap();

    assert!(outcome.is_complete());
    assert_eq!(outcome.outputs.len(), 23);

    let mut outputs = outcome.outputs;
    outputs.sort();
    expected.sort();
    assert_eq!(outputs, expected);
}

#[tokio::test]
async fn empty_endpoint_list_is_rejected_up_front() {
    let config = PipelineConfig::new(vec![]).with_batch_size(5);
    let result = Pipeline::new(config, Arc::new(EchoClient));
    assert!(matches!(result, Err(PipelineError::InvalidConfiguration(_))));
}

#[tokio::test]
async fn single_endpoint_handles_everything() {
    let config = PipelineConfig::new(vec![Endpoint::new("only", "http://localhost:8000/v1")])
        .with_batch_size(4)
        .with_max_batches_in_flight(1);
    let pipeline = Pipeline::new(config, Arc::new(EchoClient)).unwrap();

    let outcome = pipeline.run(items(9)).await.unwrap();
    assert_eq!(outcome.outputs.len(), 9);
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn poisoned_item_fails_its_batch_only() {
    let config = PipelineConfig::new(three_endpoints()).with_batch_size(5);
    let pipeline = Pipeline::new(config, Arc::new(PoisonClient)).unwrap();

    // Batch 1 (items 5..10) is poisoned at its third item.
    let mut input = items(23);
    input[7] = Item::new("poison");
    let outcome = pipeline.run(input).await.unwrap();

    assert_eq!(outcome.failures.len(), 1);
    let failure = &outcome.failures[0];
    assert_eq!(failure.batch_index, 1);
    assert_eq!(failure.item_index, 2);

    // The other four batches complete: 23 items minus the aborted batch of 5.
    assert_eq!(outcome.outputs.len(), 18);
    assert!(!outcome.cancelled);
}

#[tokio::test]
async fn failsafe_client_masks_failures_into_outputs() {
    let config = PipelineConfig::new(three_endpoints()).with_batch_size(5);
    let pipeline = Pipeline::new(config, Arc::new(Failsafe::new(PoisonClient))).unwrap();

    let mut input = items(23);
    input[7] = Item::new("poison");
    let outcome = pipeline.run(input).await.unwrap();

    // With the never-raise contract enforced, every item yields an output.
    assert!(outcome.is_complete());
    assert_eq!(outcome.outputs.len(), 23);
    assert_eq!(outcome.outputs.iter().filter(|o| o.starts_with("<error:")).count(), 1);
}

#[tokio::test]
async fn cancellation_returns_partial_outcome_and_joins() {
    let config = PipelineConfig::new(three_endpoints())
        .with_batch_size(5)
        .with_max_batches_in_flight(2);
    let pipeline =
        Pipeline::new(config, Arc::new(SlowClient { delay: Duration::from_millis(50) }))
            .unwrap();

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel_clone.cancel();
    });

    // The whole run must wind down promptly after cancellation; a hung task
    // would trip this outer timeout.
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run_with_cancel(items(23), cancel),
    )
    .await
    .expect("pipeline did not shut down after cancellation")
    .unwrap();

    assert!(outcome.cancelled);
    assert!(outcome.outputs.len() < 23);
}
