//! Bounded batch queue shared by the dispatcher and the worker pool.
//!
//! A single bounded channel carries batches and shutdown markers from the one
//! producer to N competing consumers. The bound gives backpressure: the
//! dispatcher suspends when `max_batches_in_flight` messages are resident, so
//! peak in-flight memory is independent of input size.

use crate::types::Batch;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// A message on the batch queue.
#[derive(Debug)]
pub enum QueueMessage {
    /// A batch of work.
    Batch(Batch),
    /// Marker telling exactly one consumer to stop.
    Shutdown,
}

/// Creates a bounded batch queue with the given capacity.
#[must_use]
pub fn bounded(capacity: usize) -> (BatchSender, BatchReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (BatchSender { tx }, BatchReceiver { rx: Arc::new(Mutex::new(rx)) })
}

/// Producer half of the batch queue.
#[derive(Debug, Clone)]
pub struct BatchSender {
    tx: mpsc::Sender<QueueMessage>,
}

impl BatchSender {
    /// Enqueues a batch, suspending while the queue is full.
    ///
    /// # Errors
    /// Returns an error if every receiver has been dropped.
    pub async fn send_batch(
        &self,
        batch: Batch,
    ) -> std::result::Result<(), mpsc::error::SendError<QueueMessage>> {
        self.tx.send(QueueMessage::Batch(batch)).await
    }

    /// Enqueues one shutdown marker, suspending while the queue is full.
    ///
    /// # Errors
    /// Returns an error if every receiver has been dropped.
    pub async fn send_shutdown(
        &self,
    ) -> std::result::Result<(), mpsc::error::SendError<QueueMessage>> {
        self.tx.send(QueueMessage::Shutdown).await
    }
}

/// Consumer half of the batch queue, shared by all workers.
///
/// Workers compete for messages through a mutex around the single receiver;
/// each `recv` consumes exactly one message, so a shutdown marker can never
/// be observed by two workers.
#[derive(Debug, Clone)]
pub struct BatchReceiver {
    rx: Arc<Mutex<mpsc::Receiver<QueueMessage>>>,
}

impl BatchReceiver {
    /// Pulls the next message, suspending while the queue is empty.
    ///
    /// Returns `None` once the sender is dropped and the queue is drained.
    pub async fn recv(&self) -> Option<QueueMessage> {
        self.rx.lock().await.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Batch, Item};
    use std::time::Duration;

    fn batch(index: usize) -> Batch {
        Batch { index, items: vec![Item::new(format!("item-{}", index))] }
    }

    #[tokio::test]
    async fn test_fifo_delivery() {
        let (tx, rx) = bounded(4);
        tx.send_batch(batch(0)).await.unwrap();
        tx.send_batch(batch(1)).await.unwrap();
        tx.send_shutdown().await.unwrap();

        assert!(matches!(rx.recv().await, Some(QueueMessage::Batch(b)) if b.index == 0));
        assert!(matches!(rx.recv().await, Some(QueueMessage::Batch(b)) if b.index == 1));
        assert!(matches!(rx.recv().await, Some(QueueMessage::Shutdown)));
    }

    #[tokio::test]
    async fn test_send_blocks_when_full() {
        let (tx, _rx) = bounded(2);
        tx.send_batch(batch(0)).await.unwrap();
        tx.send_batch(batch(1)).await.unwrap();

        // Third send must suspend on backpressure.
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), tx.send_batch(batch(2))).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_consumed_exactly_once() {
        let (tx, rx) = bounded(2);
        tx.send_shutdown().await.unwrap();

        let first = rx.clone();
        assert!(matches!(first.recv().await, Some(QueueMessage::Shutdown)));

        // A second consumer must not see the same marker again.
        let starved = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        assert!(starved.is_err());
    }

    #[tokio::test]
    async fn test_recv_none_after_sender_dropped() {
        let (tx, rx) = bounded(2);
        tx.send_batch(batch(0)).await.unwrap();
        drop(tx);

        assert!(matches!(rx.recv().await, Some(QueueMessage::Batch(_))));
        assert!(rx.recv().await.is_none());
    }
}
