//! Transport seams between the producer and the broker client.

use crate::message::EncodedMessage;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use rdkafka::error::KafkaError;
use std::time::Duration;

/// Where the broker stored an acknowledged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryAck {
    pub partition: i32,
    pub offset: i64,
}

/// A message the asynchronous transport accepted but the broker never
/// acknowledged. Reported out of band.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub topic: String,
    pub key: Bytes,
    pub error: KafkaError,
}

/// Request/acknowledge transport. `send_sync` resolves once the broker has
/// acknowledged the message or the send has failed.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn send_sync(&self, message: EncodedMessage) -> Result<DeliveryAck>;
}

/// Fire-and-enqueue transport. `enqueue` resolves once the message is
/// queued; it waits only when the input queue is full.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn enqueue(&self, message: EncodedMessage) -> Result<()>;

    /// Waits until everything enqueued so far has been handed to the broker
    /// and acknowledged, or `timeout` elapses.
    async fn flush(&self, timeout: Duration) -> Result<()>;
}
