#![allow(dead_code)]

use async_trait::async_trait;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use topic_producer::kafka::{AsyncTransport, DeliveryAck, SyncTransport};
use topic_producer::topic::{MessageFormat, TopicConfig, TopicRegistry};
use topic_producer::{EncodedMessage, Result};

pub const ORDER_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Order",
    "namespace": "shop",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "qty", "type": "int"}
    ]
}"#;

/// Registry shared by the integration tests.
pub fn test_registry() -> TopicRegistry {
    TopicRegistry::new(vec![
        TopicConfig::new("orders", MessageFormat::Json),
        TopicConfig::new("audit", MessageFormat::String),
        TopicConfig::avro("orders-avro", ORDER_SCHEMA),
    ])
    .unwrap()
}

/// Sync transport that acknowledges everything and keeps what it saw.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<EncodedMessage>>,
}

impl RecordingTransport {
    pub fn messages(&self) -> Vec<EncodedMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncTransport for RecordingTransport {
    async fn send_sync(&self, message: EncodedMessage) -> Result<DeliveryAck> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(DeliveryAck {
            partition: 0,
            offset: sent.len() as i64 - 1,
        })
    }
}

/// Sync transport whose broker always refuses.
#[derive(Default)]
pub struct RejectingTransport {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl SyncTransport for RejectingTransport {
    async fn send_sync(&self, _message: EncodedMessage) -> Result<DeliveryAck> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(KafkaError::MessageProduction(RDKafkaErrorCode::MessageSizeTooLarge).into())
    }
}

/// Async transport that queues in memory.
#[derive(Default)]
pub struct QueueTransport {
    pub queued: Mutex<Vec<EncodedMessage>>,
}

#[async_trait]
impl AsyncTransport for QueueTransport {
    async fn enqueue(&self, message: EncodedMessage) -> Result<()> {
        self.queued.lock().unwrap().push(message);
        Ok(())
    }

    async fn flush(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }
}
