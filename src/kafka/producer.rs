use super::transport::{DeliveryAck, SyncTransport};
use crate::config::KafkaConfig;
use crate::message::EncodedMessage;
use crate::{Error, Result};
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use std::time::Duration;
use tracing::{debug, info};

pub(crate) fn create_producer(brokers: &[String], config: &KafkaConfig) -> Result<FutureProducer> {
    if brokers.is_empty() {
        return Err(Error::Config("At least one Kafka broker is required".to_string()));
    }

    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", brokers.join(","))
        .set("compression.type", &config.compression)
        .set("acks", &config.acks)
        .set("linger.ms", config.linger_ms.to_string())
        .set("batch.size", config.batch_size.to_string())
        .set(
            "queue.buffering.max.kbytes",
            (config.buffer_memory / 1024).max(1).to_string(),
        )
        .set("message.timeout.ms", config.message_timeout_ms.to_string())
        .create()
        .map_err(Error::Kafka)?;

    info!(
        brokers = %brokers.join(","),
        acks = %config.acks,
        compression = %config.compression,
        "Kafka producer created"
    );

    Ok(producer)
}

/// Sends each message and waits for the broker's acknowledgment.
pub struct KafkaSyncTransport {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaSyncTransport {
    pub fn new(brokers: &[String], config: &KafkaConfig) -> Result<Self> {
        let producer = create_producer(brokers, config)?;

        Ok(Self {
            producer,
            queue_timeout: Duration::from_millis(config.queue_timeout_ms),
        })
    }
}

#[async_trait]
impl SyncTransport for KafkaSyncTransport {
    async fn send_sync(&self, message: EncodedMessage) -> Result<DeliveryAck> {
        let record = FutureRecord::to(&message.topic)
            .key(&message.key[..])
            .payload(&message.value[..]);

        let (partition, offset) = self
            .producer
            .send(record, Timeout::After(self.queue_timeout))
            .await
            .map_err(|(e, _)| Error::Kafka(e))?;

        debug!(topic = %message.topic, partition, offset, "Message acknowledged");
        Ok(DeliveryAck { partition, offset })
    }
}
