use super::*;
use crate::config::KafkaConfig;
use crate::message::EncodedMessage;
use crate::Error;
use bytes::Bytes;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::time::Duration;

fn create_test_kafka_config() -> KafkaConfig {
    let mut config = KafkaConfig::new(vec!["localhost:9092".to_string()]);
    config.compression = "none".to_string();
    config.acks = "1".to_string();
    config.linger_ms = 0;
    config.channel_capacity = 8;
    config
}

/// Nothing listens on port 1, so every delivery times out quickly.
fn create_unreachable_kafka_config() -> KafkaConfig {
    let mut config = create_test_kafka_config();
    config.brokers = vec!["127.0.0.1:1".to_string()];
    config.message_timeout_ms = 500;
    config
}

fn create_test_message(topic: &str) -> EncodedMessage {
    EncodedMessage {
        topic: topic.to_string(),
        key: Bytes::from_static(b"k1"),
        value: Bytes::from_static(br#"{"id":1,"qty":2}"#),
    }
}

#[test]
fn test_empty_broker_list_is_rejected() {
    let config = create_test_kafka_config();
    let result = KafkaSyncTransport::new(&[], &config);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_async_transport_requires_runtime() {
    let config = create_test_kafka_config();
    let result = KafkaAsyncTransport::new(&config.brokers, &config);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_send_sync_fails_without_broker() {
    let config = create_unreachable_kafka_config();
    let transport = KafkaSyncTransport::new(&config.brokers, &config).unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        transport.send_sync(create_test_message("topic-producer-test")),
    )
    .await
    .expect("delivery should time out well before the test does");

    assert!(matches!(result, Err(Error::Kafka(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_enqueue_reports_timeout_out_of_band() {
    let config = create_unreachable_kafka_config();
    let (transport, mut failures) = KafkaAsyncTransport::new(&config.brokers, &config).unwrap();

    // Accepted without waiting on the broker.
    transport
        .enqueue(create_test_message("topic-producer-test"))
        .await
        .unwrap();

    let failure = tokio::time::timeout(Duration::from_secs(10), failures.recv())
        .await
        .expect("no delivery failure reported")
        .expect("failure channel closed");

    assert_eq!(failure.topic, "topic-producer-test");
    assert_eq!(&failure.key[..], b"k1");
    assert!(
        matches!(
            failure.error,
            KafkaError::MessageProduction(RDKafkaErrorCode::MessageTimedOut)
        ),
        "got {:?}",
        failure.error
    );
}

#[tokio::test]
async fn test_queue_full_is_reported_after_queue_timeout() {
    let mut config = create_unreachable_kafka_config();
    // A 1 KiB local queue can never hold a 4 KiB message.
    config.buffer_memory = 1024;
    config.queue_timeout_ms = 100;
    let (transport, mut failures) = KafkaAsyncTransport::new(&config.brokers, &config).unwrap();

    let mut message = create_test_message("topic-producer-test");
    message.value = Bytes::from(vec![b'x'; 4096]);
    transport.enqueue(message).await.unwrap();

    let failure = tokio::time::timeout(Duration::from_secs(10), failures.recv())
        .await
        .expect("no delivery failure reported")
        .expect("failure channel closed");

    assert!(
        matches!(
            failure.error,
            KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull)
        ),
        "got {:?}",
        failure.error
    );
}

#[tokio::test]
#[ignore] // May fail if system has specific network configurations
async fn test_transport_creation() {
    let config = create_test_kafka_config();

    // Should succeed even if Kafka is not running (just creates the producer)
    assert!(KafkaSyncTransport::new(&config.brokers, &config).is_ok());
    assert!(KafkaAsyncTransport::new(&config.brokers, &config).is_ok());
}

#[tokio::test]
#[ignore] // Requires running Kafka
async fn test_send_sync_is_acknowledged() {
    let config = create_test_kafka_config();
    let transport = KafkaSyncTransport::new(&config.brokers, &config).unwrap();

    let ack = transport
        .send_sync(create_test_message("topic-producer-test"))
        .await
        .unwrap();
    assert!(ack.offset >= 0);
}

#[tokio::test]
#[ignore] // Requires running Kafka
async fn test_enqueue_then_flush() {
    let config = create_test_kafka_config();
    let (transport, mut failures) = KafkaAsyncTransport::new(&config.brokers, &config).unwrap();

    for _ in 0..10 {
        transport
            .enqueue(create_test_message("topic-producer-test"))
            .await
            .unwrap();
    }
    transport.flush(Duration::from_secs(10)).await.unwrap();

    assert!(failures.try_recv().is_err());
}
