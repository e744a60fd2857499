mod common;

use common::{test_registry, QueueTransport, RecordingTransport, RejectingTransport};
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use topic_producer::codec::Codec;
use topic_producer::topic::MessageFormat;
use topic_producer::{Delivery, DeliveryMode, Error, MessageValue, Producer, Record};

#[derive(Serialize)]
struct Order {
    id: i64,
    qty: i32,
}

fn sync_producer() -> (Producer, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let producer =
        Producer::with_transport(DeliveryMode::Sync(transport.clone()), test_registry()).unwrap();
    (producer, transport)
}

#[tokio::test]
async fn test_json_record_reaches_transport() {
    let (producer, transport) = sync_producer();

    let value = MessageValue::record(&Order { id: 1, qty: 2 }).unwrap();
    producer.produce("orders", "k1", value).await.unwrap();

    let sent = transport.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].topic, "orders");
    assert_eq!(&sent[0].key[..], b"k1");
    assert_eq!(&sent[0].value[..], br#"{"id":1,"qty":2}"#);
}

#[tokio::test]
async fn test_number_bypasses_json() {
    let (producer, transport) = sync_producer();

    producer.produce("orders", "k1", 42).await.unwrap();

    assert_eq!(&transport.messages()[0].value[..], b"42");
}

#[tokio::test]
async fn test_strings_are_utf8_regardless_of_format() {
    let (producer, transport) = sync_producer();
    let text = "zoë {not json} ✓";

    for topic in ["orders", "audit", "orders-avro"] {
        producer.produce(topic, "k", text).await.unwrap();
    }

    for message in transport.messages() {
        assert_eq!(&message.value[..], text.as_bytes());
    }
}

#[tokio::test]
async fn test_unknown_topic_never_touches_transport() {
    let (producer, transport) = sync_producer();

    for topic in ["payments", "", "ORDERS"] {
        let result = producer.produce(topic, "k1", "v").await;
        assert!(matches!(result, Err(Error::UnknownTopic(_))), "topic {:?}", topic);
    }

    assert!(transport.messages().is_empty());
}

#[tokio::test]
async fn test_schema_violation_never_touches_transport() {
    let (producer, transport) = sync_producer();

    let value = MessageValue::classify(json!({"id": "abc", "qty": 2})).unwrap();
    let result = producer.produce("orders-avro", "k1", value).await;

    assert!(matches!(result, Err(Error::SchemaMismatch { .. })));
    assert!(transport.messages().is_empty());
}

#[tokio::test]
async fn test_avro_record_round_trip() {
    let (producer, transport) = sync_producer();

    let value = MessageValue::record(&Order { id: 7, qty: 3 }).unwrap();
    producer.produce("orders-avro", "k7", value).await.unwrap();

    let sent = transport.messages();
    let codecs = producer.encoder().codecs();
    let decoded = codecs
        .for_format(MessageFormat::Avro)
        .decode("orders-avro", &sent[0].value)
        .unwrap();

    assert_eq!(
        decoded,
        MessageValue::Record(Record::try_from(json!({"id": 7, "qty": 3})).unwrap())
    );
}

#[tokio::test]
async fn test_transport_error_is_passed_through() {
    let transport = Arc::new(RejectingTransport::default());
    let producer =
        Producer::with_transport(DeliveryMode::Sync(transport.clone()), test_registry()).unwrap();

    let result = producer.produce("orders", "k1", 1).await;

    assert!(matches!(result, Err(Error::Kafka(_))));
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_async_mode_enqueues() {
    let transport = Arc::new(QueueTransport::default());
    let producer =
        Producer::with_transport(DeliveryMode::Async(transport.clone()), test_registry()).unwrap();

    let delivery = producer
        .produce("audit", "k1", vec![0x00u8, 0xff])
        .await
        .unwrap();

    assert_eq!(delivery, Delivery::Enqueued);
    let queued = transport.queued.lock().unwrap();
    assert_eq!(&queued[0].value[..], &[0x00, 0xff]);
}

#[tokio::test]
async fn test_concurrent_produce_shares_codecs() {
    let (producer, transport) = sync_producer();
    let producer = Arc::new(producer);

    let tasks = (0..32).map(|i| {
        let producer = producer.clone();
        tokio::spawn(async move {
            let value = MessageValue::record(&Order { id: i, qty: 1 }).unwrap();
            let topic = if i % 2 == 0 { "orders" } else { "orders-avro" };
            producer.produce(topic, &i.to_string(), value).await
        })
    });

    for result in futures::future::join_all(tasks).await {
        assert!(matches!(result.unwrap(), Ok(Delivery::Acknowledged(_))));
    }

    let sent = transport.messages();
    assert_eq!(sent.len(), 32);
    assert_eq!(sent.iter().filter(|m| m.topic == "orders").count(), 16);
}
