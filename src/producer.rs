//! Producer facade.
//!
//! A [`Producer`] pairs a delivery mode, fixed at construction, with the
//! topic registry and codecs. Every [`Producer::produce`] call encodes first
//! and touches the transport only when encoding succeeded.
//!
//! # Example
//!
//! ```rust,no_run
//! use topic_producer::config::KafkaConfig;
//! use topic_producer::topic::{MessageFormat, TopicConfig};
//! use topic_producer::{Producer, ProducerMode};
//!
//! # async fn example() -> topic_producer::Result<()> {
//! let brokers = vec!["localhost:9092".to_string()];
//! let producer = Producer::connect(
//!     ProducerMode::Sync,
//!     &brokers,
//!     vec![TopicConfig::new("orders", MessageFormat::Json)],
//!     &KafkaConfig::new(brokers.clone()),
//! )?;
//!
//! producer.produce("orders", "k1", 42).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::{Config, KafkaConfig};
use crate::diagnostics::{ErrorSink, LogCategory, TracingSink};
use crate::encoder::MessageEncoder;
use crate::kafka::{
    AsyncTransport, DeliveryAck, DeliveryFailure, KafkaAsyncTransport, KafkaSyncTransport,
    SyncTransport,
};
use crate::message::MessageValue;
use crate::topic::{TopicConfig, TopicRegistry};
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerMode {
    /// Wait for the broker to acknowledge each message.
    Sync,
    /// Enqueue and return; failures are reported out of band.
    Async,
}

impl ProducerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProducerMode::Sync => "sync",
            ProducerMode::Async => "async",
        }
    }
}

impl fmt::Display for ProducerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProducerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(ProducerMode::Sync),
            "async" => Ok(ProducerMode::Async),
            _ => Err(Error::InvalidProducerMode(s.to_string())),
        }
    }
}

/// The transport handle, tagged by how it delivers.
#[derive(Clone)]
pub enum DeliveryMode {
    Sync(Arc<dyn SyncTransport>),
    Async(Arc<dyn AsyncTransport>),
}

impl DeliveryMode {
    pub fn mode(&self) -> ProducerMode {
        match self {
            DeliveryMode::Sync(_) => ProducerMode::Sync,
            DeliveryMode::Async(_) => ProducerMode::Async,
        }
    }
}

impl fmt::Debug for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeliveryMode::{:?}", self.mode())
    }
}

/// Outcome of a successful [`Producer::produce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The broker stored the message.
    Acknowledged(DeliveryAck),
    /// The message is queued for delivery.
    Enqueued,
}

pub struct Producer {
    delivery: DeliveryMode,
    encoder: MessageEncoder,
    sink: Arc<dyn ErrorSink>,
    delivery_failures: Mutex<Option<mpsc::UnboundedReceiver<DeliveryFailure>>>,
}

impl Producer {
    /// Creates a Kafka-backed producer that reports errors to tracing.
    ///
    /// Topic configuration is validated and schemas are bound before the
    /// Kafka client is created. Nothing is returned half-built: any failure
    /// leaves no producer behind.
    pub fn connect(
        mode: ProducerMode,
        brokers: &[String],
        topics: Vec<TopicConfig>,
        kafka: &KafkaConfig,
    ) -> Result<Self> {
        Self::connect_with_sink(mode, brokers, topics, kafka, Arc::new(TracingSink))
    }

    /// Like [`Producer::connect`], with construction and produce errors
    /// reported to `sink`.
    pub fn connect_with_sink(
        mode: ProducerMode,
        brokers: &[String],
        topics: Vec<TopicConfig>,
        kafka: &KafkaConfig,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self> {
        Self::connect_registry(mode, brokers, TopicRegistry::new(topics), kafka, sink)
    }

    /// Creates a producer from loaded configuration. The mode string is
    /// checked before anything else is built.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with_sink(config, Arc::new(TracingSink))
    }

    pub fn from_config_with_sink(config: &Config, sink: Arc<dyn ErrorSink>) -> Result<Self> {
        let mode = config
            .producer
            .mode
            .parse::<ProducerMode>()
            .map_err(|e| record(sink.as_ref(), e))?;
        let registry = TopicRegistry::from_settings(&config.topics);
        Self::connect_registry(mode, &config.kafka.brokers, registry, &config.kafka, sink)
    }

    fn connect_registry(
        mode: ProducerMode,
        brokers: &[String],
        registry: Result<TopicRegistry>,
        kafka: &KafkaConfig,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self> {
        let report = |e| record(sink.as_ref(), e);
        let encoder = registry.and_then(MessageEncoder::new).map_err(report)?;

        let (delivery, failures) = match mode {
            ProducerMode::Sync => {
                let transport = KafkaSyncTransport::new(brokers, kafka).map_err(report)?;
                (DeliveryMode::Sync(Arc::new(transport)), None)
            }
            ProducerMode::Async => {
                let (transport, failures) =
                    KafkaAsyncTransport::new(brokers, kafka).map_err(report)?;
                (DeliveryMode::Async(Arc::new(transport)), Some(failures))
            }
        };

        info!(
            mode = %mode,
            topics = encoder.registry().len(),
            "Producer ready"
        );

        Ok(Self::assemble(delivery, encoder, sink, failures))
    }

    /// Creates a producer over an existing transport. Errors are reported
    /// to tracing until [`Producer::with_sink`] replaces the sink.
    pub fn with_transport(delivery: DeliveryMode, registry: TopicRegistry) -> Result<Self> {
        let sink: Arc<dyn ErrorSink> = Arc::new(TracingSink);
        let encoder = MessageEncoder::new(registry).map_err(|e| record(sink.as_ref(), e))?;
        Ok(Self::assemble(delivery, encoder, sink, None))
    }

    fn assemble(
        delivery: DeliveryMode,
        encoder: MessageEncoder,
        sink: Arc<dyn ErrorSink>,
        failures: Option<mpsc::UnboundedReceiver<DeliveryFailure>>,
    ) -> Self {
        Self {
            delivery,
            encoder,
            sink,
            delivery_failures: Mutex::new(failures),
        }
    }

    /// Replaces the sink for errors from later calls. Construction errors
    /// have already gone to the sink given at construction; use
    /// [`Producer::connect_with_sink`] or [`Producer::from_config_with_sink`]
    /// to capture those.
    pub fn with_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn mode(&self) -> ProducerMode {
        self.delivery.mode()
    }

    pub fn encoder(&self) -> &MessageEncoder {
        &self.encoder
    }

    /// Takes the receiver of out-of-band delivery failures. Only Kafka
    /// async producers have one, and it can be taken once.
    pub fn take_delivery_failures(&self) -> Option<mpsc::UnboundedReceiver<DeliveryFailure>> {
        // The guarded Option stays consistent even if a holder panicked.
        self.delivery_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Encodes `value` for `topic` and hands it to the transport.
    ///
    /// In sync mode this resolves after the broker acknowledged the message.
    /// In async mode it resolves once the message is queued.
    ///
    /// # Errors
    ///
    /// Encoding errors (`UnknownTopic`, `UnsupportedValueKind`,
    /// `Serialization`, `SchemaMismatch`) are returned before the transport
    /// is touched. Transport errors are passed through unchanged.
    #[instrument(skip(self, key, value), fields(mode = %self.mode()))]
    pub async fn produce(
        &self,
        topic: &str,
        key: &str,
        value: impl Into<MessageValue>,
    ) -> Result<Delivery> {
        let value = value.into();
        let message = self
            .encoder
            .encode(topic, key, &value)
            .map_err(|e| self.fail(e))?;

        debug!(kind = %value.kind(), len = message.value.len(), "Dispatching message");

        match &self.delivery {
            DeliveryMode::Sync(transport) => transport
                .send_sync(message)
                .await
                .map(Delivery::Acknowledged)
                .map_err(|e| self.fail(e)),
            DeliveryMode::Async(transport) => transport
                .enqueue(message)
                .await
                .map(|()| Delivery::Enqueued)
                .map_err(|e| self.fail(e)),
        }
    }

    /// Waits for queued messages to be delivered. A no-op in sync mode.
    pub async fn flush(&self, timeout: Duration) -> Result<()> {
        match &self.delivery {
            DeliveryMode::Sync(_) => Ok(()),
            DeliveryMode::Async(transport) => {
                transport.flush(timeout).await.map_err(|e| self.fail(e))
            }
        }
    }

    /// Flushes and releases the transport.
    pub async fn close(self, timeout: Duration) -> Result<()> {
        self.flush(timeout).await?;
        info!(mode = %self.mode(), "Producer closed");
        Ok(())
    }

    fn fail(&self, error: Error) -> Error {
        record(self.sink.as_ref(), error)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("delivery", &self.delivery)
            .field("topics", &self.encoder.registry().len())
            .finish()
    }
}

fn record(sink: &dyn ErrorSink, error: Error) -> Error {
    sink.record(LogCategory::of(&error), &error);
    error
}
