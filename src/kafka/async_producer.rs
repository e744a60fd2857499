//! Buffered, fire-and-forget Kafka transport.
//!
//! Callers push messages into a bounded channel. A single worker task drains
//! it in order, hands each message to librdkafka, and watches the delivery
//! off the caller's path. Broker-side failures are logged and forwarded to
//! the [`DeliveryFailure`] receiver returned by [`KafkaAsyncTransport::new`].

use super::producer::create_producer;
use super::transport::{AsyncTransport, DeliveryFailure};
use crate::config::KafkaConfig;
use crate::message::EncodedMessage;
use crate::{Error, Result};
use async_trait::async_trait;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

const QUEUE_FULL_BACKOFF: Duration = Duration::from_millis(10);

enum Command {
    Send(EncodedMessage),
    Flush {
        timeout: Duration,
        done: oneshot::Sender<Result<()>>,
    },
}

pub struct KafkaAsyncTransport {
    input: mpsc::Sender<Command>,
}

impl KafkaAsyncTransport {
    /// Creates the transport and spawns its worker on the current Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when called outside a Tokio runtime, and
    /// `Error::Kafka` when the client cannot be created.
    pub fn new(
        brokers: &[String],
        config: &KafkaConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DeliveryFailure>)> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            Error::Config("The async producer must be created inside a Tokio runtime".to_string())
        })?;

        let producer = create_producer(brokers, config)?;
        let (input, commands) = mpsc::channel(config.channel_capacity.max(1));
        let (failures, failures_rx) = mpsc::unbounded_channel();
        let queue_timeout = Duration::from_millis(config.queue_timeout_ms);

        runtime.spawn(run_worker(producer, commands, failures, queue_timeout));
        info!(capacity = config.channel_capacity, "Async producer worker started");

        Ok((Self { input }, failures_rx))
    }
}

#[async_trait]
impl AsyncTransport for KafkaAsyncTransport {
    async fn enqueue(&self, message: EncodedMessage) -> Result<()> {
        self.input
            .send(Command::Send(message))
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    async fn flush(&self, timeout: Duration) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.input
            .send(Command::Flush { timeout, done })
            .await
            .map_err(|_| Error::ChannelClosed)?;
        wait.await.map_err(|_| Error::ChannelClosed)?
    }
}

async fn run_worker(
    producer: FutureProducer,
    mut commands: mpsc::Receiver<Command>,
    failures: mpsc::UnboundedSender<DeliveryFailure>,
    queue_timeout: Duration,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Send(message) => {
                dispatch(&producer, message, &failures, queue_timeout).await;
            }
            Command::Flush { timeout, done } => {
                let flushing = producer.clone();
                let result = match tokio::task::spawn_blocking(move || flushing.flush(timeout)).await
                {
                    Ok(result) => result.map_err(Error::Kafka),
                    Err(_) => Err(Error::Kafka(KafkaError::Canceled)),
                };
                let _ = done.send(result);
            }
        }
    }

    debug!("Async producer input closed, worker exiting");
}

async fn dispatch(
    producer: &FutureProducer,
    message: EncodedMessage,
    failures: &mpsc::UnboundedSender<DeliveryFailure>,
    queue_timeout: Duration,
) {
    let deadline = Instant::now() + queue_timeout;

    loop {
        let record = FutureRecord::to(&message.topic)
            .key(&message.key[..])
            .payload(&message.value[..]);

        // Drop the rejected record before any await.
        let outcome = producer.send_result(record).map_err(|(error, _)| error);

        match outcome {
            Ok(delivery) => {
                let failures = failures.clone();
                let topic = message.topic.clone();
                let key = message.key.clone();
                tokio::spawn(async move {
                    let error = match delivery.await {
                        Ok(Ok((partition, offset))) => {
                            debug!(topic = %topic, partition, offset, "Message acknowledged");
                            return;
                        }
                        Ok(Err((error, _))) => error,
                        Err(_) => KafkaError::Canceled,
                    };
                    report(&failures, DeliveryFailure { topic, key, error });
                });
                return;
            }
            Err(KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull))
                if Instant::now() < deadline =>
            {
                tokio::time::sleep(QUEUE_FULL_BACKOFF).await;
            }
            Err(error) => {
                report(
                    failures,
                    DeliveryFailure {
                        topic: message.topic.clone(),
                        key: message.key.clone(),
                        error,
                    },
                );
                return;
            }
        }
    }
}

fn report(failures: &mpsc::UnboundedSender<DeliveryFailure>, failure: DeliveryFailure) {
    warn!(topic = %failure.topic, error = %failure.error, "Message delivery failed");
    // Nobody listening is fine; the failure is already logged.
    let _ = failures.send(failure);
}
