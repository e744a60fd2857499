pub mod async_producer;
pub mod producer;
pub mod transport;

#[cfg(test)]
mod tests;

pub use async_producer::KafkaAsyncTransport;
pub use producer::KafkaSyncTransport;
pub use transport::{AsyncTransport, DeliveryAck, DeliveryFailure, SyncTransport};
