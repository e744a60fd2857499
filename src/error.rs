//! Error types and result handling for topic-producer.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate. Every variant is a
//! value the caller can match on; nothing is retried or swallowed inside
//! the crate.
//!
//! # Example
//!
//! ```rust
//! use topic_producer::{Error, Result};
//!
//! fn lookup(topic: &str) -> Result<()> {
//!     Err(Error::UnknownTopic(topic.to_string()))
//! }
//!
//! match lookup("orders") {
//!     Ok(()) => println!("found"),
//!     Err(Error::UnknownTopic(topic)) => eprintln!("no config for {}", topic),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for topic-producer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error: bad file, duplicate topic, missing schema.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Kafka client or delivery error, passed through from the transport.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The requested delivery mode is neither `sync` nor `async`.
    #[error("Invalid producer mode: {0}")]
    InvalidProducerMode(String),

    /// The topic has no entry in the topic registry.
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    /// The topic declares a wire format this crate does not know.
    #[error("Unrecognized message format '{format}' for topic '{topic}'")]
    UnrecognizedMessageFormat {
        /// Topic carrying the bad declaration
        topic: String,
        /// The format string as configured
        format: String,
    },

    /// The value's shape cannot be published.
    #[error("Unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    /// Lower-level encode or decode failure.
    #[error("Serialization error on topic '{topic}': {message}")]
    Serialization {
        /// Topic being encoded for
        topic: String,
        /// Description from the underlying codec
        message: String,
    },

    /// The value does not satisfy the topic's bound schema.
    #[error("Schema mismatch on topic '{topic}': {message}")]
    SchemaMismatch {
        /// Topic being encoded for
        topic: String,
        /// What did not match
        message: String,
    },

    /// The asynchronous producer's input channel is closed.
    #[error("Producer input channel closed")]
    ChannelClosed,

    /// I/O error, typically reading a schema file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn serialization(topic: &str, message: impl ToString) -> Self {
        Error::Serialization {
            topic: topic.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn schema_mismatch(topic: &str, message: impl ToString) -> Self {
        Error::SchemaMismatch {
            topic: topic.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// A convenient Result type alias for topic-producer operations.
///
/// This is equivalent to `std::result::Result<T, topic_producer::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
