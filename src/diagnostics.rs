//! Error reporting sink.
//!
//! The producer hands every error it returns to an [`ErrorSink`] before
//! returning it. Sinks only observe; they cannot change the outcome of the
//! call that reported the error.

use crate::Error;
use std::fmt;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    /// Producer construction and topic lookup.
    Configuration,
    /// Classification and codec failures.
    Encoding,
    /// Send, enqueue and flush failures.
    Transport,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Configuration => "configuration",
            LogCategory::Encoding => "encoding",
            LogCategory::Transport => "transport",
        }
    }

    pub fn of(error: &Error) -> Self {
        match error {
            Error::Config(_)
            | Error::InvalidProducerMode(_)
            | Error::UnknownTopic(_)
            | Error::UnrecognizedMessageFormat { .. }
            | Error::Io(_) => LogCategory::Configuration,
            Error::UnsupportedValueKind(_)
            | Error::Serialization { .. }
            | Error::SchemaMismatch { .. } => LogCategory::Encoding,
            Error::Kafka(_) | Error::ChannelClosed => LogCategory::Transport,
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait ErrorSink: Send + Sync {
    fn record(&self, category: LogCategory, error: &Error);
}

/// Default sink: one structured `tracing` event per error.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn record(&self, category: LogCategory, error: &Error) {
        error!(category = %category, error = %error, "Producer error");
    }
}
