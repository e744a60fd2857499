//! Turns `(topic, key, value)` into a transport-ready [`EncodedMessage`].

use crate::codec::Codecs;
use crate::message::{EncodedMessage, MessageValue, Payload};
use crate::topic::TopicRegistry;
use crate::Result;
use bytes::Bytes;
use tracing::trace;

#[derive(Debug)]
pub struct MessageEncoder {
    registry: TopicRegistry,
    codecs: Codecs,
}

impl MessageEncoder {
    /// Binds the codecs for every configured topic.
    pub fn new(registry: TopicRegistry) -> Result<Self> {
        let codecs = Codecs::new(&registry)?;
        Ok(Self { registry, codecs })
    }

    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }

    /// Encodes one message.
    ///
    /// The topic must be registered. Text and numbers are written in their
    /// canonical form whatever the topic's format; bytes and records go
    /// through the topic's codec.
    pub fn encode(&self, topic: &str, key: &str, value: &MessageValue) -> Result<EncodedMessage> {
        let config = self.registry.resolve(topic)?;

        let value = match value.payload()? {
            Payload::Direct(bytes) => bytes,
            Payload::Raw(bytes) => self.codecs.for_format(config.format).encode_bytes(topic, bytes)?,
            Payload::Record(record) => self.codecs.for_format(config.format).encode(topic, record)?,
        };

        trace!(topic, format = %config.format, len = value.len(), "Encoded message");

        Ok(EncodedMessage {
            topic: topic.to_string(),
            key: Bytes::copy_from_slice(key.as_bytes()),
            value,
        })
    }
}
