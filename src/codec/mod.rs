//! Wire-format codecs.
//!
//! One codec exists per [`MessageFormat`]; a producer holds a single
//! instance of each in [`Codecs`] and picks one per topic.

pub mod avro;
pub mod json;
pub mod string;

use crate::message::{MessageValue, Record};
use crate::topic::{MessageFormat, TopicRegistry};
use crate::Result;
use bytes::Bytes;

pub use avro::AvroCodec;
pub use json::JsonCodec;
pub use string::StringCodec;

pub trait Codec: Send + Sync {
    fn format(&self) -> MessageFormat;

    /// Serializes a structured record for `topic`.
    fn encode(&self, topic: &str, record: &Record) -> Result<Bytes>;

    /// Accepts pre-serialized bytes for `topic`, validating them against
    /// the format where the format allows it. The bytes are never rewritten.
    fn encode_bytes(&self, topic: &str, bytes: &[u8]) -> Result<Bytes>;

    fn decode(&self, topic: &str, bytes: &[u8]) -> Result<MessageValue>;
}

/// The codec set shared by every topic of a producer.
#[derive(Debug)]
pub struct Codecs {
    string: StringCodec,
    json: JsonCodec,
    avro: AvroCodec,
}

impl Codecs {
    /// Builds all codecs, binding an Avro schema to every Avro topic.
    pub fn new(registry: &TopicRegistry) -> Result<Self> {
        Ok(Self {
            string: StringCodec,
            json: JsonCodec,
            avro: AvroCodec::from_registry(registry)?,
        })
    }

    pub fn for_format(&self, format: MessageFormat) -> &dyn Codec {
        match format {
            MessageFormat::String => &self.string,
            MessageFormat::Json => &self.json,
            MessageFormat::Avro => &self.avro,
        }
    }
}
