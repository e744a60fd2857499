use super::Codec;
use crate::message::{MessageValue, Record};
use crate::topic::MessageFormat;
use crate::{Error, Result};
use bytes::Bytes;
use serde::de::IgnoredAny;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn format(&self) -> MessageFormat {
        MessageFormat::Json
    }

    fn encode(&self, topic: &str, record: &Record) -> Result<Bytes> {
        serde_json::to_vec(record)
            .map(Bytes::from)
            .map_err(|e| Error::serialization(topic, e))
    }

    fn encode_bytes(&self, topic: &str, bytes: &[u8]) -> Result<Bytes> {
        serde_json::from_slice::<IgnoredAny>(bytes).map_err(|e| Error::serialization(topic, e))?;
        Ok(Bytes::copy_from_slice(bytes))
    }

    fn decode(&self, topic: &str, bytes: &[u8]) -> Result<MessageValue> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| Error::serialization(topic, e))?;
        MessageValue::classify(value)
    }
}
