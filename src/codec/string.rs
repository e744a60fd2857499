use super::Codec;
use crate::message::{MessageValue, Record};
use crate::topic::MessageFormat;
use crate::{Error, Result};
use bytes::Bytes;

/// Plain text passthrough. Records have no text form.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringCodec;

impl Codec for StringCodec {
    fn format(&self) -> MessageFormat {
        MessageFormat::String
    }

    fn encode(&self, topic: &str, _record: &Record) -> Result<Bytes> {
        Err(Error::UnsupportedValueKind(format!(
            "record cannot be published to string topic '{}'",
            topic
        )))
    }

    fn encode_bytes(&self, _topic: &str, bytes: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(bytes))
    }

    fn decode(&self, topic: &str, bytes: &[u8]) -> Result<MessageValue> {
        std::str::from_utf8(bytes)
            .map(MessageValue::from)
            .map_err(|e| Error::serialization(topic, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_rejected() {
        let err = StringCodec.encode("audit", &Record::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueKind(_)));
    }

    #[test]
    fn test_bytes_pass_through() {
        let bytes = [0xffu8, 0x00, 0x7f];
        assert_eq!(&StringCodec.encode_bytes("audit", &bytes).unwrap()[..], &bytes);
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(
            StringCodec.decode("audit", "ok".as_bytes()).unwrap(),
            MessageValue::Text("ok".to_string())
        );
        assert!(matches!(
            StringCodec.decode("audit", &[0xff, 0xfe]),
            Err(Error::Serialization { .. })
        ));
    }
}
