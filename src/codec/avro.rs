//! Avro datum codec.
//!
//! Each Avro topic binds one schema at construction. Messages carry the
//! bare binary datum: no object container header and no registry framing.

use super::Codec;
use crate::message::{MessageValue, Record};
use crate::topic::{MessageFormat, TopicRegistry};
use crate::{Error, Result};
use apache_avro::types::Value;
use apache_avro::{from_avro_datum, to_avro_datum, Schema};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct AvroCodec {
    schemas: HashMap<String, Schema>,
}

impl AvroCodec {
    /// Parses the schema of every Avro topic in the registry.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if an Avro topic has no schema or its schema
    /// does not parse.
    pub fn from_registry(registry: &TopicRegistry) -> Result<Self> {
        let mut schemas = HashMap::new();

        for topic in registry.iter().filter(|t| t.format == MessageFormat::Avro) {
            let text = topic.schema.as_deref().ok_or_else(|| {
                Error::Config(format!("Avro topic '{}' has no schema", topic.name))
            })?;
            let schema = Schema::parse_str(text).map_err(|e| {
                Error::Config(format!("Invalid Avro schema for topic '{}': {}", topic.name, e))
            })?;
            debug!(topic = %topic.name, "Bound Avro schema");
            schemas.insert(topic.name.clone(), schema);
        }

        Ok(Self { schemas })
    }

    fn schema(&self, topic: &str) -> Result<&Schema> {
        self.schemas
            .get(topic)
            .ok_or_else(|| Error::schema_mismatch(topic, "no Avro schema bound to topic"))
    }
}

impl Codec for AvroCodec {
    fn format(&self) -> MessageFormat {
        MessageFormat::Avro
    }

    fn encode(&self, topic: &str, record: &Record) -> Result<Bytes> {
        let schema = self.schema(topic)?;
        let value = apache_avro::to_value(record).map_err(|e| Error::serialization(topic, e))?;
        let resolved = value
            .clone()
            .resolve(schema)
            .map_err(|e| Error::schema_mismatch(topic, e))?;
        if let Some(problem) = find_narrowing(&value, &resolved, "") {
            return Err(Error::schema_mismatch(topic, problem));
        }

        to_avro_datum(schema, resolved)
            .map(Bytes::from)
            .map_err(|e| Error::serialization(topic, e))
    }

    fn encode_bytes(&self, topic: &str, bytes: &[u8]) -> Result<Bytes> {
        let schema = self.schema(topic)?;
        let mut reader = bytes;
        from_avro_datum(schema, &mut reader, None).map_err(|e| Error::schema_mismatch(topic, e))?;
        if !reader.is_empty() {
            return Err(Error::schema_mismatch(
                topic,
                format!("{} trailing bytes after datum", reader.len()),
            ));
        }
        Ok(Bytes::copy_from_slice(bytes))
    }

    fn decode(&self, topic: &str, bytes: &[u8]) -> Result<MessageValue> {
        let schema = self.schema(topic)?;
        let mut reader = bytes;
        let value =
            from_avro_datum(schema, &mut reader, None).map_err(|e| Error::schema_mismatch(topic, e))?;
        let json = serde_json::Value::try_from(value).map_err(|e| Error::serialization(topic, e))?;
        MessageValue::classify(json)
    }
}

/// Schema resolution casts `long` into `int` and `double` into `float`
/// without range checks. Compares the value before and after resolution
/// and describes the first number that did not survive the cast.
fn find_narrowing(original: &Value, resolved: &Value, path: &str) -> Option<String> {
    match (original, resolved) {
        (_, Value::Union(_, inner)) => find_narrowing(original, inner, path),
        (Value::Long(n), Value::Int(m)) if i64::from(*m) != *n => {
            Some(format!("{}: {} does not fit an int", field_path(path), n))
        }
        (Value::Double(d), Value::Float(f)) if d.is_finite() && !f.is_finite() => {
            Some(format!("{}: {} does not fit a float", field_path(path), d))
        }
        (Value::Map(before), Value::Record(after)) => after.iter().find_map(|(name, value)| {
            before
                .get(name)
                .and_then(|original| find_narrowing(original, value, &join(path, name)))
        }),
        (Value::Map(before), Value::Map(after)) => after.iter().find_map(|(key, value)| {
            before
                .get(key)
                .and_then(|original| find_narrowing(original, value, &join(path, key)))
        }),
        (Value::Array(before), Value::Array(after)) => before
            .iter()
            .zip(after)
            .enumerate()
            .find_map(|(i, (original, value))| {
                find_narrowing(original, value, &format!("{}[{}]", path, i))
            }),
        _ => None,
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn field_path(path: &str) -> &str {
    if path.is_empty() {
        "value"
    } else {
        path
    }
}
