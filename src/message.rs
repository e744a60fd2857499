//! Message values and their classification.
//!
//! Callers hand the producer a [`MessageValue`]. Text and numbers have one
//! canonical textual form and never reach a codec; bytes and records go
//! through the codec bound to the destination topic.

use crate::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A structured record: named fields with JSON-shaped values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Serializes any struct-shaped value into a record.
    ///
    /// Fails with [`Error::UnsupportedValueKind`] when the value does not
    /// serialize to an object (sequences, scalars, unit, `None`).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value).map_err(|e| {
            Error::UnsupportedValueKind(format!("value does not serialize to a record: {}", e))
        })?;
        Self::try_from(value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Converts the record back into a typed struct.
    pub fn deserialize_into<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(self.into_value())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::UnsupportedValueKind(json_kind(&other).to_string())),
        }
    }
}

/// Numeric scalar of any width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float32(f32),
    Float64(f64),
}

impl Number {
    pub fn is_finite(&self) -> bool {
        match self {
            Number::Int(_) | Number::UInt(_) => true,
            Number::Float32(n) => n.is_finite(),
            Number::Float64(n) => n.is_finite(),
        }
    }

    /// Canonical decimal form. Floats use the shortest representation that
    /// round-trips at their own width. NaN and infinities have no decimal
    /// form; they print as `NaN`/`inf` here and are rejected by the encoder.
    pub fn to_decimal_string(&self) -> String {
        match self {
            Number::Int(n) => n.to_string(),
            Number::UInt(n) => n.to_string(),
            Number::Float32(n) => n.to_string(),
            Number::Float64(n) => n.to_string(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

macro_rules! number_from {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(<$wide>::from(n))
                }
            }

            impl From<$t> for MessageValue {
                fn from(n: $t) -> Self {
                    MessageValue::Number(Number::from(n))
                }
            }
        )*
    };
}

number_from!(Int as i64: i8, i16, i32, i64);
number_from!(UInt as u64: u8, u16, u32, u64);
number_from!(Float32 as f32: f32);
number_from!(Float64 as f64: f64);

// Rust has no target where usize or isize is wider than 64 bits.
impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::UInt(n as u64)
    }
}

impl From<isize> for Number {
    fn from(n: isize) -> Self {
        Number::Int(n as i64)
    }
}

impl From<usize> for MessageValue {
    fn from(n: usize) -> Self {
        MessageValue::Number(Number::from(n))
    }
}

impl From<isize> for MessageValue {
    fn from(n: isize) -> Self {
        MessageValue::Number(Number::from(n))
    }
}

impl TryFrom<i128> for Number {
    type Error = Error;

    fn try_from(n: i128) -> Result<Self> {
        if let Ok(i) = i64::try_from(n) {
            Ok(Number::Int(i))
        } else if let Ok(u) = u64::try_from(n) {
            Ok(Number::UInt(u))
        } else {
            Err(Error::UnsupportedValueKind(format!("integer {} exceeds 64 bits", n)))
        }
    }
}

impl TryFrom<u128> for Number {
    type Error = Error;

    fn try_from(n: u128) -> Result<Self> {
        u64::try_from(n)
            .map(Number::UInt)
            .map_err(|_| Error::UnsupportedValueKind(format!("integer {} exceeds 64 bits", n)))
    }
}

impl TryFrom<i128> for MessageValue {
    type Error = Error;

    fn try_from(n: i128) -> Result<Self> {
        Number::try_from(n).map(MessageValue::Number)
    }
}

impl TryFrom<u128> for MessageValue {
    type Error = Error;

    fn try_from(n: u128) -> Result<Self> {
        Number::try_from(n).map(MessageValue::Number)
    }
}

/// The value half of a message, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageValue {
    Text(String),
    Bytes(Bytes),
    Number(Number),
    Record(Record),
}

/// Shape of a [`MessageValue`], used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bytes,
    Number,
    Record,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Bytes => "bytes",
            ValueKind::Number => "number",
            ValueKind::Record => "record",
        }
    }

    /// Text and numbers skip the topic codec.
    pub fn bypasses_codec(&self) -> bool {
        matches!(self, ValueKind::Text | ValueKind::Number)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the encoder does with a value.
#[derive(Debug)]
pub(crate) enum Payload<'a> {
    /// Already in wire form; the codec is never invoked.
    Direct(Bytes),
    /// Pre-serialized bytes, handed to the topic codec.
    Raw(&'a [u8]),
    /// Structured record, serialized by the topic codec.
    Record(&'a Record),
}

impl MessageValue {
    /// Builds a record value from any struct-shaped `Serialize` type.
    pub fn record<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Record::from_serialize(value).map(MessageValue::Record)
    }

    /// Classifies a dynamically typed JSON value.
    ///
    /// Strings, numbers and objects map onto their variants; null, booleans
    /// and arrays have no publishable form.
    pub fn classify(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(MessageValue::Text(s)),
            Value::Number(n) => {
                let number = if let Some(i) = n.as_i64() {
                    Number::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Number::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    Number::Float64(f)
                } else {
                    return Err(Error::UnsupportedValueKind(format!("number {}", n)));
                };
                Ok(MessageValue::Number(number))
            }
            Value::Object(map) => Ok(MessageValue::Record(Record(map))),
            other => Err(Error::UnsupportedValueKind(json_kind(&other).to_string())),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            MessageValue::Text(_) => ValueKind::Text,
            MessageValue::Bytes(_) => ValueKind::Bytes,
            MessageValue::Number(_) => ValueKind::Number,
            MessageValue::Record(_) => ValueKind::Record,
        }
    }

    /// Fails with [`Error::UnsupportedValueKind`] for NaN and infinities.
    pub(crate) fn payload(&self) -> Result<Payload<'_>> {
        let payload = match self {
            MessageValue::Text(s) => Payload::Direct(Bytes::copy_from_slice(s.as_bytes())),
            MessageValue::Number(n) if !n.is_finite() => {
                return Err(Error::UnsupportedValueKind(format!("non-finite number {}", n)));
            }
            MessageValue::Number(n) => Payload::Direct(Bytes::from(n.to_decimal_string())),
            MessageValue::Bytes(b) => Payload::Raw(&b[..]),
            MessageValue::Record(r) => Payload::Record(r),
        };
        Ok(payload)
    }
}

impl From<&str> for MessageValue {
    fn from(s: &str) -> Self {
        MessageValue::Text(s.to_string())
    }
}

impl From<String> for MessageValue {
    fn from(s: String) -> Self {
        MessageValue::Text(s)
    }
}

impl From<Vec<u8>> for MessageValue {
    fn from(b: Vec<u8>) -> Self {
        MessageValue::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for MessageValue {
    fn from(b: &[u8]) -> Self {
        MessageValue::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Bytes> for MessageValue {
    fn from(b: Bytes) -> Self {
        MessageValue::Bytes(b)
    }
}

impl From<Record> for MessageValue {
    fn from(r: Record) -> Self {
        MessageValue::Record(r)
    }
}

/// A message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    pub topic: String,
    pub key: Bytes,
    pub value: Bytes,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
