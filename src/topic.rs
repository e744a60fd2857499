//! Per-topic wire format declarations.

use crate::config::TopicSettings;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFormat {
    /// Plain UTF-8 text.
    String,
    Json,
    /// Schema-based binary (Avro datum).
    Avro,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::String => "string",
            MessageFormat::Json => "json",
            MessageFormat::Avro => "avro",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(MessageFormat::String),
            "json" => Ok(MessageFormat::Json),
            "avro" | "binary_schema" => Ok(MessageFormat::Avro),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    pub name: String,
    pub format: MessageFormat,
    /// Avro schema text; required for [`MessageFormat::Avro`] topics.
    pub schema: Option<String>,
}

impl TopicConfig {
    pub fn new(name: impl Into<String>, format: MessageFormat) -> Self {
        Self {
            name: name.into(),
            format,
            schema: None,
        }
    }

    pub fn avro(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: MessageFormat::Avro,
            schema: Some(schema.into()),
        }
    }
}

impl TryFrom<&TopicSettings> for TopicConfig {
    type Error = Error;

    fn try_from(settings: &TopicSettings) -> Result<Self> {
        let format = settings.format.parse::<MessageFormat>().map_err(|format| {
            Error::UnrecognizedMessageFormat {
                topic: settings.name.clone(),
                format,
            }
        })?;

        let schema = match (&settings.schema, &settings.schema_file) {
            (Some(schema), _) => Some(schema.clone()),
            (None, Some(path)) => Some(std::fs::read_to_string(path)?),
            (None, None) => None,
        };

        Ok(Self {
            name: settings.name.clone(),
            format,
            schema,
        })
    }
}

/// Read-only map from topic name to its configuration.
///
/// Cloning is cheap; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    topics: Arc<HashMap<String, TopicConfig>>,
}

impl TopicRegistry {
    pub fn new(topics: impl IntoIterator<Item = TopicConfig>) -> Result<Self> {
        let mut map = HashMap::new();
        for topic in topics {
            if map.contains_key(&topic.name) {
                return Err(Error::Config(format!(
                    "Topic '{}' is configured more than once",
                    topic.name
                )));
            }
            debug!(topic = %topic.name, format = %topic.format, "Registered topic");
            map.insert(topic.name.clone(), topic);
        }

        Ok(Self {
            topics: Arc::new(map),
        })
    }

    pub fn from_settings(settings: &[TopicSettings]) -> Result<Self> {
        let topics = settings
            .iter()
            .map(TopicConfig::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(topics)
    }

    /// Looks up a topic. Absence is an error, never a default format.
    pub fn resolve(&self, topic: &str) -> Result<&TopicConfig> {
        self.topics
            .get(topic)
            .ok_or_else(|| Error::UnknownTopic(topic.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicConfig> {
        self.topics.values()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
