use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub producer: ProducerSettings,
    #[serde(default)]
    pub topics: Vec<TopicSettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_acks")]
    pub acks: String,
    #[serde(default = "default_linger_ms")]
    pub linger_ms: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_buffer_memory")]
    pub buffer_memory: usize,
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
    /// How long a send may wait for room in librdkafka's local queue.
    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_ms: u64,
    /// Capacity of the async producer's input channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProducerSettings {
    /// `sync` or `async`. Kept as text so a bad value surfaces as
    /// `Error::InvalidProducerMode` when the producer is built.
    #[serde(default = "default_mode")]
    pub mode: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopicSettings {
    pub name: String,
    /// `string`, `json` or `avro`.
    pub format: String,
    /// Inline Avro schema.
    #[serde(default)]
    pub schema: Option<String>,
    /// Path to an Avro schema, used when `schema` is not set.
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TOPIC_PRODUCER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

impl KafkaConfig {
    pub fn new(brokers: Vec<String>) -> Self {
        Self {
            brokers,
            compression: default_compression(),
            acks: default_acks(),
            linger_ms: default_linger_ms(),
            batch_size: default_batch_size(),
            buffer_memory: default_buffer_memory(),
            message_timeout_ms: default_message_timeout_ms(),
            queue_timeout_ms: default_queue_timeout_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
        }
    }
}

impl TopicSettings {
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
            schema: None,
            schema_file: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

fn default_mode() -> String {
    "sync".to_string()
}

fn default_compression() -> String {
    "snappy".to_string()
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_linger_ms() -> u32 {
    100
}

fn default_batch_size() -> usize {
    16384
}

fn default_buffer_memory() -> usize {
    33_554_432 // 32MB
}

fn default_message_timeout_ms() -> u64 {
    30_000
}

fn default_queue_timeout_ms() -> u64 {
    5_000
}

fn default_channel_capacity() -> usize {
    1024
}
