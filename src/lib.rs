pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod encoder;
pub mod error;
pub mod message;
pub mod producer;
pub mod topic;

pub mod kafka;

pub use config::Config;
pub use error::{Error, Result};
pub use message::{EncodedMessage, MessageValue, Number, Record};
pub use producer::{Delivery, DeliveryMode, Producer, ProducerMode};
