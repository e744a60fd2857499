use anyhow::Context;
use base64::Engine;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use topic_producer::{Config, Delivery, MessageValue, Producer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "topic-producer")]
#[command(about = "Publish one message to a Kafka topic in its configured format", long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[arg(short, long, help = "Destination topic")]
    topic: String,

    #[arg(short, long, default_value = "", help = "Message key")]
    key: String,

    #[arg(long, help = "Message value, parsed as JSON unless --text or --base64 is given")]
    value: String,

    #[arg(short, long, help = "Override the configured producer mode (sync|async)")]
    mode: Option<String>,

    #[arg(long, conflicts_with = "base64", help = "Send the value as literal text")]
    text: bool,

    #[arg(long, help = "Value is base64; send the decoded bytes")]
    base64: bool,

    #[arg(long, default_value_t = 10, help = "Seconds to wait for queued messages on exit")]
    flush_timeout_secs: u64,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    info!("Loading configuration from {:?}", args.config);

    let mut config = match Config::from_file(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e).context("loading configuration");
        }
    };

    if let Some(mode) = &args.mode {
        config.producer.mode = mode.clone();
    }

    info!(
        kafka_brokers = ?config.kafka.brokers,
        mode = %config.producer.mode,
        topics = config.topics.len(),
        "Configuration summary"
    );

    let value = parse_value(&args)?;
    let producer = Producer::from_config(&config)?;

    match producer.produce(&args.topic, &args.key, value).await? {
        Delivery::Acknowledged(ack) => {
            info!(partition = ack.partition, offset = ack.offset, "Message acknowledged");
            println!("{}:{}:{}", args.topic, ack.partition, ack.offset);
        }
        Delivery::Enqueued => info!("Message enqueued"),
    }

    let mut failures = producer.take_delivery_failures();
    producer
        .close(Duration::from_secs(args.flush_timeout_secs))
        .await?;

    if let Some(failure) = failures.as_mut().and_then(|rx| rx.try_recv().ok()) {
        anyhow::bail!("delivery to '{}' failed: {}", failure.topic, failure.error);
    }

    Ok(())
}

fn parse_value(args: &Args) -> anyhow::Result<MessageValue> {
    if args.text {
        return Ok(MessageValue::from(args.value.as_str()));
    }

    if args.base64 {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(args.value.trim())
            .context("decoding base64 value")?;
        return Ok(MessageValue::from(bytes));
    }

    let json: serde_json::Value =
        serde_json::from_str(&args.value).context("parsing value as JSON")?;
    Ok(MessageValue::classify(json)?)
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("topic_producer=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("topic_producer=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
