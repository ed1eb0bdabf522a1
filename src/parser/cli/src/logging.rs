use std::error::Error;

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// JSON lines, one bunyan record per event
    Bunyan,
}

impl LogFormat {
    pub fn from_arg(value: &str) -> Self {
        match value {
            "bunyan" => Self::Bunyan,
            _ => Self::Text,
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so stdout only carries
/// the review. `RUST_LOG` overrides `default_level`.
pub fn init_logging(format: LogFormat, default_level: &str) -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    LogTracer::init()?;

    match format {
        LogFormat::Text => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Bunyan => {
            let subscriber = Registry::default()
                .with(filter)
                .with(JsonStorageLayer)
                .with(BunyanFormattingLayer::new(
                    env!("CARGO_PKG_NAME").to_string(),
                    std::io::stderr,
                ));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
