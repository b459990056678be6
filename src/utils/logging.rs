//! Logging setup for binaries embedding the client.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host process, which can call [`init_logging`] once at startup.

use tracing::{info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::{RconError, Result};

/// Install a global `tracing` subscriber writing to stdout.
///
/// `RUST_LOG` takes precedence over the configured level when set. The
/// configured application name is logged once the subscriber is in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    build_subscriber(config, std::io::stdout)
        .try_init()
        .map_err(|e| RconError::ConfigError(format!("Failed to install subscriber: {e}")))?;

    announce(config);
    Ok(())
}

/// Build the subscriber `init_logging` installs, writing through `writer`.
pub fn build_subscriber<W>(
    config: &LoggingConfig,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let format: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer().with_target(false).with_writer(writer).boxed()
    };

    tracing_subscriber::registry()
        .with(format)
        .with(build_filter(config))
}

fn announce(config: &LoggingConfig) {
    info!(
        app = %config.app_name,
        level = %config.log_level,
        json = config.json_format,
        "Logging initialized"
    );
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()))
}
