//! Tracing subscriber setup

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::args::LogFormat;
use crate::errors::{Result, SpecmockError};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Logs go to stderr so
/// `--print-schema` output stays clean on stdout.
pub fn init(format: LogFormat, default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| SpecmockError::Config(format!("Failed to install logger: {}", e)))
}
