//! Logging through `tracing` and `tracing-subscriber`.
//!
//! Stdout carries the line protocol, so every event goes to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `remap_core::engine=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| format!("invalid log filter '{}': {e}", config.filter))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| format!("failed to initialize logging: {e}"))
}
