//! Tracing integration for structured logging.
//!
//! Provides logging setup for embedding applications and tests with:
//! - Configurable verbosity levels
//! - Optional file output
//! - JSON or text format

use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

/// Map a verbosity count to a level name.
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Initialize the logging system.
///
/// # Arguments
///
/// * `verbosity` - Verbosity level (0=error, 1=warn, 2=info, 3=debug, 4+=trace)
/// * `log_file` - Optional path to write logs to file
/// * `format` - Output format (text or JSON)
///
/// `RUST_LOG` overrides the level filter when set.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>, format: LogFormat) -> Result<()> {
    let level = level_for(verbosity);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "stowage_core={},stowage_client={},stowage_test_utils={}",
            level, level, level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match (log_file, format) {
        (None, LogFormat::Text) => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(verbosity >= 3)
                    .with_line_number(verbosity >= 3),
            )
            .try_init(),
        (None, LogFormat::Json) => registry.with(fmt::layer().json()).try_init(),
        (Some(path), LogFormat::Text) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(file)
                        .with_ansi(false)
                        .with_target(true)
                        .with_file(verbosity >= 3)
                        .with_line_number(verbosity >= 3),
                )
                .try_init()
        }
        (Some(path), LogFormat::Json) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(fmt::layer().json().with_writer(file))
                .try_init()
        }
    };

    result.map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
}

/// Initialize logging with defaults for testing.
///
/// Silently ignores errors (logging may already be initialized).
pub fn init_test_logging() {
    let _ = init_logging(3, None, LogFormat::Text);
}
