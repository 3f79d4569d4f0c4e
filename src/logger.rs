//! Logging initialisation via tracing-subscriber.
//!
//! The console binary logs to stderr so the chat transcript on stdout stays
//! clean; a `log_file` in the config redirects everything there instead.
//! `RUST_LOG` overrides the configured level when set.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Initialise the global tracing subscriber. Call once at startup, after
/// config is loaded.
///
/// The filter comes from `RUST_LOG` when present, else from `level`
/// (`"error"` through `"trace"`; validate with [`parse_level`] first for a
/// config-shaped error message).
pub fn init(level: &str, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer_for(log_file)?)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Append to `path` when configured, stderr otherwise.
fn writer_for(log_file: Option<&Path>) -> Result<BoxMakeWriter, AppError> {
    let Some(path) = log_file else {
        return Ok(BoxMakeWriter::new(io::stderr));
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            AppError::Logger(format!("cannot open log file '{}': {e}", path.display()))
        })?;
    Ok(BoxMakeWriter::new(file))
}

/// Validate a config-supplied level string, returning the parsed filter.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}
