#![forbid(unsafe_code)]

//! Tracing setup. Stdout carries the MCP protocol, so logs go to stderr or,
//! when configured, to a file through a non-blocking appender.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
/// The returned guard must be held until shutdown so buffered file output is
/// flushed.
pub fn init_logging(config: &LoggingConfig) -> std::io::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    let Some(path) = &config.file else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
            .try_init()
            .map_err(std::io::Error::other)?;
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    registry
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .map_err(std::io::Error::other)?;

    Ok(Some(guard))
}
