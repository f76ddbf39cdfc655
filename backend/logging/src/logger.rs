//! Structured Logger
//!
//! Wraps `tracing` with an env-filtered console layer and, when a directory is
//! given, a daily-rolling NDJSON file.

use std::path::Path;

use anyhow::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "folio.log";

/// Initialize the global logger.
///
/// `RUST_LOG` overrides `level`. Console output goes to stderr so it never
/// interleaves with streamed chat replies on stdout. Calling this twice is a
/// no-op.
pub fn init_logger(log_dir: Option<&Path>, level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    // Writes `folio.log.YYYY-MM-DD`
    let file_layer = log_dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(appender).with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

