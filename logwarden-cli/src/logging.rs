//! Logging initialization for the logwarden CLI.
//!
//! Configures `tracing-subscriber` based on the `[general]` section of
//! `LogwardenConfig`. Stdout carries the plugin output, so logs go to
//! stderr or to the configured log file.

use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use logwarden_core::config::GeneralConfig;

/// `log_file` value meaning "write to stderr".
pub const STDERR_LOG_FILE: &str = "-";

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// `RUST_LOG` takes precedence over `config.log_level`.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines
/// * `"pretty"` - Human-readable output
///
/// Returns the appender guard when logging to a file. Keep it alive until
/// the process exits, or buffered lines are lost.
pub fn init_tracing(config: &GeneralConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (writer, guard) = log_writer(&config.log_file)?;
    let ansi = guard.is_none();

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize JSON tracing subscriber: {}", e)
                })?;
        }
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_ansi(ansi)
                        .with_writer(writer),
                )
                .try_init()
                .map_err(|e| {
                    anyhow::anyhow!("failed to initialize pretty tracing subscriber: {}", e)
                })?;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json' or 'pretty'",
                config.log_format
            ));
        }
    }

    Ok(guard)
}

fn log_writer(log_file: &str) -> Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    let log_file = log_file.trim();
    if log_file.is_empty() || log_file == STDERR_LOG_FILE {
        return Ok((BoxMakeWriter::new(std::io::stderr), None));
    }

    let path = Path::new(log_file);
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log_file '{}' has no file name", log_file))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(writer), Some(guard)))
}
