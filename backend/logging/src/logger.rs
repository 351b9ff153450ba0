//! Process-wide tracing setup: console output plus a daily-rolling NDJSON file.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Files are named `wisemonk.log.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "wisemonk.log";

/// HTTP client internals are only interesting when asked for explicitly.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "hyper_util=warn", "h2=warn", "reqwest=warn"];

/// Keeps the background file writer alive; buffered lines are flushed on drop.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggerGuard {
    _file: WorkerGuard,
}

/// Filter directives for `level`, falling back to `info` when it does not parse.
pub fn filter_directives(level: &str) -> String {
    let level = match level.trim().to_ascii_lowercase().as_str() {
        l @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => l.to_string(),
        _ => "info".to_string(),
    };
    std::iter::once(level.as_str())
        .chain(QUIET_TARGETS.iter().copied())
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str) -> LoggerGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    LoggerGuard { _file: guard }
}
