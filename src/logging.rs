// ABOUTME: Tracing setup: writes structured logs to a daily rolling file.
// ABOUTME: The terminal belongs to the TUI, so nothing is logged to stdout.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::Config;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "DESKCHAT_LOG";

/// Build the filter: `DESKCHAT_LOG` wins, otherwise the configured level for this crate.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(format!("deskchat={}", level)))
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    let dir = config.log_dir();
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::daily(&dir, "deskchat.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = build_filter(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true).with_writer(writer))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_target(true).with_writer(writer))
            .try_init()?;
    }

    Ok(guard)
}
