//! Logging setup
//!
//! The library only emits `tracing` events. Host applications that have no
//! subscriber of their own can install one here. `RUST_LOG` overrides the
//! level passed in.

use std::fs;
use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console logging at `info`
pub fn init_logger() -> anyhow::Result<()> {
    init_logger_with_file("info", false, None)
}

/// Initialize logging
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - JSON lines instead of human-readable output
/// * `log_dir` - Optional directory for a daily rotating `printer.log`
///
/// # Examples
/// ```no_run
/// // Console only
/// receipt_printer::logger::init_logger_with_file("debug", false, None)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match (log_dir, json_format) {
        (Some(dir), json) => {
            let dir = Path::new(dir);
            fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "printer.log");
            if json {
                registry
                    .with(fmt::layer().json().with_writer(appender))
                    .try_init()?;
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(appender))
                    .try_init()?;
            }
        }
        (None, true) => {
            registry
                .with(fmt::layer().json().with_target(true).with_current_span(true))
                .try_init()?;
        }
        (None, false) => {
            registry.with(fmt::layer().with_target(false)).try_init()?;
        }
    }

    Ok(())
}
