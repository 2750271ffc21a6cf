//! Logging Infrastructure
//!
//! Console output plus optional daily rotating files under `<log_dir>/app`.
//! Rotated files older than the retention window are removed by
//! [`cleanup_old_logs`].

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

const APP_LOG_PREFIX: &str = "app";

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Default filter (e.g., "info", "debug"); `RUST_LOG` overrides it
/// * `json_format` - JSON console output instead of the pretty format
/// * `log_dir` - Optional directory for file logging
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// registrar_indexer::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// registrar_indexer::init_logger_with_file("info", true, Some("./work_dir/logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            let app_log_dir = Path::new(dir).join(APP_LOG_PREFIX);
            fs::create_dir_all(&app_log_dir)?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, APP_LOG_PREFIX);
            Some(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(app_log)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Delete rotated `app.YYYY-MM-DD` files older than `retention_days`
///
/// Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: u32) -> anyhow::Result<usize> {
    use chrono::{Local, NaiveDate};

    let app_log_dir = log_dir.join(APP_LOG_PREFIX);
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now().date_naive() - chrono::Duration::days(i64::from(retention_days));
    let mut removed = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        // tracing-appender names daily files `<prefix>.YYYY-MM-DD`
        if let Some(date_part) = name
            .strip_prefix(APP_LOG_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            && let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}
