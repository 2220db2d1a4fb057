//! Logging Infrastructure
//!
//! Console logging, plus optional daily rotating files:
//! - `log_dir/app`   application logs (deleted after 14 days)
//! - `log_dir/audit` events with `target: "audit"` (never deleted)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Target used for audit events
pub const AUDIT_TARGET: &str = "audit";

/// Days an application log file is kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Deletes `app.YYYY-MM-DD` files older than the retention window
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(());
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date) = name
            .strip_prefix("app.")
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }
    Ok(())
}

/// Hourly cleanup loop
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Initialize logging with optional file output
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug"); `RUST_LOG` overrides it
/// * `json_format` - JSON lines instead of human-readable output
/// * `log_dir` - Directory for rotating log files, console only when `None`
///
/// Cleanup of old files is scheduled when called inside a tokio runtime.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let Some(dir) = log_dir else {
        if json_format {
            subscriber
                .with(fmt::layer().json().with_target(true).with_current_span(true))
                .try_init()?;
        } else {
            subscriber
                .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
                .try_init()?;
        }
        return Ok(());
    };

    let log_dir = Path::new(dir);
    let app_log_dir = log_dir.join("app");
    let audit_log_dir = log_dir.join("audit");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&audit_log_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let audit_log = RollingFileAppender::new(Rotation::DAILY, audit_log_dir, "audit");

    if json_format {
        let console_layer = fmt::layer().json().with_target(true).with_current_span(true);
        let app_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::sync::Mutex::new(app_log))
            .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                meta.target() != AUDIT_TARGET
            }));
        let audit_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::sync::Mutex::new(audit_log))
            .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                meta.target() == AUDIT_TARGET
            }));

        subscriber
            .with(console_layer)
            .with(app_layer)
            .with(audit_layer)
            .try_init()?;
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let app_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(app_log))
            .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                meta.target() != AUDIT_TARGET
            }));
        let audit_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(audit_log))
            .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                meta.target() == AUDIT_TARGET
            }));

        subscriber
            .with(console_layer)
            .with(app_layer)
            .with(audit_layer)
            .try_init()?;
    }

    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(periodic_cleanup(log_dir.to_path_buf()));
    }
    Ok(())
}

/// Initialize console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}
