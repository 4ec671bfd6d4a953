//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/pirwatch/logs/`; stdout stays free for
/// the node's NDJSON event stream.
/// Log level is controlled by the `PIRWATCH_LOG` environment variable.
///
/// # Examples
/// ```bash
/// PIRWATCH_LOG=debug pirwatch
/// PIRWATCH_LOG=pirwatch_app::motion=trace pirwatch
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "pirwatch.log");

    // Default to info for our crates, allow override via PIRWATCH_LOG
    let env_filter = EnvFilter::try_from_env("PIRWATCH_LOG").unwrap_or_else(|_| {
        EnvFilter::new("pirwatch=info,pirwatch_app=info,pirwatch_core=info,warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("pirwatch node starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("pirwatch").join("logs"))
}
