//! Logging configuration
//!
//! Diagnostics go to stderr so command output on stdout stays clean for
//! `--output json|yaml`. An optional file receives the same events as JSON.

use crate::error::{DashboardError, Result};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub file_path: Option<String>,
    /// Log to stderr as JSON instead of the compact text format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Install the global subscriber
    ///
    /// The returned guard flushes the log file on drop and must be held for
    /// the life of the process.
    pub fn init(&self) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| DashboardError::Config(format!("invalid log level: {}", e)))?;

        let console_layer = if self.json_format {
            fmt::layer()
                .with_target(true)
                .with_writer(io::stderr)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_target(false)
                .with_ansi(true)
                .compact()
                .with_writer(io::stderr)
                .boxed()
        };

        let (file_layer, guard) = match self.file_path {
            Some(ref path) => {
                let path = Path::new(path);
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let file_name = path.file_name().ok_or_else(|| {
                    DashboardError::Config(format!("invalid log file: {}", path.display()))
                })?;
                std::fs::create_dir_all(dir)?;

                let (writer, guard) = non_blocking(rolling::never(dir, file_name));
                let layer = fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| DashboardError::Config(format!("failed to initialise logging: {}", e)))?;

        tracing::debug!(level = %self.level, "logging initialised");
        Ok(guard)
    }
}
