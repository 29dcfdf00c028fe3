//! Logging setup using `tracing` and `tracing-subscriber`
//!
//! The terminal belongs to the TUI, so interactive sessions log to a file.
//! Headless exports log to stderr. `RUST_LOG` overrides the verbosity level.
//!
//! Row values are never logged; events carry entity names, field names and
//! counts only.

use crate::config::Config;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_NAME: &str = "report-export.log";

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Log file; stderr when `None`
    pub log_file: Option<PathBuf>,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_file: None,
            with_ansi: false,
        }
    }
}

impl LogConfig {
    /// 0 → info, 1 → debug, 2+ → trace
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    pub fn with_ansi(mut self, enable: bool) -> Self {
        self.with_ansi = enable;
        self
    }
}

/// `$HOME/.report-export-tui/report-export.log`
pub fn default_log_file() -> Option<PathBuf> {
    Config::config_dir().map(|dir| dir.join(LOG_FILE_NAME))
}

/// Install the global subscriber; call once at startup
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let filter = build_env_filter(config.level);
    let layer = fmt::layer().with_target(false);

    match &config.log_file {
        Some(path) => {
            let writer = open_log_file(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_ansi(false).with_writer(writer))
                .try_init()
                .map_err(io::Error::other)?;
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_ansi(config.with_ansi).with_writer(io::stderr))
                .try_init()
                .map_err(io::Error::other)?;
        }
    }
    Ok(())
}

/// Append-mode log file, creating its directory first
fn open_log_file(path: &Path) -> io::Result<Mutex<File>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Mutex::new(file))
}

/// Level for this crate, `warn` for dependencies, unless `RUST_LOG` is set
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("warn,report_export={level},report_export_tui={level}"))
    })
}
