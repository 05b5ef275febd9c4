use crate::config::LoggingConfig;
use crate::constants::LOG_BUFFER_CAPACITY;
use anyhow::{Context, Result};
use chrono::Utc;
use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Path of the log file once file logging has been installed for this process.
static FILE_LOGGING: OnceCell<PathBuf> = OnceCell::new();

/// Shared logger that can be used across the application
///
/// Entries are kept in memory for the shell's `logs` command and forwarded to the
/// `log` facade, which writes them to a file when logging is enabled in the config.
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<VecDeque<String>>>,
    enabled: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(VecDeque::new())),
            enabled: false,
        }
    }

    /// Create a logger and, when enabled, route the `log` facade to the log file.
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        if config.enabled {
            let level = LevelFilter::from_str(&config.level)
                .map_err(|_| anyhow::anyhow!("Invalid log level '{}'", config.level))?;
            Self::init_file_logging(level)?;
        }

        Ok(Self {
            logs: Arc::new(Mutex::new(VecDeque::new())),
            enabled: config.enabled,
        })
    }

    /// Install a fern dispatch writing to [`Logger::get_log_file_path`].
    ///
    /// Only the first call per process installs anything; later calls return the same path.
    pub fn init_file_logging(level: LevelFilter) -> Result<PathBuf> {
        if let Some(path) = FILE_LOGGING.get() {
            return Ok(path.clone());
        }

        let path = Self::get_log_file_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;

        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{} {} {}] {}",
                    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            .chain(file)
            .apply()
            .map_err(|_| anyhow::anyhow!("A global logger is already installed"))?;

        Ok(FILE_LOGGING.get_or_init(|| path).clone())
    }

    /// Location of the log file under the platform data directory
    pub fn get_log_file_path() -> Result<PathBuf> {
        dirs::data_local_dir()
            .or_else(dirs::cache_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join("todolist").join("todolist.log"))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether this process writes log records to a file
    pub fn has_file_writer(&self) -> bool {
        self.enabled && FILE_LOGGING.get().is_some()
    }

    /// Add a log entry
    pub fn log(&self, message: String) {
        log::info!("{}", message);

        let timestamp = Utc::now().format("%H:%M:%S%.3f").to_string();
        let formatted_message = format!("[{}] {}", timestamp, message);

        if let Ok(mut logs) = self.logs.lock() {
            if logs.len() == LOG_BUFFER_CAPACITY {
                logs.pop_front();
            }
            logs.push_back(formatted_message);
        }
    }

    /// Get all logs sorted by date (newest first)
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            logs.iter().rev().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
