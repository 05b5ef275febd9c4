//! Configuration management for todolist
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{CONFIG_GENERATED, MAX_SIMULATED_LATENCY_MS};
use crate::session::CompletionPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Offer "Continue with Google"
    pub google_enabled: bool,
    /// OAuth web client id requested for Google ID tokens
    pub google_client_id: String,
    /// Offer "Continue with Facebook"
    pub facebook_enabled: bool,
    /// Read permissions requested from Facebook Login
    pub facebook_permissions: Vec<String>,
    /// Artificial delay added to every in-memory provider call, in milliseconds
    pub simulated_latency_ms: u64,
}

/// Session controller configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Which completion sets the state when sign-in requests overlap
    pub completion_policy: CompletionPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging to file
    pub enabled: bool,
    /// Minimum level written to the log file ("error", "warn", "info", "debug", "trace")
    pub level: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            google_enabled: true,
            google_client_id: "default_web_client_id".to_string(),
            facebook_enabled: true,
            facebook_permissions: vec!["email".to_string(), "public_profile".to_string()],
            simulated_latency_ms: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from("todolist.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("todolist").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.auth.google_enabled && self.auth.google_client_id.trim().is_empty() {
            anyhow::bail!("google_client_id cannot be empty while Google sign-in is enabled");
        }

        if self.auth.facebook_enabled {
            if self.auth.facebook_permissions.is_empty() {
                anyhow::bail!("facebook_permissions cannot be empty while Facebook login is enabled");
            }
            if let Some(blank) = self.auth.facebook_permissions.iter().find(|p| p.trim().is_empty()) {
                anyhow::bail!("facebook_permissions contains an invalid entry '{}'", blank);
            }
        }

        if self.auth.simulated_latency_ms > MAX_SIMULATED_LATENCY_MS {
            anyhow::bail!(
                "simulated_latency_ms cannot exceed {}, got {}",
                MAX_SIMULATED_LATENCY_MS,
                self.auth.simulated_latency_ms
            );
        }

        if log::LevelFilter::from_str(&self.logging.level).is_err() {
            anyhow::bail!(
                "Invalid logging level '{}'. Expected one of: off, error, warn, info, debug, trace",
                self.logging.level
            );
        }

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# todolist Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("todolist"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
