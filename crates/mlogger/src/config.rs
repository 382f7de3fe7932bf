//! Logger configuration

use crate::{ConfigError, HandlerOptions, Level};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the console + file logger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level written to the console
    pub console_level: Level,

    /// Minimum level written to the log file
    pub file_level: Level,

    /// Log file and rotation settings
    pub file: FileConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console_level: Level::Info,
            file_level: Level::Info,
            file: FileConfig::default(),
        }
    }
}

/// Configuration for log rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Path of the active log file
    pub filename: PathBuf,

    /// Maximum file size before rotation (megabytes)
    ///
    /// Must be at least 1. The environment loader rejects 0, and
    /// `RotatingFile` treats a deserialized 0 as 1.
    pub max_size_mb: u64,

    /// Maximum number of rotated files to keep (0 keeps all)
    pub max_backups: usize,

    /// Maximum age of rotated files in days (0 keeps them forever)
    pub max_age_days: u32,

    /// Whether to compress rotated files
    pub compress: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from("app.log"),
            max_size_mb: 1,
            max_backups: 5,
            max_age_days: 30,
            compress: true,
        }
    }
}

impl LoggerConfig {
    pub fn console_options(&self) -> HandlerOptions {
        HandlerOptions::new(self.console_level)
    }

    pub fn file_options(&self) -> HandlerOptions {
        HandlerOptions::new(self.file_level)
    }

    /// Defaults overridden by `MLOGGER_*` environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("MLOGGER_LEVEL") {
            let level = parse_level("MLOGGER_LEVEL", value)?;
            config.console_level = level;
            config.file_level = level;
        }
        if let Some(value) = lookup("MLOGGER_CONSOLE_LEVEL") {
            config.console_level = parse_level("MLOGGER_CONSOLE_LEVEL", value)?;
        }
        if let Some(value) = lookup("MLOGGER_FILE_LEVEL") {
            config.file_level = parse_level("MLOGGER_FILE_LEVEL", value)?;
        }
        if let Some(value) = lookup("MLOGGER_FILE") {
            config.file.filename = PathBuf::from(value);
        }
        if let Some(value) = lookup("MLOGGER_MAX_SIZE_MB") {
            config.file.max_size_mb = parse_positive("MLOGGER_MAX_SIZE_MB", value)?;
        }
        if let Some(value) = lookup("MLOGGER_MAX_BACKUPS") {
            config.file.max_backups = parse_number("MLOGGER_MAX_BACKUPS", value)?;
        }
        if let Some(value) = lookup("MLOGGER_MAX_AGE_DAYS") {
            config.file.max_age_days = parse_number("MLOGGER_MAX_AGE_DAYS", value)?;
        }
        if let Some(value) = lookup("MLOGGER_COMPRESS") {
            config.file.compress = parse_bool("MLOGGER_COMPRESS", value)?;
        }

        Ok(config)
    }
}

fn parse_level(var: &'static str, value: String) -> Result<Level, ConfigError> {
    Level::parse(&value).ok_or(ConfigError::InvalidLevel { var, value })
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}

fn parse_positive(var: &'static str, value: String) -> Result<u64, ConfigError> {
    match parse_number(var, value.clone())? {
        0 => Err(ConfigError::InvalidNumber { var, value }),
        n => Ok(n),
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}
