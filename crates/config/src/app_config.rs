//! Application-level configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Log level for application logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ValidationError::with_value(
                "app.log_level",
                "must be one of: error, warn, info, debug, trace",
                other,
            )),
        }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Log level for application output
    pub log_level: LogLevel,

    /// Where catalog, markers and audio blobs live; empty means the
    /// platform cache directory
    pub cache_dir: PathBuf,

    /// Enable debug mode (extra logging of media events)
    pub debug_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            cache_dir: PathBuf::new(),
            debug_mode: false,
        }
    }
}

impl AppConfig {
    /// Effective filter for env_logger
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug_mode {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

impl ConfigSection for AppConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = Vec::new();

        if self.cache_dir.is_file() {
            results.push(Err(ValidationError::with_value(
                "app.cache_dir",
                "must be a directory",
                self.cache_dir.display(),
            )));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.log_level = other.log_level;
        self.cache_dir = other.cache_dir;
        self.debug_mode = other.debug_mode;
    }

    fn section_name(&self) -> &'static str {
        "app"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.cache_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_cache_dir_must_not_be_a_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = AppConfig {
            cache_dir: file.path().to_path_buf(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge() {
        let mut base = AppConfig::default();
        let other = AppConfig {
            log_level: LogLevel::Debug,
            debug_mode: true,
            cache_dir: PathBuf::from("/tmp/storyspark"),
        };

        base.merge(other);
        assert_eq!(base.log_level, LogLevel::Debug);
        assert!(base.debug_mode);
        assert_eq!(base.cache_dir, PathBuf::from("/tmp/storyspark"));
    }

    #[test]
    fn test_log_level_parse_and_display() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::Error.to_string(), "error");
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_debug_mode_raises_level() {
        let config = AppConfig {
            debug_mode: true,
            ..Default::default()
        };
        assert_eq!(config.effective_log_level(), LogLevel::Debug);
    }
}
