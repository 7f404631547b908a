//! Error types for the configuration system

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// One or more fields hold values the engine cannot run with
    #[error("Invalid configuration: {}", describe(.0))]
    Invalid(Vec<ValidationError>),

    #[error("Failed to create directory at {path}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Platform directories could not be determined (no home directory)
    #[error("Could not determine {what} directory path")]
    PathResolutionError { what: &'static str },

    #[error("Failed to backup config file: {source}")]
    BackupError { source: std::io::Error },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validation error for a specific config field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the field, e.g. `narrator.mood_interval_ms`
    pub field: String,
    pub message: String,
    /// The rejected value, if it is worth echoing back
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: Some(value.to_string()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field '{}': {}", self.field, self.message)?;
        if let Some(ref value) = self.value {
            write!(f, " (got: {})", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("player.default_volume", "must be between 0 and 1");
        assert_eq!(
            err.to_string(),
            "Field 'player.default_volume': must be between 0 and 1"
        );
    }

    #[test]
    fn test_validation_error_with_value() {
        let err = ValidationError::with_value("narrator.blink_hold_ms", "must be positive", 0);
        assert_eq!(
            err.to_string(),
            "Field 'narrator.blink_hold_ms': must be positive (got: 0)"
        );
    }

    #[test]
    fn test_invalid_lists_every_field() {
        let err = ConfigError::Invalid(vec![
            ValidationError::new("player.skip_seconds", "out of range"),
            ValidationError::new("network.api_base_url", "must be an http(s) URL"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: Field 'player.skip_seconds': out of range; \
             Field 'network.api_base_url': must be an http(s) URL"
        );
    }

    #[test]
    fn test_path_resolution_message() {
        let err = ConfigError::PathResolutionError { what: "cache" };
        assert_eq!(err.to_string(), "Could not determine cache directory path");
    }
}
