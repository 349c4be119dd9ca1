//! Error types for the settings crate.
//!
//! This module provides structured error types for the run configuration
//! and for parsing the parameter file.

use phasekit_core::ScheduleError;
use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The parameter file could not be parsed.
    #[error("Parameter file error: {0}")]
    Parameter(#[from] ParameterError),

    /// The run configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The parsed parameters do not form a valid schedule.
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Errors raised while reading the parameter text file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// A value could not be read as a number.
    #[error("Line {line_number}: value '{value}' for '{key}' is not a number")]
    MalformedValue {
        line_number: usize,
        key: String,
        value: String,
    },

    /// A line is neither a comment nor a `key : value` pair.
    #[error("Line {line_number}: expected 'key : value', got '{line}'")]
    MalformedLine { line_number: usize, line: String },

    /// A `Phase <N>` key has no usable phase number.
    #[error("Line {line_number}: cannot read a phase number from '{key}'")]
    MalformedPhaseIndex { line_number: usize, key: String },

    /// The file ends before every section was declared.
    #[error("Missing '{name}' section (found {found} of 6 sections)")]
    MissingSection { name: String, found: usize },

    /// The file declares more sections than expected.
    #[error("Too many sections: found {found}, expected 6")]
    TooManySections { found: usize },

    /// A scalar every schedule needs is absent.
    #[error("Missing '{key}' in the {section} section")]
    MissingKey { section: String, key: String },
}

/// Errors related to the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration key is missing.
    #[error("Missing configuration key: {0}")]
    MissingKey(String),

    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A path in the configuration cannot be used.
    #[error("Invalid path for '{key}': {reason}")]
    InvalidPath { key: String, reason: String },
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::MalformedValue {
            line_number: 4,
            key: "Phase 1 (%)".to_string(),
            value: "fifty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Line 4: value 'fifty' for 'Phase 1 (%)' is not a number"
        );

        let err = ParameterError::MissingSection {
            name: "heating".to_string(),
            found: 5,
        };
        assert_eq!(
            err.to_string(),
            "Missing 'heating' section (found 5 of 6 sections)"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingKey("input".to_string());
        assert_eq!(err.to_string(), "Missing configuration key: input");

        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");
    }

    #[test]
    fn test_error_conversion() {
        let err: SettingsError = ParameterError::TooManySections { found: 7 }.into();
        assert!(matches!(err, SettingsError::Parameter(_)));

        let err: SettingsError = ScheduleError::TooFewPhases { count: 1 }.into();
        assert!(matches!(err, SettingsError::Schedule(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SettingsError = io_err.into();
        assert!(matches!(err, SettingsError::IoError(_)));
    }
}
