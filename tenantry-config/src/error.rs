//! Error types for the Tenantry settings system

use std::path::PathBuf;
use tenantry_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Settings-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested settings file does not exist
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Settings parsing or extraction failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// A value parsed but is out of range
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Settings file extension not recognised
    #[error("Unsupported configuration file format: {format}")]
    UnsupportedFormat { format: String },
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl Severity for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        // Without settings the engine cannot start.
        ErrorSeverity::Critical
    }
}
