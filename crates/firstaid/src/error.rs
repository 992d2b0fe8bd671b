//! Error types for firstaid.
//!
//! Navigation and telephony failures are handled where they happen and
//! keep their own module-level types. This module covers what reaches the
//! CLI: configuration, guide integrity and console I/O.

use thiserror::Error;

use crate::registry::IntegrityIssue;

/// The main error type for firstaid operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Guide Errors ===
    /// Embedded guide data failed integrity checks.
    #[error("guide data failed validation with {} issue(s)", issues.len())]
    GuideIntegrity {
        /// Every issue found, warnings included.
        issues: Vec<IntegrityIssue>,
    },

    // === I/O Errors ===
    /// Reading from or writing to the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for firstaid operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}
