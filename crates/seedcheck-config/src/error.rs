//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any searched location.
    #[error("configuration file not found")]
    NotFound {
        /// Locations that were checked, in order.
        searched: Vec<PathBuf>,
    },
    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file")]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid JSON for the expected shape.
    #[error("failed to parse configuration file")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &'static str,
        field: &'static str,
        value: Option<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            section,
            field,
            value,
            reason,
        }
    }

    /// One-line description including the context fields.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::NotFound { searched } => {
                let searched: Vec<String> = searched
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect();
                format!("{self} (searched: {})", searched.join(", "))
            }
            Self::Io { path, source } => format!("{self} {}: {source}", path.display()),
            Self::Parse { path, source } => format!("{self} {}: {source}", path.display()),
            Self::InvalidField {
                section,
                field,
                value,
                reason,
            } => match value {
                Some(value) => format!("{self} {section}.{field}={value:?}: {reason}"),
                None => format!("{self} {section}.{field}: {reason}"),
            },
        }
    }
}
