//! # Design
//!
//! - Centralize application-level errors for bootstrap and the reconciliation run.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Map each failure class to a stable process exit code.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Exit code for a configuration problem.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for a failure talking to the download manager or the download host.
pub const EXIT_FAILURE: i32 = 3;
/// Exit code when the run was interrupted.
pub const EXIT_CANCELLED: i32 = 130;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: seedcheck_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: seedcheck_telemetry::TelemetryError,
    },
    /// Fetching the torrent snapshot failed.
    #[error("torrent source operation failed")]
    Source {
        /// Operation identifier.
        operation: &'static str,
        /// Source torrent source error.
        source: seedcheck_core::SourceError,
    },
    /// Connecting to the download host failed.
    #[cfg(feature = "sftp")]
    #[error("remote filesystem operation failed")]
    RemoteFs {
        /// Operation identifier.
        operation: &'static str,
        /// Source remote filesystem error.
        source: seedcheck_remotefs::RemoteFsError,
    },
    /// Serialising the report failed.
    #[error("output rendering failed")]
    Render {
        /// Operation identifier.
        operation: &'static str,
        /// Source serialisation error.
        source: serde_json::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: seedcheck_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: seedcheck_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn snapshot(
        operation: &'static str,
        source: seedcheck_core::SourceError,
    ) -> Self {
        Self::Source { operation, source }
    }

    /// Process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => EXIT_CONFIG,
            _ => EXIT_FAILURE,
        }
    }

    /// Message shown to the operator: the constant message, the operation, and the cause chain.
    #[must_use]
    pub fn display_message(&self) -> String {
        let (operation, cause) = match self {
            Self::Config { operation, source } => (*operation, source.describe()),
            Self::Telemetry { operation, source } => (*operation, chain(source)),
            Self::Source { operation, source } => (*operation, chain(source)),
            #[cfg(feature = "sftp")]
            Self::RemoteFs { operation, source } => (*operation, chain(source)),
            Self::Render { operation, source } => (*operation, chain(source)),
        };
        format!("{self} ({operation}): {cause}")
    }
}

fn chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut current = error.source();
    while let Some(cause) = current {
        parts.push(cause.to_string());
        current = cause.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn exit_codes_split_configuration_from_operational_failures() {
        let config = AppError::config(
            "config.load",
            seedcheck_config::ConfigError::NotFound {
                searched: Vec::new(),
            },
        );
        assert_eq!(config.exit_code(), EXIT_CONFIG);

        let source = AppError::snapshot(
            "source.fetch",
            seedcheck_core::SourceError::transport(
                "torrent_get",
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ),
        );
        assert_eq!(source.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn display_message_walks_the_cause_chain() {
        let err = AppError::snapshot(
            "source.fetch",
            seedcheck_core::SourceError::transport(
                "torrent_get",
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ),
        );
        assert_eq!(
            err.display_message(),
            "torrent source operation failed (source.fetch): \
             torrent source transport failure: connection refused"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn config_message_carries_field_context() {
        let err = AppError::config(
            "config.load",
            seedcheck_config::ConfigError::InvalidField {
                section: "logging",
                field: "level",
                value: Some("loud".into()),
                reason: "must be one of trace, debug, info, warn, error",
            },
        );
        assert!(err.display_message().contains("logging.level=\"loud\""));
    }
}
