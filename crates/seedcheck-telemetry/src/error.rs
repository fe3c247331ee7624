//! Errors raised while installing the subscriber or exposing run metrics.

use std::fmt::{self, Display, Formatter};
use std::string::FromUtf8Error;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Point in a collector's life where Prometheus refused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStage {
    /// Building the counter or gauge from its options.
    Build,
    /// Adding it to the run registry.
    Register,
}

impl Display for CollectorStage {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Build => "build",
            Self::Register => "register",
        })
    }
}

/// Telemetry failures.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Another global subscriber was installed first.
    #[error("tracing subscriber already installed")]
    SubscriberInstall {
        /// Error reported by `try_init`.
        source: TryInitError,
    },
    /// `logging.format` or `--log-format` named something other than pretty or json.
    #[error("unrecognised log format")]
    UnknownLogFormat {
        /// Value supplied by the operator.
        value: String,
    },
    /// A run metric could not be created or registered.
    #[error("run metric collector rejected")]
    Collector {
        /// Metric name.
        name: &'static str,
        /// Whether building or registering failed.
        stage: CollectorStage,
        /// Prometheus error.
        source: prometheus::Error,
    },
    /// Encoding the registry to text exposition failed.
    #[error("metrics exposition failed")]
    Exposition {
        /// Prometheus error.
        source: prometheus::Error,
    },
    /// The encoder produced bytes that are not UTF-8.
    #[error("metrics exposition was not utf-8")]
    ExpositionEncoding {
        /// Conversion error.
        source: FromUtf8Error,
    },
}
