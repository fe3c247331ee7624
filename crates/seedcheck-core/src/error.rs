//! Error types for the reconciler's collaborators.
//!
//! # Design
//!
//! - Keep error messages constant while carrying context fields for debugging.
//! - Separate "path absent" from every other stat failure so callers never collapse them.

use std::error::Error;

use thiserror::Error;

/// Boxed source error carried by transport-style failures.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Result alias for torrent source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result alias for remote stat operations.
pub type StatResult<T> = Result<T, StatError>;

/// Failures raised while fetching a torrent snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be delivered or the response could not be read.
    #[error("torrent source transport failure")]
    Transport {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },
    /// The endpoint rejected the supplied credentials.
    #[error("torrent source rejected credentials")]
    Unauthorized {
        /// Endpoint that rejected the request.
        endpoint: String,
    },
    /// The endpoint answered with a non-success HTTP status.
    #[error("torrent source returned an error status")]
    Status {
        /// Endpoint that produced the status.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },
    /// The RPC call completed but reported a failure result.
    #[error("torrent source reported a failed call")]
    Rpc {
        /// RPC method that failed.
        method: &'static str,
        /// Result string returned by the endpoint.
        result: String,
    },
    /// The response body could not be decoded.
    #[error("torrent source response could not be decoded")]
    Decode {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Underlying decode error.
        #[source]
        source: BoxError,
    },
    /// The response decoded but violated the protocol contract.
    #[error("torrent source response violated the protocol")]
    Protocol {
        /// Field that violated the contract.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl SourceError {
    /// Build a transport failure from any error type.
    pub fn transport(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }

    /// Build a decode failure from any error type.
    pub fn decode(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            operation,
            source: source.into(),
        }
    }
}

/// Failures raised by a remote stat query.
#[derive(Debug, Error)]
pub enum StatError {
    /// The path does not exist on the remote filesystem.
    #[error("remote path not found")]
    NotFound {
        /// Path that was queried.
        path: String,
    },
    /// The stat call itself failed (permission, session, network).
    #[error("remote stat failed")]
    Transport {
        /// Path that was queried.
        path: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

impl StatError {
    /// Build a not-found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Build a transport error for `path`.
    pub fn transport(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether the error signals that the path is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Human-readable description of the underlying cause.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::NotFound { path } => format!("{path}: not found"),
            Self::Transport { source, .. } => source.to_string(),
        }
    }
}
