//! Failures raised while establishing a remote filesystem session.

use std::io;

use thiserror::Error;

/// Result alias for session setup.
pub type RemoteFsResult<T> = Result<T, RemoteFsError>;

/// Errors raised while connecting to a remote filesystem.
#[derive(Debug, Error)]
pub enum RemoteFsError {
    /// The TCP connection could not be established.
    #[error("failed to connect to remote host")]
    Connect {
        /// Address that was dialled.
        addr: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// An SSH protocol step failed.
    #[error("ssh session setup failed")]
    Ssh {
        /// Step that failed.
        operation: &'static str,
        /// Address of the remote host.
        addr: String,
        /// Underlying SSH error.
        #[source]
        source: ssh2::Error,
    },
    /// The server did not accept the supplied key.
    #[error("remote host rejected authentication")]
    Rejected {
        /// User that attempted to authenticate.
        user: String,
    },
    /// The blocking setup task panicked or was cancelled.
    #[error("remote session setup task failed")]
    Join {
        /// Underlying join error.
        #[source]
        source: tokio::task::JoinError,
    },
}
