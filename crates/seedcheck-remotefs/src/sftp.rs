//! SFTP backend built on `ssh2`.
//!
//! # Design
//! - `ssh2` is blocking; every call runs on the blocking pool via `spawn_blocking`.
//! - One session serves the whole run. Calls are serialised behind a mutex because a single
//!   SFTP channel handles one request at a time.
//! - The server's host key is not verified.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use seedcheck_core::{FileMetadata, RemoteFileStat, StatError, StatResult};
use ssh2::{ErrorCode, FileStat, Session, Sftp};
use tokio::task;
use tracing::{info, warn};

use crate::error::{RemoteFsError, RemoteFsResult};

/// `LIBSSH2_FX_NO_SUCH_FILE`.
const FX_NO_SUCH_FILE: i32 = 2;
/// `LIBSSH2_FX_NO_SUCH_PATH`.
const FX_NO_SUCH_PATH: i32 = 10;

/// Connection parameters for [`SftpFileStat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SftpOptions {
    /// `host:port` of the SSH server.
    pub addr: String,
    /// Login user.
    pub user: String,
    /// Private key used for public-key authentication.
    pub private_key: PathBuf,
    /// Passphrase protecting the private key, if any.
    pub passphrase: Option<String>,
    /// Timeout for the TCP connect and each blocking SSH call.
    pub timeout: Duration,
}

struct Channel {
    // Keeps the transport alive for as long as the SFTP channel is in use.
    _session: Session,
    sftp: Sftp,
}

/// Stats paths over an authenticated SFTP session.
pub struct SftpFileStat {
    channel: Arc<Mutex<Channel>>,
    addr: String,
}

impl std::fmt::Debug for SftpFileStat {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SftpFileStat")
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

impl SftpFileStat {
    /// Dial, authenticate and open an SFTP channel.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteFsError`] when the host is unreachable, the SSH handshake fails, the key is
    /// rejected, or the SFTP subsystem cannot be started.
    pub async fn connect(options: SftpOptions) -> RemoteFsResult<Self> {
        let addr = options.addr.clone();
        let channel = task::spawn_blocking(move || open_channel(&options))
            .await
            .map_err(|source| RemoteFsError::Join { source })??;
        info!(addr = %addr, "sftp session established");
        Ok(Self {
            channel: Arc::new(Mutex::new(channel)),
            addr,
        })
    }

    /// Address of the connected server.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

#[async_trait]
impl RemoteFileStat for SftpFileStat {
    async fn stat(&self, path: &str) -> StatResult<FileMetadata> {
        let channel = Arc::clone(&self.channel);
        let target = path.to_string();
        let answer = task::spawn_blocking(move || {
            let channel = channel.lock().unwrap_or_else(PoisonError::into_inner);
            let stat = channel
                .sftp
                .stat(Path::new(&target))
                .map_err(|err| classify(&target, err))?;
            size_of(&target, &stat)
        })
        .await;
        match answer {
            Ok(Ok(size)) => Ok(FileMetadata { size }),
            Ok(Err(err)) => Err(err),
            Err(join) => Err(StatError::transport(path, join)),
        }
    }
}

fn open_channel(options: &SftpOptions) -> RemoteFsResult<Channel> {
    let addr = &options.addr;
    let tcp = dial(addr, options.timeout)?;
    let ssh = |operation: &'static str| {
        move |source: ssh2::Error| RemoteFsError::Ssh {
            operation,
            addr: addr.clone(),
            source,
        }
    };

    let mut session = Session::new().map_err(ssh("session"))?;
    session.set_timeout(timeout_ms(options.timeout));
    session.set_tcp_stream(tcp);
    session.handshake().map_err(ssh("handshake"))?;
    warn!(addr = %addr, "sftp host key is not verified");

    session
        .userauth_pubkey_file(
            &options.user,
            None,
            &options.private_key,
            options.passphrase.as_deref(),
        )
        .map_err(ssh("userauth"))?;
    if !session.authenticated() {
        return Err(RemoteFsError::Rejected {
            user: options.user.clone(),
        });
    }

    let sftp = session.sftp().map_err(ssh("sftp"))?;
    Ok(Channel {
        _session: session,
        sftp,
    })
}

fn dial(addr: &str, timeout: Duration) -> RemoteFsResult<TcpStream> {
    let connect = |source| RemoteFsError::Connect {
        addr: addr.to_string(),
        source,
    };
    let mut last_error = None;
    for candidate in addr.to_socket_addrs().map_err(connect)? {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_error = Some(err),
        }
    }
    Err(connect(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "address resolved to nothing",
        )
    })))
}

fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

fn size_of(path: &str, stat: &FileStat) -> StatResult<u64> {
    stat.size.ok_or_else(|| {
        StatError::transport(
            path,
            io::Error::new(io::ErrorKind::InvalidData, "size attribute missing"),
        )
    })
}

fn classify(path: &str, err: ssh2::Error) -> StatError {
    match err.code() {
        ErrorCode::SFTP(FX_NO_SUCH_FILE | FX_NO_SUCH_PATH) => StatError::not_found(path),
        _ => StatError::transport(path, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use std::net::TcpListener;

    fn attributes(size: Option<u64>) -> FileStat {
        FileStat {
            size,
            uid: None,
            gid: None,
            perm: Some(0o100_644),
            atime: None,
            mtime: None,
        }
    }

    #[test]
    fn missing_size_attribute_is_a_transport_error() {
        assert!(matches!(size_of("/data/a.iso", &attributes(Some(42))), Ok(42)));
        assert!(matches!(size_of("/data/empty", &attributes(Some(0))), Ok(0)));

        let err = size_of("/data/a.iso", &attributes(None)).err();
        assert!(err.as_ref().is_some_and(|err| !err.is_not_found()));
        assert!(
            err.is_some_and(|err| err.detail().contains("size attribute missing")),
            "missing size must not read as an empty file"
        );
    }

    #[test]
    fn no_such_file_maps_to_not_found() {
        let err = classify(
            "/data/a.iso",
            ssh2::Error::new(ErrorCode::SFTP(FX_NO_SUCH_FILE), "no such file"),
        );
        assert!(err.is_not_found());

        let err = classify(
            "/data/a.iso",
            ssh2::Error::new(ErrorCode::SFTP(FX_NO_SUCH_PATH), "no such path"),
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn other_sftp_failures_are_transport_errors() {
        let err = classify(
            "/data/a.iso",
            ssh2::Error::new(ErrorCode::SFTP(3), "permission denied"),
        );
        assert!(matches!(err, StatError::Transport { .. }));
        assert!(err.detail().contains("permission denied"));

        let err = classify(
            "/data/a.iso",
            ssh2::Error::new(ErrorCode::Session(-43), "socket recv"),
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn timeout_saturates() {
        assert_eq!(timeout_ms(Duration::from_millis(1500)), 1500);
        assert_eq!(timeout_ms(Duration::from_secs(u64::MAX)), u32::MAX);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connect_error() -> Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?.to_string();
        drop(listener);

        let options = SftpOptions {
            addr: addr.clone(),
            user: "seed".into(),
            private_key: PathBuf::from("/nonexistent/id_ed25519"),
            passphrase: None,
            timeout: Duration::from_secs(1),
        };
        let err = SftpFileStat::connect(options)
            .await
            .err()
            .context("connect should fail")?;
        match err {
            RemoteFsError::Connect { addr: dialled, .. } => assert_eq!(dialled, addr),
            other => anyhow::bail!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn unresolvable_address_is_a_connect_error() {
        let options = SftpOptions {
            addr: "not an address".into(),
            user: "seed".into(),
            private_key: PathBuf::from("/nonexistent/id_ed25519"),
            passphrase: None,
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            SftpFileStat::connect(options).await,
            Err(RemoteFsError::Connect { .. })
        ));
    }
}
