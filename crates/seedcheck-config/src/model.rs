//! Typed configuration document.
//!
//! Every section has defaults so a file may carry only what differs; the RPC URL has no sensible
//! default and validation rejects it when left empty.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SFTP_TIMEOUT_SECS: u64 = 15;

/// Root configuration document (`config.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download manager and its host.
    pub transmission: TransmissionSettings,
    /// Reconciler tunables.
    pub reconcile: ReconcileSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// Rule files handed to downstream consumers of the verified list.
    pub rules: RulesSettings,
}

/// `transmission` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionSettings {
    /// JSON-RPC endpoint.
    pub rpc: RpcSettings,
    /// SFTP access to the host holding the downloads. Absent means the local filesystem.
    pub sftp: Option<SftpSettings>,
}

/// `transmission.rpc` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    /// Endpoint URL, optionally carrying `user:password@` credentials.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
        }
    }
}

impl RpcSettings {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `transmission.sftp` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SftpSettings {
    /// `host:port` of the SSH server.
    pub addr: String,
    /// Login user.
    pub user: String,
    /// Path to the private key file.
    pub private_key: PathBuf,
    /// Passphrase for the private key.
    pub passphrase: Option<String>,
    /// Connect and per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SftpSettings {
    fn default() -> Self {
        Self {
            addr: String::new(),
            user: String::new(),
            private_key: PathBuf::new(),
            passphrase: None,
            timeout_secs: DEFAULT_SFTP_TIMEOUT_SECS,
        }
    }
}

impl SftpSettings {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `reconcile` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Maximum number of stat calls in flight.
    pub stat_concurrency: usize,
    /// Exclude files the user deselected in the download manager.
    pub skip_unwanted: bool,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            stat_concurrency: 1,
            skip_unwanted: false,
        }
    }
}

/// `logging` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level filter used when `RUST_LOG` is unset.
    pub level: String,
    /// `pretty` or `json`; unset picks by build profile.
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: None,
        }
    }
}

/// `rules` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesSettings {
    /// Rule file locations.
    pub paths: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn full_document_parses() -> Result<()> {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "transmission": {
                    "rpc": { "url": "http://seedbox:9091/transmission/rpc", "timeout_secs": 5 },
                    "sftp": {
                        "addr": "seedbox:22",
                        "user": "seed",
                        "private_key": "/home/seed/.ssh/id_ed25519"
                    }
                },
                "reconcile": { "stat_concurrency": 8, "skip_unwanted": true },
                "logging": { "level": "debug", "format": "json" },
                "rules": { "paths": ["/etc/seedcheck/rules.json"] }
            }"#,
        )?;

        assert_eq!(config.transmission.rpc.timeout(), Duration::from_secs(5));
        let sftp = config.transmission.sftp.as_ref();
        assert_eq!(sftp.map(|sftp| sftp.timeout_secs), Some(15));
        assert_eq!(sftp.and_then(|sftp| sftp.passphrase.clone()), None);
        assert_eq!(config.reconcile.stat_concurrency, 8);
        assert!(config.reconcile.skip_unwanted);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(config.rules.paths.len(), 1);
        Ok(())
    }

    #[test]
    fn sparse_document_takes_defaults() -> Result<()> {
        let config: AppConfig =
            serde_json::from_str(r#"{"transmission":{"rpc":{"url":"http://h/rpc"}}}"#)?;
        assert_eq!(config.transmission.rpc.timeout_secs, 10);
        assert!(config.transmission.sftp.is_none());
        assert_eq!(config.reconcile, ReconcileSettings::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.rules.paths.is_empty());
        Ok(())
    }
}
