//! Locate, read, merge and validate the configuration document.
//!
//! # Design
//! - Precedence, lowest first: file, environment, command line.
//! - Environment access goes through a lookup function so tests never mutate process state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{AppConfig, SftpSettings};
use crate::validate::validate;

/// File name searched for in each search directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

const ENV_RPC_URL: &str = "SEEDCHECK_RPC_URL";
const ENV_SFTP_ADDR: &str = "SEEDCHECK_SFTP_ADDR";
const ENV_SFTP_USER: &str = "SEEDCHECK_SFTP_USER";
const ENV_SFTP_PRIVATE_KEY: &str = "SEEDCHECK_SFTP_PRIVATE_KEY";
const ENV_LOG_LEVEL: &str = "SEEDCHECK_LOG_LEVEL";

/// Values taken from `SEEDCHECK_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `SEEDCHECK_RPC_URL`.
    pub rpc_url: Option<String>,
    /// `SEEDCHECK_SFTP_ADDR`.
    pub sftp_addr: Option<String>,
    /// `SEEDCHECK_SFTP_USER`.
    pub sftp_user: Option<String>,
    /// `SEEDCHECK_SFTP_PRIVATE_KEY`.
    pub sftp_private_key: Option<String>,
    /// `SEEDCHECK_LOG_LEVEL`.
    pub log_level: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; empty values are ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            rpc_url: read(ENV_RPC_URL),
            sftp_addr: read(ENV_SFTP_ADDR),
            sftp_user: read(ENV_SFTP_USER),
            sftp_private_key: read(ENV_SFTP_PRIVATE_KEY),
            log_level: read(ENV_LOG_LEVEL),
        }
    }

    /// Overlay the present values onto `config`.
    ///
    /// Any SFTP override creates the `sftp` section when the file had none.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.rpc_url {
            config.transmission.rpc.url.clone_from(url);
        }
        if self.sftp_addr.is_some() || self.sftp_user.is_some() || self.sftp_private_key.is_some()
        {
            let sftp = config
                .transmission
                .sftp
                .get_or_insert_with(SftpSettings::default);
            if let Some(addr) = &self.sftp_addr {
                sftp.addr.clone_from(addr);
            }
            if let Some(user) = &self.sftp_user {
                sftp.user.clone_from(user);
            }
            if let Some(key) = &self.sftp_private_key {
                sftp.private_key = PathBuf::from(key);
            }
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.trim().to_ascii_lowercase();
        }
    }
}

/// Builder describing where configuration comes from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    env: EnvOverrides,
    rules_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            file: None,
            search_dirs: vec![PathBuf::from(".")],
            env: EnvOverrides::default(),
            rules_paths: Vec::new(),
        }
    }
}

impl ConfigLoader {
    /// Search the current directory, with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load exactly this file instead of searching.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Replace the directories searched for [`CONFIG_FILE_NAME`].
    #[must_use]
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    /// Apply these environment overrides after reading the file.
    #[must_use]
    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }

    /// Replace `rules.paths` when non-empty.
    #[must_use]
    pub fn with_rules_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.rules_paths = paths;
        self
    }

    /// Read, merge and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when no file exists, [`ConfigError::Io`] or
    /// [`ConfigError::Parse`] when it cannot be read, and [`ConfigError::InvalidField`] when the
    /// merged result fails validation.
    pub fn load(&self) -> ConfigResult<AppConfig> {
        let path = self.locate()?;
        let mut config = read_file(&path)?;
        self.env.apply(&mut config);
        if !self.rules_paths.is_empty() {
            config.rules.paths.clone_from(&self.rules_paths);
        }
        validate(&config)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn locate(&self) -> ConfigResult<PathBuf> {
        if let Some(file) = &self.file {
            return Ok(file.clone());
        }
        let candidates: Vec<PathBuf> = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .collect();
        if let Some(found) = candidates.iter().find(|candidate| candidate.is_file()) {
            return Ok(found.clone());
        }
        Err(ConfigError::NotFound {
            searched: candidates,
        })
    }
}

fn read_file(path: &Path) -> ConfigResult<AppConfig> {
    let raw = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                searched: vec![path.to_path_buf()],
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
