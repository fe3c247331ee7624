#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Configuration loading for the seedcheck binary.
//!
//! Layout: `model.rs` (typed document), `loader.rs` (file discovery, environment overrides),
//! `validate.rs` (field checks), `error.rs` (configuration errors).

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_FILE_NAME, ConfigLoader, EnvOverrides};
pub use model::{
    AppConfig, LoggingSettings, ReconcileSettings, RpcSettings, RulesSettings, SftpSettings,
    TransmissionSettings,
};
pub use validate::{parse_rpc_url, validate};
