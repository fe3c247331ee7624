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

//! Stat backends answering "does this path exist, and how large is it".
//!
//! Layout: `local.rs` (local filesystem via tokio), `sftp.rs` (SSH file transfer, behind the
//! `sftp` feature), `error.rs` (connection failures).

#[cfg(feature = "sftp")]
pub mod error;
pub mod local;
#[cfg(feature = "sftp")]
pub mod sftp;

#[cfg(feature = "sftp")]
pub use error::{RemoteFsError, RemoteFsResult};
pub use local::LocalFileStat;
#[cfg(feature = "sftp")]
pub use sftp::{SftpFileStat, SftpOptions};
