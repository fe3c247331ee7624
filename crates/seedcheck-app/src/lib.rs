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
#![allow(clippy::redundant_pub_crate)]

//! Wiring for the `seedcheck` binary.
//!
//! Layout:
//! - `cli.rs`: argument parsing and the `run()` entrypoint
//! - `bootstrap.rs`: configuration, telemetry, collaborators and the reconciliation run
//! - `output.rs`: table and JSON renderers
//! - `error.rs`: application error type and exit codes

pub(crate) mod bootstrap;
pub(crate) mod cli;
pub mod error;
pub(crate) mod output;

pub use cli::run;
pub use error::{AppError, AppResult};
