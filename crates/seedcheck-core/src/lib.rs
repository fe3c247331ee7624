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

//! Reconciliation of download-manager completion state against a remote filesystem.
//!
//! Layout: `model/` (torrent snapshot DTOs and the joined remote path), `service/`
//! (collaborator traits for the torrent source and the remote stat capability),
//! `diagnostic.rs` (failure records and sinks), `cancel.rs` (run cancellation),
//! `reconcile.rs` (the verification pipeline), `error.rs` (collaborator errors).

pub mod cancel;
pub mod diagnostic;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod service;

pub use cancel::CancelToken;
pub use diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticSink, Tee, TracingSink};
pub use error::{SourceError, SourceResult, StatError, StatResult};
pub use model::{FileEntry, FileMetadata, FileStatEntry, TorrentRecord, VerifiedFile, join_remote};
pub use reconcile::{ReconcilePolicy, ReconcileStats, Reconciler, Reconciliation};
pub use service::{RemoteFileStat, TorrentSource};
