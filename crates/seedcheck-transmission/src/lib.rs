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

//! Transmission JSON-RPC adapter implementing the reconciler's torrent source.
//!
//! Layout: `client.rs` (HTTP transport and session handshake), `wire.rs` (RPC envelopes and
//! conversion into snapshot records).

pub mod client;
mod wire;

pub use client::{ClientOptions, DEFAULT_TIMEOUT, SESSION_ID_HEADER, TransmissionClient};
