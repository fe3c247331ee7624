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

//! Telemetry primitives shared across the seedcheck workspace.
//!
//! This crate centralises logging and metrics so the binary and the library crates adopt a
//! consistent observability story.
//! Layout: `init.rs` (subscriber install), `context.rs` (run span), `metrics.rs` (Prometheus
//! registry), `error.rs` (telemetry errors).

pub mod context;
pub mod error;
pub mod init;
pub mod metrics;

pub use context::{RunContext, run_span};
pub use error::{CollectorStage, Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use metrics::{Metrics, MetricsSnapshot};
