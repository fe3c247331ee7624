//! Failure records emitted for files that did not pass verification, plus the sinks that route
//! them.
//!
//! # Design
//!
//! - Diagnostics are data, not errors: the run succeeds regardless of how many are emitted.
//! - Callers pick the routing by passing a sink; nothing here touches a global logger unless
//!   the caller asks for [`TracingSink`].

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Why a file was excluded from the verified output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// Reported complete upstream but absent on the target filesystem.
    MissingSource,
    /// Present on the target filesystem with a size other than the expected length.
    SizeMismatch,
    /// The stat call failed for a reason other than absence.
    TransportError,
    /// The torrent record's file sequences disagree in length; the whole torrent was skipped.
    MalformedRecord,
}

impl DiagnosticCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::MissingSource,
        Self::SizeMismatch,
        Self::TransportError,
        Self::MalformedRecord,
    ];

    /// Stable machine-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingSource => "missing_source",
            Self::SizeMismatch => "size_mismatch",
            Self::TransportError => "transport_error",
            Self::MalformedRecord => "malformed_record",
        }
    }
}

impl Display for DiagnosticCategory {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One verification failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// Failure category.
    pub category: DiagnosticCategory,
    /// Label of the torrent the file belongs to.
    pub torrent: String,
    /// Logical file name relative to the download directory (empty for malformed records).
    pub name: String,
    /// Resolved remote path (the download directory for malformed records).
    pub path: String,
    /// Expected value: the file length, or the declared file count for malformed records.
    pub expected: u64,
    /// Observed value: the remote size for size mismatches, the engine counter for missing or
    /// unreachable files, the offending sequence length for malformed records.
    pub actual: u64,
    /// Free-form cause, e.g. the transport error text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Receiver for diagnostics produced during a run.
pub trait DiagnosticSink: Send {
    /// Accept one diagnostic.
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S> DiagnosticSink for &mut S
where
    S: DiagnosticSink + ?Sized,
{
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}

/// Sink that logs each diagnostic as a structured `warn` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let Diagnostic {
            category,
            torrent,
            name,
            path,
            expected,
            actual,
            detail,
        } = &diagnostic;
        match category {
            DiagnosticCategory::MissingSource => warn!(
                torrent = %torrent,
                name = %name,
                source = %path,
                size = %format!("{actual}/{expected}"),
                "source file missing"
            ),
            DiagnosticCategory::SizeMismatch => warn!(
                torrent = %torrent,
                filename = %path,
                torrent_file_size = expected,
                fs_file_size = actual,
                "filesize mismatch"
            ),
            DiagnosticCategory::TransportError => warn!(
                torrent = %torrent,
                name = %name,
                source = %path,
                error = detail.as_deref().unwrap_or("unknown"),
                "source file stat failed"
            ),
            DiagnosticCategory::MalformedRecord => warn!(
                torrent = %torrent,
                download_dir = %path,
                file_count = expected,
                actual,
                field = detail.as_deref().unwrap_or("unknown"),
                "torrent record malformed; skipping torrent"
            ),
        }
    }
}

/// Sink that forwards every diagnostic to two sinks in order.
#[derive(Debug, Clone, Default)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A, B> Tee<A, B> {
    /// Pair two sinks.
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Split back into the wrapped sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A, B> DiagnosticSink for Tee<A, B>
where
    A: DiagnosticSink,
    B: DiagnosticSink,
{
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.first.emit(diagnostic.clone());
        self.second.emit(diagnostic);
    }
}
