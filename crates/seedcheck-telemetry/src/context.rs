//! Root span for one reconciliation run.

use tracing::Span;

use crate::init::build_sha;

/// Facts about a run recorded on its root span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext<'a> {
    /// What the binary was asked to do.
    pub mode: &'a str,
    /// Stat backend in use, `sftp` or `local`.
    pub backend: &'a str,
    /// Host of the Transmission RPC endpoint.
    pub rpc_host: &'a str,
}

/// Build the span a run is instrumented with; every event of the run inherits its fields.
#[must_use]
pub fn run_span(context: &RunContext<'_>) -> Span {
    tracing::info_span!(
        "seedcheck.run",
        mode = context.mode,
        backend = context.backend,
        rpc_host = context.rpc_host,
        build_sha = build_sha(),
    )
}
