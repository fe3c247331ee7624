//! Multi-stage verification of reportedly complete torrent files.
//!
//! # Design
//!
//! - Completeness is checked at three layers: the engine counter, the stat counter and the
//!   size actually present on the target filesystem. Any one of them can lag or lie.
//! - Counter checks are pure and run up front; only the remote stat is awaited. Stats may
//!   overlap up to `stat_concurrency`, but results are consumed in snapshot order so output
//!   and diagnostics never reorder.
//! - Per-file failures become diagnostics. Nothing in a run is an error.

use std::num::NonZeroUsize;

use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cancel::CancelToken;
use crate::diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticSink};
use crate::error::StatResult;
use crate::model::{FileMetadata, TorrentRecord, VerifiedFile, join_remote};
use crate::service::RemoteFileStat;

/// Knobs controlling a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePolicy {
    /// Skip files the engine is not configured to download before any counter is compared.
    pub skip_unwanted: bool,
    /// Maximum number of remote stat calls in flight.
    pub stat_concurrency: NonZeroUsize,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            skip_unwanted: false,
            stat_concurrency: NonZeroUsize::MIN,
        }
    }
}

/// Tallies gathered while planning and executing a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    /// Torrents present in the snapshot.
    pub torrents: usize,
    /// Files visited across well-formed torrents.
    pub files: usize,
    /// Files the engine still reports as in progress.
    pub incomplete: usize,
    /// Files skipped because they are not wanted (only when the policy asks for it).
    pub unwanted: usize,
    /// Files whose two completion counters disagreed.
    pub diverged: usize,
    /// Files whose remote stat completed and was judged.
    pub probed: usize,
    /// Diagnostics forwarded to the sink.
    pub diagnostics: usize,
}

/// Result of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Verified paths in snapshot order, then file index order.
    pub verified: Vec<VerifiedFile>,
    /// Whether the run stopped early because its token was cancelled.
    pub cancelled: bool,
    /// Tallies for logging and metrics.
    pub stats: ReconcileStats,
}

/// Stateless verifier; every call derives its result from scratch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    policy: ReconcilePolicy,
}

/// File that passed the counter checks and awaits its remote stat.
struct Probe {
    torrent: String,
    name: String,
    path: String,
    length: u64,
    bytes_completed: u64,
}

enum Step {
    Malformed(Diagnostic),
    Probe(Probe),
}

enum Outcome {
    Verified(VerifiedFile),
    Rejected(Diagnostic),
    Malformed(Diagnostic),
}

impl Reconciler {
    /// Build a reconciler with the supplied policy.
    #[must_use]
    pub const fn new(policy: ReconcilePolicy) -> Self {
        Self { policy }
    }

    /// Policy this reconciler applies.
    #[must_use]
    pub const fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Verify every file in `snapshot` against `stat`, forwarding failures to `sink`.
    ///
    /// Stops promptly once `cancel` is raised and returns what was verified so far; diagnostics
    /// already forwarded stay forwarded.
    #[instrument(name = "reconcile", skip_all, fields(torrents = snapshot.len()))]
    pub async fn reconcile<S>(
        &self,
        snapshot: &[TorrentRecord],
        stat: &S,
        sink: &mut dyn DiagnosticSink,
        cancel: &CancelToken,
    ) -> Reconciliation
    where
        S: RemoteFileStat + ?Sized,
    {
        let mut stats = ReconcileStats {
            torrents: snapshot.len(),
            ..ReconcileStats::default()
        };
        if cancel.is_cancelled() {
            return Reconciliation {
                verified: Vec::new(),
                cancelled: true,
                stats,
            };
        }

        let steps = self.plan(snapshot, &mut stats);

        let mut outcomes = stream::iter(steps)
            .map(move |step| async move {
                match step {
                    Step::Malformed(diagnostic) => Outcome::Malformed(diagnostic),
                    Step::Probe(probe) => {
                        let result = stat.stat(&probe.path).await;
                        judge(probe, result)
                    }
                }
            })
            .buffered(self.policy.stat_concurrency.get());

        let mut verified = Vec::new();
        let mut cancelled = false;
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = outcomes.next() => next,
            };
            match next {
                Some(Outcome::Verified(path)) => {
                    stats.probed += 1;
                    verified.push(path);
                }
                Some(Outcome::Rejected(diagnostic)) => {
                    stats.probed += 1;
                    stats.diagnostics += 1;
                    sink.emit(diagnostic);
                }
                Some(Outcome::Malformed(diagnostic)) => {
                    stats.diagnostics += 1;
                    sink.emit(diagnostic);
                }
                None => break,
            }
        }

        info!(
            verified = verified.len(),
            diagnostics = stats.diagnostics,
            incomplete = stats.incomplete,
            cancelled,
            "reconciliation finished"
        );
        Reconciliation {
            verified,
            cancelled,
            stats,
        }
    }

    /// Apply the pure stages (shape, A, A', B, C) and return the remaining work in order.
    fn plan(&self, snapshot: &[TorrentRecord], stats: &mut ReconcileStats) -> Vec<Step> {
        let mut steps = Vec::new();
        for torrent in snapshot {
            let label = torrent.label();
            if let Some((field, actual)) = torrent.shape_mismatch() {
                steps.push(Step::Malformed(Diagnostic {
                    category: DiagnosticCategory::MalformedRecord,
                    torrent: label,
                    name: String::new(),
                    path: torrent.download_dir.clone(),
                    expected: torrent.file_count as u64,
                    actual: actual as u64,
                    detail: Some(field.to_string()),
                }));
                continue;
            }

            for (file, file_stat) in torrent.files.iter().zip(&torrent.file_stats) {
                stats.files += 1;
                if !file.is_complete() {
                    stats.incomplete += 1;
                    continue;
                }
                if self.policy.skip_unwanted && !file_stat.wanted {
                    stats.unwanted += 1;
                    continue;
                }
                if file_stat.bytes_completed != file.length {
                    stats.diverged += 1;
                    debug!(
                        torrent = %label,
                        name = %file.name,
                        length = file.length,
                        engine_bytes_completed = file.bytes_completed,
                        stat_bytes_completed = file_stat.bytes_completed,
                        "completion counters disagree; skipping file"
                    );
                    continue;
                }
                steps.push(Step::Probe(Probe {
                    torrent: label.clone(),
                    name: file.name.clone(),
                    path: join_remote(&torrent.download_dir, &file.name),
                    length: file.length,
                    bytes_completed: file.bytes_completed,
                }));
            }
        }
        steps
    }
}

/// Stages D and E: turn a stat result into a verified path or a diagnostic.
fn judge(probe: Probe, result: StatResult<FileMetadata>) -> Outcome {
    let Probe {
        torrent,
        name,
        path,
        length,
        bytes_completed,
    } = probe;
    let (category, actual, detail) = match result {
        Ok(meta) if meta.size == length => return Outcome::Verified(VerifiedFile::new(path)),
        Ok(meta) => (DiagnosticCategory::SizeMismatch, meta.size, None),
        Err(err) if err.is_not_found() => {
            (DiagnosticCategory::MissingSource, bytes_completed, None)
        }
        Err(err) => (
            DiagnosticCategory::TransportError,
            bytes_completed,
            Some(err.detail()),
        ),
    };
    Outcome::Rejected(Diagnostic {
        category,
        torrent,
        name,
        path,
        expected: length,
        actual,
        detail,
    })
}
