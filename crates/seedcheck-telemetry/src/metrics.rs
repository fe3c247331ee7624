//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Labels are plain strings so the registry stays independent of the reconciler's types.

use std::convert::TryFrom;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{CollectorStage, Result, TelemetryError};

/// Prometheus-backed metrics registry for reconciliation runs.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    torrents_seen_total: IntCounter,
    files_verified_total: IntCounter,
    files_skipped_total: IntCounterVec,
    diagnostics_total: IntCounterVec,
    diagnostics_sum: AtomicU64,
    source_failures_total: IntCounter,
    reconcile_duration_ms: IntGauge,
}

/// Snapshot of the counters, suitable for JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Torrents examined across all runs.
    pub torrents_seen_total: u64,
    /// Files that passed verification.
    pub files_verified_total: u64,
    /// Diagnostics emitted, all categories combined.
    pub diagnostics_total: u64,
    /// Snapshot fetches that failed.
    pub source_failures_total: u64,
    /// Duration of the latest run in milliseconds.
    pub reconcile_duration_ms: i64,
}

impl Metrics {
    /// Construct a new registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let torrents_seen_total = IntCounter::with_opts(Opts::new(
            "torrents_seen_total",
            "Torrents examined by the reconciler",
        ))
        .map_err(collector("torrents_seen_total"))?;
        let files_verified_total = IntCounter::with_opts(Opts::new(
            "files_verified_total",
            "Files confirmed present with the expected size",
        ))
        .map_err(collector("files_verified_total"))?;
        let files_skipped_total = IntCounterVec::new(
            Opts::new(
                "files_skipped_total",
                "Files excluded before any remote lookup, by reason",
            ),
            &["reason"],
        )
        .map_err(collector("files_skipped_total"))?;
        let diagnostics_total = IntCounterVec::new(
            Opts::new("diagnostics_total", "Diagnostics emitted by category"),
            &["category"],
        )
        .map_err(collector("diagnostics_total"))?;
        let source_failures_total = IntCounter::with_opts(Opts::new(
            "source_failures_total",
            "Torrent snapshot fetches that failed",
        ))
        .map_err(collector("source_failures_total"))?;
        let reconcile_duration_ms = IntGauge::with_opts(Opts::new(
            "reconcile_duration_ms",
            "Wall time of the latest reconciliation run (ms)",
        ))
        .map_err(collector("reconcile_duration_ms"))?;

        register(&registry, "torrents_seen_total", &torrents_seen_total)?;
        register(&registry, "files_verified_total", &files_verified_total)?;
        register(&registry, "files_skipped_total", &files_skipped_total)?;
        register(&registry, "diagnostics_total", &diagnostics_total)?;
        register(&registry, "source_failures_total", &source_failures_total)?;
        register(&registry, "reconcile_duration_ms", &reconcile_duration_ms)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                torrents_seen_total,
                files_verified_total,
                files_skipped_total,
                diagnostics_total,
                diagnostics_sum: AtomicU64::new(0),
                source_failures_total,
                reconcile_duration_ms,
            }),
        })
    }

    /// Add to the torrents-seen counter.
    pub fn add_torrents_seen(&self, count: usize) {
        self.inner.torrents_seen_total.inc_by(to_u64(count));
    }

    /// Add to the verified-files counter.
    pub fn add_files_verified(&self, count: usize) {
        self.inner.files_verified_total.inc_by(to_u64(count));
    }

    /// Add to the skipped-files counter for `reason` (`incomplete`, `unwanted`, `diverged`).
    pub fn add_files_skipped(&self, reason: &str, count: usize) {
        self.inner
            .files_skipped_total
            .with_label_values(&[reason])
            .inc_by(to_u64(count));
    }

    /// Count one diagnostic of `category`.
    pub fn inc_diagnostic(&self, category: &str) {
        self.inner
            .diagnostics_total
            .with_label_values(&[category])
            .inc();
        self.inner.diagnostics_sum.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed snapshot fetch.
    pub fn inc_source_failure(&self) {
        self.inner.source_failures_total.inc();
    }

    /// Record the wall time of a reconciliation run.
    pub fn observe_reconcile_duration(&self, duration: Duration) {
        self.inner
            .reconcile_duration_ms
            .set(Self::duration_to_ms(duration));
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::Exposition { source })?;
        String::from_utf8(buffer)
            .map_err(|source| TelemetryError::ExpositionEncoding { source })
    }

    /// Take a point-in-time snapshot of the counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            torrents_seen_total: self.inner.torrents_seen_total.get(),
            files_verified_total: self.inner.files_verified_total.get(),
            diagnostics_total: self.inner.diagnostics_sum.load(Ordering::Relaxed),
            source_failures_total: self.inner.source_failures_total.get(),
            reconcile_duration_ms: self.inner.reconcile_duration_ms.get(),
        }
    }

    /// Convert a duration to milliseconds saturating at `i64::MAX`.
    pub(crate) fn duration_to_ms(duration: Duration) -> i64 {
        i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
    }
}

fn collector(name: &'static str) -> impl FnOnce(prometheus::Error) -> TelemetryError {
    move |source| TelemetryError::Collector {
        name,
        stage: CollectorStage::Build,
        source,
    }
}

fn register<C>(registry: &Registry, name: &'static str, metric: &C) -> Result<()>
where
    C: Collector + Clone + 'static,
{
    registry
        .register(Box::new(metric.clone()))
        .map_err(|source| TelemetryError::Collector {
            name,
            stage: CollectorStage::Register,
            source,
        })
}

fn to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn duration_to_ms_saturates_on_large_values() {
        let duration = Duration::from_secs(u64::MAX / 2);
        assert_eq!(Metrics::duration_to_ms(duration), i64::MAX);
    }

    #[test]
    fn metrics_snapshot_reflects_updates() -> std::result::Result<(), Box<dyn Error>> {
        let metrics = Metrics::new()?;
        metrics.add_torrents_seen(3);
        metrics.add_files_verified(7);
        metrics.add_files_skipped("incomplete", 2);
        metrics.inc_diagnostic("missing_source");
        metrics.inc_diagnostic("size_mismatch");
        metrics.inc_diagnostic("missing_source");
        metrics.inc_source_failure();
        metrics.observe_reconcile_duration(Duration::from_millis(120));

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                torrents_seen_total: 3,
                files_verified_total: 7,
                diagnostics_total: 3,
                source_failures_total: 1,
                reconcile_duration_ms: 120,
            }
        );

        let rendered = metrics.render()?;
        assert!(rendered.contains("torrents_seen_total 3"));
        assert!(rendered.contains("diagnostics_total{category=\"missing_source\"} 2"));
        assert!(rendered.contains("files_skipped_total{reason=\"incomplete\"} 2"));
        Ok(())
    }

    #[test]
    fn fresh_registry_snapshot_is_zeroed() -> std::result::Result<(), Box<dyn Error>> {
        let snapshot = Metrics::new()?.snapshot();
        assert_eq!(snapshot.diagnostics_total, 0);
        assert_eq!(snapshot.reconcile_duration_ms, 0);
        Ok(())
    }
}
