//! Run wiring: configuration, telemetry, collaborators, and one reconciliation.
//!
//! # Design
//! - Every step returns an [`AppError`] tagged with the operation that failed.
//! - The snapshot fetch and the reconciliation both observe the Ctrl-C token; an interrupted run
//!   still reports what it verified.
//! - Everything after the Transmission client is built runs inside a span naming the stat
//!   backend and the RPC host.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use seedcheck_config::{
    AppConfig, ConfigLoader, EnvOverrides, ReconcileSettings, parse_rpc_url,
};
use seedcheck_core::{
    CancelToken, Diagnostic, ReconcilePolicy, Reconciler, Reconciliation, RemoteFileStat, Tee,
    TorrentSource, TracingSink,
};
use seedcheck_remotefs::LocalFileStat;
#[cfg(feature = "sftp")]
use seedcheck_remotefs::{SftpFileStat, SftpOptions};
use seedcheck_telemetry::{
    LogFormat, LoggingConfig, Metrics, RunContext, init_logging, run_span,
};
use seedcheck_transmission::{ClientOptions, TransmissionClient};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, warn};

use crate::cli::Cli;
use crate::error::{AppError, AppResult};
use crate::output::Report;

const BUILD_SHA: &str = match option_env!("SEEDCHECK_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Output of a completed run.
pub(crate) struct RunArtifacts {
    pub(crate) report: Report,
    pub(crate) metrics: Metrics,
}

pub(crate) async fn execute(cli: &Cli) -> AppResult<RunArtifacts> {
    let config = load_config(cli, EnvOverrides::from_env())?;
    init_logging(&LoggingConfig {
        level: &config.logging.level,
        format: log_format(cli, &config)?,
        build_sha: BUILD_SHA,
    })
    .map_err(|err| AppError::telemetry("logging.init", err))?;
    info!(version = env!("CARGO_PKG_VERSION"), "seedcheck starting");
    if !config.rules.paths.is_empty() {
        debug!(paths = ?config.rules.paths, "rule paths configured");
    }

    let metrics = Metrics::new().map_err(|err| AppError::telemetry("metrics.init", err))?;
    let source = build_source(&config)?;
    let span = run_span(&RunContext {
        mode: "reconcile",
        backend: backend_kind(&config),
        rpc_host: source.endpoint().host_str().unwrap_or_default(),
    });
    let report = reconcile_once(&config, &source, &metrics)
        .instrument(span)
        .await?;

    Ok(RunArtifacts { report, metrics })
}

async fn reconcile_once(
    config: &AppConfig,
    source: &TransmissionClient,
    metrics: &Metrics,
) -> AppResult<Report> {
    let stat = build_stat(config).await?;
    let cancel = CancelToken::new();
    let interrupt = watch_interrupt(cancel.clone());
    let report = run_reconciliation(
        source,
        stat.as_ref(),
        reconcile_policy(&config.reconcile),
        &cancel,
        metrics,
    )
    .await;
    interrupt.abort();
    report
}

const fn backend_kind(config: &AppConfig) -> &'static str {
    if cfg!(feature = "sftp") && config.transmission.sftp.is_some() {
        "sftp"
    } else {
        "local"
    }
}

pub(crate) fn load_config(cli: &Cli, env: EnvOverrides) -> AppResult<AppConfig> {
    let mut loader = ConfigLoader::new()
        .with_env(env)
        .with_rules_paths(cli.rules_paths.clone());
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut config = loader
        .load()
        .map_err(|err| AppError::config("config.load", err))?;
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    Ok(config)
}

fn log_format(cli: &Cli, config: &AppConfig) -> AppResult<LogFormat> {
    match (cli.log_format, config.logging.format.as_deref()) {
        (Some(format), _) => Ok(format.into()),
        (None, Some(raw)) => raw
            .parse()
            .map_err(|err| AppError::telemetry("logging.format", err)),
        (None, None) => Ok(LogFormat::infer()),
    }
}

fn build_source(config: &AppConfig) -> AppResult<TransmissionClient> {
    let endpoint = parse_rpc_url(&config.transmission.rpc.url)
        .map_err(|err| AppError::config("config.rpc_url", err))?;
    TransmissionClient::new(
        endpoint,
        ClientOptions {
            timeout: config.transmission.rpc.timeout(),
        },
    )
    .map_err(|err| AppError::snapshot("source.build", err))
}

#[cfg_attr(not(feature = "sftp"), allow(clippy::unused_async))]
async fn build_stat(config: &AppConfig) -> AppResult<Box<dyn RemoteFileStat>> {
    match &config.transmission.sftp {
        #[cfg(feature = "sftp")]
        Some(sftp) => {
            let options = SftpOptions {
                addr: sftp.addr.clone(),
                user: sftp.user.clone(),
                private_key: sftp.private_key.clone(),
                passphrase: sftp.passphrase.clone(),
                timeout: sftp.timeout(),
            };
            match SftpFileStat::connect(options).await {
                Ok(backend) => Ok(Box::new(backend)),
                Err(source) => {
                    error!(
                        addr = %sftp.addr,
                        user = %sftp.user,
                        private_key = %sftp.private_key.display(),
                        error = %source,
                        "failed to create transmission host sftp client"
                    );
                    Err(AppError::RemoteFs {
                        operation: "sftp.connect",
                        source,
                    })
                }
            }
        }
        #[cfg(not(feature = "sftp"))]
        Some(_) => {
            warn!("built without sftp support; checking paths on the local filesystem");
            Ok(Box::new(LocalFileStat::new()))
        }
        None => {
            info!("no sftp section configured; checking paths on the local filesystem");
            Ok(Box::new(LocalFileStat::new()))
        }
    }
}

fn reconcile_policy(settings: &ReconcileSettings) -> ReconcilePolicy {
    ReconcilePolicy {
        skip_unwanted: settings.skip_unwanted,
        stat_concurrency: NonZeroUsize::new(settings.stat_concurrency).unwrap_or(NonZeroUsize::MIN),
    }
}

fn watch_interrupt(cancel: CancelToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; stopping after in-flight checks");
            cancel.cancel();
        }
    })
}

pub(crate) async fn run_reconciliation<Src, Stat>(
    source: &Src,
    stat: &Stat,
    policy: ReconcilePolicy,
    cancel: &CancelToken,
    metrics: &Metrics,
) -> AppResult<Report>
where
    Src: TorrentSource + ?Sized,
    Stat: RemoteFileStat + ?Sized,
{
    let started = Instant::now();
    let snapshot = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            warn!("interrupted before the torrent snapshot arrived");
            return Ok(Report {
                cancelled: true,
                ..Report::default()
            });
        }
        fetched = source.fetch_all() => match fetched {
            Ok(snapshot) => snapshot,
            Err(err) => {
                metrics.inc_source_failure();
                error!(error = %err, "failed to get completed torrent files from transmission");
                return Err(AppError::snapshot("source.fetch_all", err));
            }
        },
    };

    let mut sink = Tee::new(TracingSink, Vec::new());
    let outcome = Reconciler::new(policy)
        .reconcile(&snapshot, stat, &mut sink, cancel)
        .await;
    let (_, diagnostics) = sink.into_inner();
    record_metrics(metrics, &outcome, &diagnostics, started.elapsed());
    info!(size = outcome.verified.len(), "completed transmission files");

    Ok(Report {
        verified: outcome.verified,
        diagnostics,
        cancelled: outcome.cancelled,
        stats: outcome.stats,
    })
}

fn record_metrics(
    metrics: &Metrics,
    outcome: &Reconciliation,
    diagnostics: &[Diagnostic],
    elapsed: Duration,
) {
    metrics.add_torrents_seen(outcome.stats.torrents);
    metrics.add_files_verified(outcome.verified.len());
    metrics.add_files_skipped("incomplete", outcome.stats.incomplete);
    metrics.add_files_skipped("unwanted", outcome.stats.unwanted);
    metrics.add_files_skipped("diverged", outcome.stats.diverged);
    for diagnostic in diagnostics {
        metrics.inc_diagnostic(diagnostic.category.as_str());
    }
    metrics.observe_reconcile_duration(elapsed);
}
