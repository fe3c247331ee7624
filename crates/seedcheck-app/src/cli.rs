//! Command-line surface and process entrypoint.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use seedcheck_telemetry::LogFormat;

use crate::bootstrap::execute;
use crate::error::{AppError, AppResult, EXIT_CANCELLED};
use crate::output::render_report;

#[derive(Debug, Parser)]
#[command(
    name = "seedcheck",
    version,
    about = "Verify that files Transmission reports complete exist on the download host"
)]
pub(crate) struct Cli {
    /// Configuration file. Defaults to `config.json` in the working directory.
    #[arg(long, env = "SEEDCHECK_CONFIG", value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Rule file location; repeat to pass several. Replaces `rules.paths` from the file.
    #[arg(long = "rules-path", value_name = "PATH")]
    pub(crate) rules_paths: Vec<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select how verified paths and diagnostics are printed"
    )]
    pub(crate) output: OutputFormat,
    /// Log level; overrides the configuration file. `RUST_LOG` wins over both.
    #[arg(long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub(crate) log_level: Option<String>,
    /// Log output format; overrides the configuration file.
    #[arg(long, value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    /// Write the run's Prometheus metrics to stderr after the report.
    #[arg(long)]
    pub(crate) print_metrics: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Parse arguments, run one reconciliation, print the report, and return the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match run_with(&cli).await {
        Ok(false) => 0,
        Ok(true) => EXIT_CANCELLED,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

/// Returns whether the run was interrupted.
async fn run_with(cli: &Cli) -> AppResult<bool> {
    let artifacts = execute(cli).await?;
    let text = render_report(&artifacts.report, cli.output)?;
    let mut stdout = io::stdout().lock();
    // A closed stdout (e.g. `| head`) is not worth failing the run over.
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();

    if cli.print_metrics {
        let rendered = artifacts
            .metrics
            .render()
            .map_err(|err| AppError::telemetry("metrics.render", err))?;
        eprint!("{rendered}");
    }
    Ok(artifacts.report.cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn defaults_select_table_output() -> Result<()> {
        let cli = Cli::try_parse_from(["seedcheck"])?;
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(cli.rules_paths.is_empty());
        assert!(cli.log_format.is_none());
        assert!(!cli.print_metrics);
        Ok(())
    }

    #[test]
    fn rules_path_is_repeatable() -> Result<()> {
        let cli = Cli::try_parse_from([
            "seedcheck",
            "--rules-path",
            "/etc/seedcheck/a.json",
            "--rules-path",
            "/etc/seedcheck/b.json",
            "--output",
            "json",
            "--log-format",
            "json",
            "--log-level",
            "debug",
            "--print-metrics",
        ])?;
        assert_eq!(cli.rules_paths.len(), 2);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.log_format.map(LogFormat::from), Some(LogFormat::Json));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(cli.print_metrics);
        Ok(())
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["seedcheck", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
