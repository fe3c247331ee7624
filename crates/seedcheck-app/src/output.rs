//! Report renderers.

use serde::Serialize;
use seedcheck_core::{Diagnostic, ReconcileStats, VerifiedFile};

use crate::cli::OutputFormat;
use crate::error::{AppError, AppResult};

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(crate) struct Report {
    pub(crate) verified: Vec<VerifiedFile>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) cancelled: bool,
    #[serde(skip)]
    pub(crate) stats: ReconcileStats,
}

pub(crate) fn render_report(report: &Report, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|source| AppError::Render {
                operation: "report.json",
                source,
            }),
        OutputFormat::Table => Ok(render_table(report)),
    }
}

fn render_table(report: &Report) -> String {
    let mut lines: Vec<String> = report
        .verified
        .iter()
        .map(|file| file.as_str().to_string())
        .collect();
    if !report.diagnostics.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!(
            "{:<16} {:>14} {:>14} PATH",
            "PROBLEM", "EXPECTED", "ACTUAL"
        ));
        for diagnostic in &report.diagnostics {
            let mut line = format!(
                "{:<16} {:>14} {:>14} {}",
                diagnostic.category.as_str(),
                diagnostic.expected,
                diagnostic.actual,
                diagnostic.path
            );
            if let Some(detail) = &diagnostic.detail {
                line.push_str(" (");
                line.push_str(detail);
                line.push(')');
            }
            lines.push(line);
        }
    }
    lines.push(summary(report));
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn summary(report: &Report) -> String {
    let stats = &report.stats;
    let mut line = format!(
        "verified {} of {} files across {} torrents; {} diagnostics",
        report.verified.len(),
        stats.files,
        stats.torrents,
        report.diagnostics.len()
    );
    if report.cancelled {
        line.push_str("; interrupted");
    }
    line
}
