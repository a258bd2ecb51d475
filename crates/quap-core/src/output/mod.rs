//! Payload formatting for stdout.
//!
//! Reports are written as a JSON envelope, a Markdown document, or a
//! one-line summary. Density series go through a [`SeriesRenderer`].

pub mod series;

pub use series::{AsciiChartRenderer, CsvRenderer, JsonRenderer, RenderKind, SeriesRenderer};

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::walkthrough::{error_kind, SweepOutcome, SweepReport, WalkthroughReport};
use crate::SCHEMA_VERSION;

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default for machine consumption)
    #[default]
    Json,

    /// Human-readable Markdown
    Md,

    /// One-line summary for quick checks
    Summary,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Md => write!(f, "md"),
            OutputFormat::Summary => write!(f, "summary"),
        }
    }
}

/// Common JSON envelope around every command payload.
pub fn envelope(command: &str, run_id: &str, payload: impl Serialize) -> Result<String> {
    let value = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "run_id": run_id,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": command,
        "status": "ok",
        "result": serde_json::to_value(payload)?,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Error envelope written to stderr.
pub fn format_error(format: OutputFormat, run_id: &str, error: &CoreError) -> String {
    let exit = error.exit_code();
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "error",
                "error": {
                    "code": error.code(),
                    "kind": error_kind(error),
                    "exit_code": exit.as_i32(),
                    "exit_name": exit.code_name(),
                    "message": error.to_string(),
                }
            });
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| error.to_string())
        }
        OutputFormat::Summary => format!("[{}] error {}: {}", run_id, error_kind(error), error),
        OutputFormat::Md => format!(
            "# Error\n\n{}\n\nKind: {} (code {}), exit {}",
            error,
            error_kind(error),
            error.code(),
            exit
        ),
    }
}

fn shape(alpha: f64, beta: f64) -> String {
    format!("Beta({}, {})", alpha, beta)
}

/// Format a single walkthrough report.
pub fn format_report(format: OutputFormat, run_id: &str, report: &WalkthroughReport) -> Result<String> {
    match format {
        OutputFormat::Json => envelope("run", run_id, report),
        OutputFormat::Summary => Ok(format!(
            "[{}] {}: {} -> {} mode={:.4} sigma={:.4} max_abs_diff={:.4} l1={:.4}",
            run_id,
            report.scenario,
            shape(report.prior.alpha, report.prior.beta),
            shape(report.posterior.alpha, report.posterior.beta),
            report.mode.mode,
            report.approximation.sigma,
            report.comparison.max_abs_diff,
            report.comparison.l1_distance,
        )),
        OutputFormat::Md => Ok(report_markdown(report)),
    }
}

fn report_markdown(report: &WalkthroughReport) -> String {
    let mut md = String::new();
    let obs = report.observation;
    let post = report.posterior;
    let approx = report.approximation;
    let cmp = &report.comparison;
    let iv = &report.intervals;

    // Writing into a String cannot fail
    let _ = writeln!(md, "# Walkthrough: {}", report.scenario);
    let _ = writeln!(md);
    let _ = writeln!(
        md,
        "Prior {}, observed {} of {} -> posterior {}",
        shape(report.prior.alpha, report.prior.beta),
        obs.successes,
        obs.trials,
        shape(post.alpha, post.beta),
    );
    let _ = writeln!(md);
    let _ = writeln!(md, "## Posterior");
    let _ = writeln!(md);
    let _ = writeln!(md, "| quantity | value |");
    let _ = writeln!(md, "|---|---|");
    let _ = writeln!(md, "| mean | {:.4} |", post.mean);
    let _ = writeln!(md, "| sd | {:.4} |", post.sd);
    let _ = writeln!(
        md,
        "| mode ({}) | {:.4} |",
        report.mode.strategy, report.mode.mode
    );
    let _ = writeln!(md);
    let _ = writeln!(md, "## Quadratic approximation");
    let _ = writeln!(md);
    let _ = writeln!(md, "| quantity | value |");
    let _ = writeln!(md, "|---|---|");
    let _ = writeln!(md, "| curvature | {:.4} |", approx.curvature);
    let _ = writeln!(md, "| variance | {:.6} |", approx.variance);
    let _ = writeln!(md, "| sigma | {:.4} |", approx.sigma);
    let _ = writeln!(md);
    let _ = writeln!(md, "## Exact vs. approximate density");
    let _ = writeln!(md);
    let _ = writeln!(md, "| band | points | max abs diff | max log ratio |");
    let _ = writeln!(md, "|---|---|---|---|");
    for (name, band) in [
        ("within 1 sigma", &cmp.near_mode),
        ("1-3 sigma", &cmp.shoulders),
        ("beyond 3 sigma", &cmp.tails),
    ] {
        let _ = writeln!(
            md,
            "| {} | {} | {:.4} | {:.4} |",
            name, band.points, band.max_abs_diff, band.max_log_ratio
        );
    }
    let _ = writeln!(md);
    let _ = writeln!(
        md,
        "Largest gap {:.4} at x = {:.3}; L1 distance {:.4}; approximation mass on grid {:.4}.",
        cmp.max_abs_diff, cmp.worst_x, cmp.l1_distance, cmp.approx_mass
    );
    let _ = writeln!(md);
    let _ = writeln!(md, "## {:.0}% central intervals", iv.mass * 100.0);
    let _ = writeln!(md);
    let _ = writeln!(md, "| | lower | upper | width |");
    let _ = writeln!(md, "|---|---|---|---|");
    for (name, interval) in [("exact", &iv.exact), ("approximate", &iv.approx)] {
        let _ = writeln!(
            md,
            "| {} | {:.4} | {:.4} | {:.4} |",
            name,
            interval.lower,
            interval.upper,
            interval.width()
        );
    }
    let _ = writeln!(md);
    let _ = writeln!(
        md,
        "Exact posterior mass inside the approximate interval: {:.4}",
        iv.approx_coverage
    );
    md
}

/// Format a sweep across scenarios.
pub fn format_sweep(format: OutputFormat, run_id: &str, sweep: &SweepReport) -> Result<String> {
    match format {
        OutputFormat::Json => envelope("sweep", run_id, sweep),
        OutputFormat::Summary => {
            let lines: Vec<String> = sweep
                .entries
                .iter()
                .map(|e| match &e.outcome {
                    SweepOutcome::Ok {
                        mode,
                        sigma,
                        l1_distance,
                        ..
                    } => format!(
                        "[{}] {} n={} y={} mode={:.4} sigma={:.4} l1={:.4}",
                        run_id, e.scenario, e.trials, e.successes, mode, sigma, l1_distance
                    ),
                    SweepOutcome::Error { kind, .. } => format!(
                        "[{}] {} n={} y={} error={}",
                        run_id, e.scenario, e.trials, e.successes, kind
                    ),
                })
                .collect();
            Ok(lines.join("\n"))
        }
        OutputFormat::Md => {
            let mut md = String::new();
            let _ = writeln!(md, "# Sweep");
            let _ = writeln!(md);
            let _ = writeln!(
                md,
                "| scenario | n | y | mode | sigma | max abs diff | L1 | tail log ratio | coverage |"
            );
            let _ = writeln!(md, "|---|---|---|---|---|---|---|---|---|");
            for e in &sweep.entries {
                match &e.outcome {
                    SweepOutcome::Ok {
                        mode,
                        sigma,
                        max_abs_diff,
                        l1_distance,
                        tail_log_ratio,
                        interval_coverage,
                    } => {
                        let _ = writeln!(
                            md,
                            "| {} | {} | {} | {:.4} | {:.4} | {:.4} | {:.4} | {:.2} | {:.4} |",
                            e.scenario,
                            e.trials,
                            e.successes,
                            mode,
                            sigma,
                            max_abs_diff,
                            l1_distance,
                            tail_log_ratio,
                            interval_coverage
                        );
                    }
                    SweepOutcome::Error { kind, .. } => {
                        let _ = writeln!(
                            md,
                            "| {} | {} | {} | error: {} | | | | | |",
                            e.scenario, e.trials, e.successes, kind
                        );
                    }
                }
            }
            Ok(md)
        }
    }
}
