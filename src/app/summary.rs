use std::process::ExitCode;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::args::OutputFormat;
use crate::cleanup::CleanupReport;
use crate::criteria::{CriterionCheck, Verdict};
use crate::error::{AppError, AppResult, CriteriaError};
use crate::metrics::{AggregateResults, ErrorRecord, LatencyHistogram, Percentiles};
use crate::scheduler::{RunConfig, SchedulerReport};

const PERCENT_DIVISOR: u64 = 100;

fn millis(value: Duration) -> u64 {
    u64::try_from(value.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RunStatus {
    Pass,
    Fail,
    NoData,
}

impl RunStatus {
    pub(crate) fn exit_code(self) -> ExitCode {
        match self {
            RunStatus::Pass => ExitCode::SUCCESS,
            RunStatus::Fail => ExitCode::from(1),
            RunStatus::NoData => ExitCode::from(2),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LatencyStats {
    pub(crate) avg_ms: u64,
    pub(crate) min_ms: u64,
    pub(crate) max_ms: u64,
    #[serde(flatten)]
    pub(crate) percentiles: Percentiles,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SchedulerStats {
    pub(crate) concurrency: usize,
    pub(crate) target_rate: u64,
    pub(crate) planned_duration_ms: u64,
    pub(crate) elapsed_ms: u64,
    pub(crate) batches: u64,
    pub(crate) submitted: u64,
    pub(crate) skipped: u64,
    pub(crate) abandoned: u64,
    pub(crate) cancelled: bool,
    /// Achieved requests per second, x100.
    pub(crate) actual_rps_x100: u64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StressSummary {
    pub(crate) status: RunStatus,
    pub(crate) total: u64,
    pub(crate) success: u64,
    pub(crate) failure: u64,
    pub(crate) timeouts: u64,
    pub(crate) transport_errors: u64,
    pub(crate) unexpected_status: u64,
    pub(crate) retries: u64,
    pub(crate) success_rate_x100: u64,
    pub(crate) error_rate_x100: u64,
    pub(crate) latency: LatencyStats,
    pub(crate) criteria: Vec<CriterionCheck>,
    pub(crate) scheduler: SchedulerStats,
    pub(crate) error_count: usize,
    pub(crate) errors: Vec<ErrorRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunSummary {
    pub(crate) base_url: String,
    pub(crate) stress: Option<StressSummary>,
    pub(crate) cleanup: Option<CleanupReport>,
}

impl RunSummary {
    /// Exit status: the stress verdict when a test ran, success otherwise.
    pub(crate) fn exit_code(&self) -> ExitCode {
        self.stress
            .as_ref()
            .map_or(ExitCode::SUCCESS, |stress| stress.status.exit_code())
    }
}

fn scheduler_stats(config: &RunConfig, report: &SchedulerReport, total: u64) -> SchedulerStats {
    let elapsed_ms = millis(report.elapsed);
    let actual_rps_x100 = u128::from(total)
        .saturating_mul(100_000)
        .checked_div(u128::from(elapsed_ms.max(1)))
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(u64::MAX);
    SchedulerStats {
        concurrency: config.concurrency,
        target_rate: config.target_rate,
        planned_duration_ms: millis(config.duration),
        elapsed_ms,
        batches: report.batches,
        submitted: report.submitted,
        skipped: report.skipped,
        abandoned: report.abandoned,
        cancelled: report.cancelled,
        actual_rps_x100,
    }
}

fn latency_stats(results: &AggregateResults) -> LatencyStats {
    let percentiles = match LatencyHistogram::from_latencies(&results.latencies) {
        Ok(histogram) => histogram.percentiles(),
        Err(err) => {
            warn!("Percentiles unavailable: {}", err);
            Percentiles::default()
        }
    };
    LatencyStats {
        avg_ms: results.average_latency().map_or(0, millis),
        min_ms: results.min_latency().map_or(0, millis),
        max_ms: results.max_latency().map_or(0, millis),
        percentiles,
    }
}

pub(crate) fn stress_summary(
    config: &RunConfig,
    report: &SchedulerReport,
    results: &AggregateResults,
    verdict: &Result<Verdict, CriteriaError>,
    error_limit: usize,
) -> StressSummary {
    let (status, success_rate_x100, error_rate_x100, criteria) = match verdict {
        Ok(verdict) => (
            if verdict.overall_pass {
                RunStatus::Pass
            } else {
                RunStatus::Fail
            },
            verdict.success_rate_x100,
            verdict.error_rate_x100,
            verdict.checks.clone(),
        ),
        Err(CriteriaError::NoData) => (RunStatus::NoData, 0, 0, Vec::new()),
    };

    StressSummary {
        status,
        total: results.total,
        success: results.success,
        failure: results.failure,
        timeouts: results.timeouts,
        transport_errors: results.transport_errors,
        unexpected_status: results.unexpected_status,
        retries: results.retries,
        success_rate_x100,
        error_rate_x100,
        latency: latency_stats(results),
        criteria,
        scheduler: scheduler_stats(config, report, results.total),
        error_count: results.errors.len(),
        errors: results.errors.iter().take(error_limit).cloned().collect(),
    }
}

fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / PERCENT_DIVISOR, value % PERCENT_DIVISOR)
}

pub(crate) fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!("Target: {}", summary.base_url)];

    if let Some(stress) = summary.stress.as_ref() {
        let scheduler = &stress.scheduler;
        lines.push(format!(
            "Load: {} rps target, {} concurrency, {}ms planned / {}ms elapsed",
            scheduler.target_rate,
            scheduler.concurrency,
            scheduler.planned_duration_ms,
            scheduler.elapsed_ms
        ));
        lines.push(format!(
            "Submitted: {} in {} batches (skipped {}, abandoned {}){}",
            scheduler.submitted,
            scheduler.batches,
            scheduler.skipped,
            scheduler.abandoned,
            if scheduler.cancelled { ", cancelled" } else { "" }
        ));
        lines.push(format!("Actual RPS: {}", format_x100(scheduler.actual_rps_x100)));
        lines.push(format!("Total Requests: {}", stress.total));
        lines.push(format!(
            "Successful: {} ({}%)",
            stress.success,
            format_x100(stress.success_rate_x100)
        ));
        lines.push(format!(
            "Failed: {} ({}%)",
            stress.failure,
            format_x100(stress.error_rate_x100)
        ));
        lines.push(format!("Timeouts: {}", stress.timeouts));
        lines.push(format!("Transport Errors: {}", stress.transport_errors));
        lines.push(format!("Non-Expected Status: {}", stress.unexpected_status));
        lines.push(format!("Retries: {}", stress.retries));
        lines.push(format!(
            "Latency avg/min/max: {}ms / {}ms / {}ms",
            stress.latency.avg_ms, stress.latency.min_ms, stress.latency.max_ms
        ));
        lines.push(format!(
            "Latency p50/p90/p99: {}ms / {}ms / {}ms",
            stress.latency.percentiles.p50_ms,
            stress.latency.percentiles.p90_ms,
            stress.latency.percentiles.p99_ms
        ));
        for check in &stress.criteria {
            lines.push(format!(
                "{} {}: {} (threshold {})",
                if check.passed { "PASS" } else { "FAIL" },
                check.criterion.label(),
                check.actual,
                check.threshold
            ));
        }
        if stress.error_count > 0 {
            lines.push(format!(
                "Errors (showing {} of {}):",
                stress.errors.len(),
                stress.error_count
            ));
            for record in &stress.errors {
                let actual = record
                    .actual
                    .map_or_else(|| "none".to_owned(), |code| code.to_string());
                lines.push(format!(
                    "  {} {} expected {} got {} ({}ms){}",
                    record.method,
                    record.path,
                    record.expected,
                    actual,
                    record.latency.as_millis(),
                    record
                        .error
                        .as_ref()
                        .map_or_else(String::new, |error| format!(": {}", error))
                ));
            }
        }
        lines.push(match stress.status {
            RunStatus::Pass => "Result: PASSED".to_owned(),
            RunStatus::Fail => "Result: FAILED".to_owned(),
            RunStatus::NoData => "Result: NO DATA (no requests were recorded)".to_owned(),
        });
    }

    if let Some(cleanup) = summary.cleanup.as_ref() {
        lines.push(format!("Cleanup: deleted {} test resources", cleanup.deleted));
        for path in &cleanup.paths {
            lines.push(format!(
                "  {}: {} matched, {} deleted{}",
                path.path,
                path.matched,
                path.deleted,
                path.error
                    .as_ref()
                    .map_or_else(String::new, |error| format!(" ({})", error))
            ));
        }
    }
    lines
}

/// Writes the summary as text lines on stdout, or as JSON to stdout or a file.
///
/// # Errors
///
/// Returns an error when JSON serialization or the output file write fails.
pub(crate) fn emit_summary(
    summary: &RunSummary,
    format: OutputFormat,
    output: Option<&str>,
) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in summary_lines(summary) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary)?;
            if let Some(path) = output {
                std::fs::write(path, json).map_err(|err| AppError::SummaryWrite {
                    path: path.into(),
                    source: err,
                })?;
                info!("Summary written to {}", path);
            } else {
                println!("{}", json);
            }
        }
    }
    Ok(())
}
