//! Post-run pass/fail judgement against configured thresholds.
use std::time::Duration;

use serde::Serialize;

use crate::args::{PercentX100, TesterArgs};
use crate::error::CriteriaError;
use crate::metrics::AggregateResults;


const PERCENT_SCALE: u128 = PercentX100::MAX as u128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessCriteria {
    pub min_success_rate: PercentX100,
    pub max_avg_latency: Duration,
    pub max_error_rate: PercentX100,
}

impl SuccessCriteria {
    #[must_use]
    pub const fn from_args(args: &TesterArgs) -> Self {
        Self {
            min_success_rate: args.min_success_rate,
            max_avg_latency: args.max_avg_latency,
            max_error_rate: args.max_error_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    SuccessRate,
    AverageLatency,
    ErrorRate,
}

impl Criterion {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Criterion::SuccessRate => "Success rate",
            Criterion::AverageLatency => "Average latency",
            Criterion::ErrorRate => "Error rate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionCheck {
    pub criterion: Criterion,
    pub passed: bool,
    pub actual: String,
    pub threshold: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Hundredths of a percent, rounded down (`9700` is 97.00%).
    pub success_rate_x100: u64,
    pub error_rate_x100: u64,
    pub avg_latency: Duration,
    pub max_latency: Duration,
    pub checks: Vec<CriterionCheck>,
    pub overall_pass: bool,
}

fn rate_x100(part: u64, total: u64) -> u64 {
    u128::from(part)
        .saturating_mul(PERCENT_SCALE)
        .checked_div(u128::from(total))
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(0)
}

fn format_rate(rate_x100: u64) -> String {
    format!("{}.{:02}%", rate_x100 / 100, rate_x100 % 100)
}

/// Judges a finished run. Each threshold is compared exactly by
/// cross-multiplying, so displayed rounding never flips a result.
///
/// # Errors
///
/// Returns [`CriteriaError::NoData`] when no request was recorded.
pub fn evaluate(
    results: &AggregateResults,
    criteria: &SuccessCriteria,
) -> Result<Verdict, CriteriaError> {
    let total = results.total;
    if total == 0 {
        return Err(CriteriaError::NoData);
    }
    let total_wide = u128::from(total);
    let samples = u128::try_from(results.latencies.len()).unwrap_or(u128::MAX);

    let success_ok = u128::from(results.success).saturating_mul(PERCENT_SCALE)
        >= u128::from(criteria.min_success_rate.get()).saturating_mul(total_wide);
    let error_ok = u128::from(results.failure).saturating_mul(PERCENT_SCALE)
        <= u128::from(criteria.max_error_rate.get()).saturating_mul(total_wide);
    let latency_ok =
        results.latency_sum() <= criteria.max_avg_latency.as_nanos().saturating_mul(samples);

    let success_rate_x100 = rate_x100(results.success, total);
    let error_rate_x100 = rate_x100(results.failure, total);
    let avg_latency = results.average_latency().unwrap_or_default();
    let max_latency = results.max_latency().unwrap_or_default();

    let checks = vec![
        CriterionCheck {
            criterion: Criterion::SuccessRate,
            passed: success_ok,
            actual: format_rate(success_rate_x100),
            threshold: format!(">= {}", criteria.min_success_rate),
        },
        CriterionCheck {
            criterion: Criterion::AverageLatency,
            passed: latency_ok,
            actual: format!("{}ms", avg_latency.as_millis()),
            threshold: format!("<= {}ms", criteria.max_avg_latency.as_millis()),
        },
        CriterionCheck {
            criterion: Criterion::ErrorRate,
            passed: error_ok,
            actual: format_rate(error_rate_x100),
            threshold: format!("<= {}", criteria.max_error_rate),
        },
    ];
    let overall_pass = checks.iter().all(|check| check.passed);

    Ok(Verdict {
        success_rate_x100,
        error_rate_x100,
        avg_latency,
        max_latency,
        checks,
        overall_pass,
    })
}
