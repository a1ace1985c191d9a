use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::args::HttpMethod;

use super::{OutcomeDetail, RequestOutcome};

fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}

/// One failed request as reported in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub method: HttpMethod,
    pub path: String,
    pub expected: u16,
    pub actual: Option<u16>,
    pub error: Option<String>,
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
}

impl ErrorRecord {
    fn from_outcome(outcome: RequestOutcome) -> Self {
        let (actual, error) = match outcome.detail {
            OutcomeDetail::Status(code) => (Some(code), None),
            OutcomeDetail::Transport { message, .. } => (None, Some(message)),
        };
        Self {
            method: outcome.endpoint.method,
            path: outcome.endpoint.path.clone(),
            expected: outcome.endpoint.expected_status,
            actual,
            error,
            latency: outcome.latency,
        }
    }
}

/// Counters and append-only logs for a run.
///
/// `total == success + failure` and `latencies.len() == total` hold for every
/// value handed out by [`ResultAggregator::snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResults {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub timeouts: u64,
    pub transport_errors: u64,
    pub unexpected_status: u64,
    /// Extra attempts spent on retries across all requests.
    pub retries: u64,
    pub latencies: Vec<Duration>,
    pub errors: Vec<ErrorRecord>,
}

impl AggregateResults {
    #[must_use]
    pub fn latency_sum(&self) -> u128 {
        self.latencies
            .iter()
            .fold(0u128, |acc, latency| acc.saturating_add(latency.as_nanos()))
    }

    /// Mean latency, or `None` when nothing was recorded.
    #[must_use]
    pub fn average_latency(&self) -> Option<Duration> {
        let count = u128::try_from(self.latencies.len()).ok()?;
        let mean = self.latency_sum().checked_div(count)?;
        Some(Duration::from_nanos(
            u64::try_from(mean).unwrap_or(u64::MAX),
        ))
    }

    #[must_use]
    pub fn max_latency(&self) -> Option<Duration> {
        self.latencies.iter().max().copied()
    }

    #[must_use]
    pub fn min_latency(&self) -> Option<Duration> {
        self.latencies.iter().min().copied()
    }

    fn apply(&mut self, outcome: RequestOutcome) {
        self.total = self.total.saturating_add(1);
        self.retries = self
            .retries
            .saturating_add(u64::from(outcome.attempts.saturating_sub(1)));
        self.latencies.push(outcome.latency);

        if outcome.succeeded() {
            self.success = self.success.saturating_add(1);
            return;
        }

        self.failure = self.failure.saturating_add(1);
        match &outcome.detail {
            OutcomeDetail::Status(_) => {
                self.unexpected_status = self.unexpected_status.saturating_add(1);
            }
            OutcomeDetail::Transport { timed_out: true, .. } => {
                self.timeouts = self.timeouts.saturating_add(1);
            }
            OutcomeDetail::Transport {
                timed_out: false, ..
            } => {
                self.transport_errors = self.transport_errors.saturating_add(1);
            }
        }
        self.errors.push(ErrorRecord::from_outcome(outcome));
    }
}

/// Thread-safe accumulator shared by every request task of one run.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<AggregateResults>,
}

impl ResultAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AggregateResults> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds one outcome into the totals under a single lock acquisition.
    pub fn record(&self, outcome: RequestOutcome) {
        if outcome.succeeded() {
            debug!(
                "{} {} -> {:?} ({}ms)",
                outcome.endpoint.method,
                outcome.endpoint.path,
                outcome.status(),
                outcome.latency.as_millis()
            );
        } else {
            match &outcome.detail {
                OutcomeDetail::Status(code) => warn!(
                    "{} {} expected {}, got {} ({}ms)",
                    outcome.endpoint.method,
                    outcome.endpoint.path,
                    outcome.endpoint.expected_status,
                    code,
                    outcome.latency.as_millis()
                ),
                OutcomeDetail::Transport { message, .. } => warn!(
                    "{} {} failed after {} attempt(s): {}",
                    outcome.endpoint.method, outcome.endpoint.path, outcome.attempts, message
                ),
            }
        }
        self.lock().apply(outcome);
    }

    /// A consistent copy of the current totals.
    #[must_use]
    pub fn snapshot(&self) -> AggregateResults {
        self.lock().clone()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.lock().total
    }
}
