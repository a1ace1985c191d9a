use std::time::Duration;

use crate::args::{ShutdownPolicy, TesterArgs};
use crate::http::RetryPolicy;

/// Immutable parameters of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub concurrency: usize,
    pub target_rate: u64,
    pub duration: Duration,
    pub retry: RetryPolicy,
    pub max_pending: usize,
    pub shutdown_policy: ShutdownPolicy,
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Backlog bound used when none is configured: two seconds of traffic,
    /// never below the concurrency.
    #[must_use]
    pub fn default_max_pending(target_rate: u64, concurrency: usize) -> usize {
        let two_batches = usize::try_from(target_rate.saturating_mul(2)).unwrap_or(usize::MAX);
        two_batches.max(concurrency)
    }

    #[must_use]
    pub fn from_args(args: &TesterArgs) -> Self {
        let concurrency = args.concurrency.get();
        let target_rate = args.rate.get();
        let max_pending = args.max_pending.map_or_else(
            || Self::default_max_pending(target_rate, concurrency),
            |value| value.get(),
        );
        Self {
            concurrency,
            target_rate,
            duration: args.duration,
            retry: RetryPolicy {
                max_retries: args.max_retries,
                retry_delay: args.retry_delay,
            },
            max_pending,
            shutdown_policy: args.shutdown_policy,
            seed: args.seed,
        }
    }
}
