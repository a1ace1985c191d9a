use std::sync::{Arc, atomic::AtomicUsize};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::sync::Semaphore;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

use crate::args::{EndpointSpec, ShutdownPolicy};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::RequestExecutor;
use crate::metrics::ResultAggregator;
use crate::shutdown::ShutdownReceiver;

use super::RunConfig;
use super::pending::PendingGuard;

const BATCH_INTERVAL: Duration = Duration::from_secs(1);

/// What the scheduler did, as opposed to what the requests returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub batches: u64,
    pub submitted: u64,
    /// Submissions dropped because the pending backlog was full.
    pub skipped: u64,
    /// In-flight requests aborted by an external shutdown.
    pub abandoned: u64,
    /// True when the run ended on Ctrl+C/SIGTERM rather than expiry.
    pub cancelled: bool,
    pub elapsed: Duration,
}

pub struct PacedScheduler {
    config: RunConfig,
    endpoints: Vec<Arc<EndpointSpec>>,
    executor: Arc<dyn RequestExecutor>,
    aggregator: Arc<ResultAggregator>,
}

/// Resolves on a shutdown signal; a closed channel never resolves.
async fn shutdown_signalled(shutdown_rx: &mut ShutdownReceiver) {
    match shutdown_rx.recv().await {
        Ok(()) | Err(RecvError::Lagged(_)) => {}
        Err(RecvError::Closed) => std::future::pending::<()>().await,
    }
}

/// True when a shutdown was broadcast before this check, including one sent
/// before the run started.
fn shutdown_requested(shutdown_rx: &mut ShutdownReceiver) -> bool {
    matches!(
        shutdown_rx.try_recv(),
        Ok(()) | Err(TryRecvError::Lagged(_))
    )
}

impl PacedScheduler {
    /// # Errors
    ///
    /// Returns an error when no endpoints are given.
    pub fn new(
        config: RunConfig,
        endpoints: Vec<EndpointSpec>,
        executor: Arc<dyn RequestExecutor>,
        aggregator: Arc<ResultAggregator>,
    ) -> AppResult<Self> {
        if endpoints.is_empty() {
            return Err(AppError::validation(ValidationError::NoEndpoints));
        }
        Ok(Self {
            config,
            endpoints: endpoints.into_iter().map(Arc::new).collect(),
            executor,
            aggregator,
        })
    }

    #[must_use]
    pub fn aggregator(&self) -> Arc<ResultAggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Submits `target_rate` requests per one-second batch until the
    /// duration elapses or a shutdown signal arrives, then settles the
    /// in-flight work according to the shutdown policy.
    pub async fn run(&self, mut shutdown_rx: ShutdownReceiver) -> SchedulerReport {
        let started = Instant::now();
        let mut report = SchedulerReport::default();

        if self.config.target_rate == 0 || self.config.duration.is_zero() {
            info!("Nothing to schedule (rate or duration is zero).");
            return report;
        }
        let Some(end) = started.checked_add(self.config.duration) else {
            warn!("Run duration overflows the clock; nothing scheduled.");
            return report;
        };

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let pending = Arc::new(AtomicUsize::new(0));
        let mut rng = self
            .config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut tasks: JoinSet<()> = JoinSet::new();

        while Instant::now() < end {
            if shutdown_requested(&mut shutdown_rx) {
                report.cancelled = true;
                break;
            }
            let batch_start = Instant::now();
            report.batches = report.batches.saturating_add(1);
            let skipped_before = report.skipped;

            for _ in 0..self.config.target_rate {
                let Some(guard) = PendingGuard::try_acquire(&pending, self.config.max_pending)
                else {
                    report.skipped = report.skipped.saturating_add(1);
                    continue;
                };
                let Some(endpoint) = self.endpoints.choose(&mut rng).cloned() else {
                    break;
                };
                let semaphore = Arc::clone(&semaphore);
                let executor = Arc::clone(&self.executor);
                let aggregator = Arc::clone(&self.aggregator);
                tasks.spawn(async move {
                    let _pending = guard;
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };
                    let outcome = executor.execute(endpoint).await;
                    aggregator.record(outcome);
                });
                report.submitted = report.submitted.saturating_add(1);
            }

            let skipped_now = report.skipped.saturating_sub(skipped_before);
            if skipped_now > 0 {
                warn!(
                    "Backlog full ({} pending); skipped {} submissions in batch {}",
                    self.config.max_pending, skipped_now, report.batches
                );
            }
            while let Some(result) = tasks.try_join_next() {
                log_join_result(&result);
            }
            debug!(
                "Batch {} submitted; {} tasks outstanding",
                report.batches,
                tasks.len()
            );

            let next = batch_start
                .checked_add(BATCH_INTERVAL)
                .map_or(end, |next| next.min(end));
            tokio::select! {
                biased;
                () = shutdown_signalled(&mut shutdown_rx) => {
                    report.cancelled = true;
                    break;
                }
                () = sleep_until(next) => {}
            }
        }

        if report.cancelled {
            info!("Shutdown requested; stopping submission.");
        }
        report.abandoned = self
            .settle(&mut tasks, &mut shutdown_rx, report.cancelled)
            .await;
        report.elapsed = started.elapsed();
        report
    }

    /// Awaits or aborts outstanding tasks; returns how many were aborted.
    async fn settle(
        &self,
        tasks: &mut JoinSet<()>,
        shutdown_rx: &mut ShutdownReceiver,
        cancelled: bool,
    ) -> u64 {
        let abandon = self.config.shutdown_policy == ShutdownPolicy::Abandon;
        if cancelled && abandon {
            if !tasks.is_empty() {
                warn!("Abandoning {} in-flight requests.", tasks.len());
            }
            tasks.abort_all();
        } else if !tasks.is_empty() {
            info!("Waiting for {} in-flight requests.", tasks.len());
        }

        let mut abandoned: u64 = 0;
        let mut aborted = cancelled && abandon;
        loop {
            let next = if aborted {
                tasks.join_next().await
            } else {
                tokio::select! {
                    biased;
                    () = shutdown_signalled(shutdown_rx), if abandon => {
                        warn!("Shutdown requested while draining; abandoning {} requests.", tasks.len());
                        tasks.abort_all();
                        aborted = true;
                        continue;
                    }
                    next = tasks.join_next() => next,
                }
            };
            let Some(result) = next else {
                break;
            };
            if matches!(&result, Err(err) if err.is_cancelled()) {
                abandoned = abandoned.saturating_add(1);
            } else {
                log_join_result(&result);
            }
        }
        abandoned
    }
}

fn log_join_result(result: &Result<(), JoinError>) {
    if let Err(err) = result {
        error!("Request task failed: {}", err);
    }
}
