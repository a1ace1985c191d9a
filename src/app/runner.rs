use std::sync::Arc;

use reqwest::Client;
use sysinfo::System;
use tracing::info;
use url::Url;

use crate::args::TesterArgs;
use crate::criteria::{SuccessCriteria, evaluate};
use crate::error::AppResult;
use crate::http::{HttpExecutor, RequestExecutor, payload_generator};
use crate::metrics::ResultAggregator;
use crate::scheduler::{PacedScheduler, RunConfig};
use crate::shutdown::ShutdownReceiver;
use crate::system::resources::log_snapshot;

use super::summary::{StressSummary, stress_summary};

/// Runs the paced stress phase and judges the aggregate against the
/// configured criteria.
///
/// # Errors
///
/// Returns an error when the scheduler cannot be built.
pub(crate) async fn run_stress(
    args: &TesterArgs,
    client: Client,
    base_url: Url,
    shutdown_rx: ShutdownReceiver,
) -> AppResult<StressSummary> {
    let config = RunConfig::from_args(args);
    info!(
        "Starting stress test against {}: {} endpoints, {} rps, concurrency {}, duration {:?}",
        base_url,
        args.endpoints.len(),
        config.target_rate,
        config.concurrency,
        config.duration
    );

    let mut system = System::new();
    log_snapshot("before test", &mut system);

    let payloads = payload_generator(&args.payload_templates, config.seed);
    let executor: Arc<dyn RequestExecutor> =
        Arc::new(HttpExecutor::new(client, base_url, payloads, config.retry));
    let aggregator = Arc::new(ResultAggregator::new());
    let scheduler = PacedScheduler::new(
        config,
        args.endpoints.clone(),
        executor,
        Arc::clone(&aggregator),
    )?;

    let report = scheduler.run(shutdown_rx).await;
    log_snapshot("after test", &mut system);

    let results = aggregator.snapshot();
    info!(
        "Stress test finished: {} requests ({} ok, {} failed) in {:?}",
        results.total, results.success, results.failure, report.elapsed
    );
    let verdict = evaluate(&results, &SuccessCriteria::from_args(args));
    Ok(stress_summary(
        &config,
        &report,
        &results,
        &verdict,
        args.error_limit,
    ))
}
