mod runner;
pub(crate) mod summary;

use std::process::ExitCode;

use tracing::{info, warn};
use url::Url;

use crate::args::{Command, TesterArgs};
use crate::cleanup::{CleanupReport, CleanupRunner};
use crate::error::AppResult;
use crate::http::{AuthConfig, build_client};
use crate::shutdown::ShutdownReceiver;

use summary::{RunSummary, emit_summary};

/// Runs the requested phases, emits the summary, and maps the verdict to a
/// process exit code.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built, the scheduler
/// rejects its inputs, or the summary cannot be written.
pub(crate) async fn run_app(
    args: &TesterArgs,
    base_url: Url,
    shutdown_rx: ShutdownReceiver,
) -> AppResult<ExitCode> {
    let auth = AuthConfig::from_args(args)?;
    info!("Authentication mode: {}", auth.mode().as_str());
    let client = build_client(args, &auth)?;

    let cleanup_only = matches!(args.command, Some(Command::Cleanup));
    let stress = if cleanup_only || args.no_stress_test {
        info!("Stress test phase skipped.");
        None
    } else {
        Some(runner::run_stress(args, client.clone(), base_url.clone(), shutdown_rx).await?)
    };

    let cancelled = stress
        .as_ref()
        .is_some_and(|summary| summary.scheduler.cancelled);
    let wants_cleanup = cleanup_only || args.cleanup;
    if wants_cleanup && cancelled {
        warn!("Stress test was cancelled; skipping cleanup.");
    }
    let cleanup = if wants_cleanup && !cancelled {
        Some(run_cleanup(args, client, base_url.clone()).await)
    } else {
        None
    };

    let summary = RunSummary {
        base_url: base_url.to_string(),
        stress,
        cleanup,
    };
    emit_summary(&summary, args.output_format, args.output.as_deref())?;
    Ok(summary.exit_code())
}

async fn run_cleanup(args: &TesterArgs, client: reqwest::Client, base_url: Url) -> CleanupReport {
    info!("Cleaning up test data...");
    let report = CleanupRunner::new(client, base_url)
        .run(&args.endpoints)
        .await;
    info!("Cleanup complete: {} records deleted", report.deleted);
    report
}
