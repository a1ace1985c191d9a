use tokio::task::JoinHandle;
use tracing::warn;

use crate::shutdown::ShutdownSender;

/// Resolves with the name of the first termination signal received.
async fn termination_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "Ctrl+C",
                _ = sigterm.recv() => "SIGTERM",
            },
            Err(err) => {
                warn!("SIGTERM handler unavailable ({}); listening for Ctrl+C only.", err);
                drop(tokio::signal::ctrl_c().await);
                "Ctrl+C"
            }
        }
    }

    #[cfg(not(unix))]
    {
        drop(tokio::signal::ctrl_c().await);
        "Ctrl+C"
    }
}

/// Turns Ctrl+C or SIGTERM into a broadcast shutdown. The task ends on its
/// own once any shutdown is broadcast, whoever sent it.
pub(crate) fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_rx.recv() => {}
            name = termination_signal() => {
                warn!("{} received; stopping the run.", name);
                drop(shutdown_tx.send(()));
            }
        }
    })
}
