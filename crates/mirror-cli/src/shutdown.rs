//! Signal handling: SIGTERM/SIGINT cancel the root token.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Spawn a task that cancels `cancel` on SIGTERM or SIGINT (Ctrl+C on
/// platforms without Unix signals).
pub fn install_signal_handlers(cancel: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
            let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("received SIGINT, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        }

        cancel.cancel();
    });
}
