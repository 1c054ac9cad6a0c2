//! Signal handling for graceful shutdown.
//!
//! Both node roles stop on SIGINT (Ctrl+C) or SIGTERM.

use tokio::sync::watch;
use tracing::warn;

/// Creates a shutdown signal receiver that triggers on SIGINT or SIGTERM.
///
/// Returns a `watch::Receiver<bool>` that changes to `true` when a shutdown
/// signal is received. The receiver can be cloned and shared across tasks.
///
/// # Example
///
/// ```no_run
/// use sedge_node::signals::shutdown_signal;
///
/// #[tokio::main]
/// async fn main() {
///     let mut shutdown = shutdown_signal();
///     let _ = shutdown.wait_for(|stop| *stop).await;
///     println!("Shutdown signal received");
/// }
/// ```
pub fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = tx.send(true);
    });

    rx
}

/// Wait for either SIGINT or SIGTERM.
///
/// A handler that cannot be installed never fires.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_signal_initial_state() {
        let rx = shutdown_signal();
        // Initial state should be false (not shutting down)
        assert!(!*rx.borrow());
    }
}
