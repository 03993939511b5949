//! Stopping the listener: Ctrl-C cancels a shared token, axum stops
//! accepting, and in-flight requests get a grace period to finish.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Grace period for in-flight requests when none is given.
const DEFAULT_GRACE: Duration = Duration::from_secs(30);

/// Owns the token the listener watches.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// New coordinator with an uncancelled token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Token for a task that should stop on shutdown.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether shutdown was requested.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Block until Ctrl-C, then request shutdown.
    ///
    /// If the signal handler cannot be installed, shutdown is requested
    /// immediately rather than running unstoppable.
    pub async fn wait_for_ctrl_c(&self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("ctrl-c received, shutting down"),
            Err(e) => warn!(error = %e, "cannot listen for ctrl-c, shutting down"),
        }
        self.shutdown();
    }

    /// Request shutdown and wait for the listener task to finish serving.
    ///
    /// Returns `false` when the grace period ran out first.
    pub async fn drain(&self, listener: JoinHandle<()>, grace: Option<Duration>) -> bool {
        let grace = grace.unwrap_or(DEFAULT_GRACE);
        self.shutdown();
        info!(grace_secs = grace.as_secs(), "draining in-flight requests");

        match tokio::time::timeout(grace, listener).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "listener task failed during shutdown");
                true
            }
            Err(_) => {
                warn!(?grace, "grace period elapsed, dropping remaining requests");
                false
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
