use burrow_core::Shortener;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Spawns a task that purges expired aliases every `interval`.
///
/// Reads already hide expired records; the sweeper only reclaims space for
/// aliases nobody visits after their deadline. Failures are logged and the
/// next tick tries again. Abort the returned handle to stop it.
pub fn spawn_sweeper(shortener: Arc<dyn Shortener>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match shortener.purge_expired().await {
                Ok(0) => debug!("No expired aliases to purge"),
                Ok(removed) => info!(removed, "Purged expired aliases"),
                Err(e) => warn!(error = %e, "Failed to purge expired aliases"),
            }
        }
    })
}
