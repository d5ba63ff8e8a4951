//! Periodic deactivation of expired links.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::application::services::LinkService;

/// Spawns the sweeper, or returns `None` when `interval_secs` is `0`.
///
/// The first sweep runs immediately, then once per interval. A failed sweep
/// is logged and the next tick tries again.
pub fn spawn_expiry_sweeper(
    link_service: Arc<LinkService>,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        info!("Expiry sweeper disabled");
        return None;
    }

    info!(interval_secs, "Expiry sweeper started");

    Some(tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match link_service.deactivate_expired().await {
                Ok(count) => debug!(count, "Expiry sweep finished"),
                Err(e) => warn!(error = %e, "Expiry sweep failed"),
            }
        }
    }))
}
