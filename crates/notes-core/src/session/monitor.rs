//! Periodic session expiration checks.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::manager::SessionManager;

/// Receives expiration events. Presentation is up to the implementor.
pub trait ExpirationObserver: Send + Sync {
    /// The active session ends in `remaining`.
    fn session_expiring(&self, hot_wallet_address: &str, remaining: Duration);

    /// The session expired and was revoked locally.
    fn session_expired(&self, _hot_wallet_address: &str) {}
}

/// Outcome of a single expiration check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationStatus {
    /// No active session.
    Inactive,
    Healthy { remaining: Duration },
    Expiring { remaining: Duration },
    /// The session had expired and has been revoked.
    Expired,
}

/// Shortest period the monitor ticks at. Shorter configured intervals,
/// zero included, are raised to this.
pub const MIN_MONITOR_INTERVAL: Duration = Duration::from_millis(10);

/// Run `check_expiration` every `monitor_interval` until the manager is dropped.
pub(crate) fn spawn(manager: &Arc<SessionManager>) -> JoinHandle<()> {
    let weak: Weak<SessionManager> = Arc::downgrade(manager);
    let period = manager.config().monitor_interval.max(MIN_MONITOR_INTERVAL);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let Some(manager) = weak.upgrade() else {
                tracing::debug!("session manager dropped, stopping expiration monitor");
                break;
            };
            if let Err(err) = manager.check_expiration() {
                tracing::warn!("expiration check failed: {}", err);
            }
        }
    })
}
