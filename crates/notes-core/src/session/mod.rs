//! Delegated session authorization.
//!
//! A session lets a device-local hot wallet act on the user's behalf for a
//! bounded time, so routine ledger writes don't prompt the primary wallet.
//!
//! ```text
//! Unauthorized ──authorize──▶ Authorizing ──ok──▶ Active ──▶ Expiring ──▶ Expired
//!       ▲                          │                 │                        │
//!       └────────── error ─────────┘                 └──revoke──▶ Revoked ◀───┘
//! ```
//!
//! The on-chain `SessionCap` is owned by the hot wallet and carries its own
//! expiry; the encrypted hot-wallet record on this device expires with it.

mod ledger;
mod manager;
mod monitor;
mod retry;
mod wallet;

use std::time::Duration;

pub use ledger::{
    LedgerClient, LedgerObject, LedgerTransaction, SessionCapability, TransactionReceipt,
};
pub use manager::{AuthorizedSession, SessionManager, SessionState};
pub use monitor::{ExpirationObserver, ExpirationStatus, MIN_MONITOR_INTERVAL};
pub use retry::{poll_until, PollPolicy};
pub use wallet::WalletSigner;

/// How long a newly created capability lives.
pub const SESSION_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Native gas sent to the hot wallet with a new capability.
pub const HOT_WALLET_GAS_FUNDING: u64 = 50_000_000;

/// Funding token sent to the hot wallet with a new capability.
pub const HOT_WALLET_TOKEN_FUNDING: u64 = 250_000_000;

/// Module and struct name of the capability within the package.
pub const CAPABILITY_STRUCT: &str = "session::SessionCap";

/// Session settings supplied by the embedding application.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Package that defines the capability type.
    pub package_id: String,
    /// Coin type the hot wallet is funded with.
    pub funding_coin_type: String,
    /// Where to get funding tokens when the wallet has none.
    pub faucet_url: String,
    pub poll: PollPolicy,
    pub monitor_interval: Duration,
    /// Sessions closer than this to expiry are reported as expiring.
    pub warning_threshold: Duration,
}

impl SessionConfig {
    pub fn new(
        package_id: impl Into<String>,
        funding_coin_type: impl Into<String>,
        faucet_url: impl Into<String>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            funding_coin_type: funding_coin_type.into(),
            faucet_url: faucet_url.into(),
            poll: PollPolicy::default(),
            monitor_interval: Duration::from_secs(60),
            warning_threshold: Duration::from_secs(10 * 60),
        }
    }

    /// Fully qualified capability struct type.
    pub fn capability_type(&self) -> String {
        format!("{}::{}", self.package_id, CAPABILITY_STRUCT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_type() {
        let config = SessionConfig::new("0xabc", "0x2::wal::WAL", "https://faucet.test");
        assert_eq!(config.capability_type(), "0xabc::session::SessionCap");
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new("0xabc", "coin", "faucet");
        assert_eq!(config.poll, PollPolicy::default());
        assert_eq!(config.monitor_interval, Duration::from_secs(60));
        assert_eq!(config.warning_threshold, Duration::from_secs(600));
        assert_eq!(SESSION_DURATION.as_secs(), 86_400);
    }
}
