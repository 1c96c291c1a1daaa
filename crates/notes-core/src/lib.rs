//! # Notes Core
//!
//! Core library for an encrypted note-taking client whose notes live on a
//! ledger (metadata) and a blob store (content).
//!
//! This crate owns everything secret on the device and nothing about how it
//! is displayed.
//!
//! ## Architecture
//!
//! - **address**: wallet address validation
//! - **crypto**: key derivation, envelope encryption, hot wallet keypair
//! - **storage**: local persistent key-value storage
//! - **fingerprint**: device fingerprint derivation and migration
//! - **hot_wallet**: encrypted persistence of the hot wallet
//! - **session**: delegated-capability session authorization
//! - **notes**: note content and field encryption over a blob store

pub mod address;
pub mod crypto;
pub mod error;
pub mod fingerprint;
pub mod hot_wallet;
pub mod notes;
pub mod session;
pub mod storage;
pub mod time;

pub use error::{NotesError, Result};
pub use fingerprint::{DeviceFingerprint, DeviceProfile, FingerprintService};
pub use hot_wallet::{HotWalletInfo, HotWalletStore};
pub use session::{AuthorizedSession, SessionConfig, SessionManager, SessionState};
pub use storage::KeyValueStore;

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
