//! Local persistent storage trait definition.
//!
//! The `KeyValueStore` trait is the only contract the core assumes about the
//! device's local storage. Hot-wallet records and the device fingerprint cache
//! live behind it.

use crate::error::Result;

/// String key-value storage that survives process restarts.
///
/// Implementations must ensure:
/// - `set` is durable once it returns
/// - `remove` is idempotent (absent keys are not an error)
///
/// No locking is assumed across processes: writers race with last-writer-wins
/// semantics, and readers validate what they get back.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value stored under `key`.
    fn remove(&self, key: &str) -> Result<()>;
}
