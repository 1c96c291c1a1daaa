//! Device fingerprinting.
//!
//! The fingerprint scopes hot-wallet derivation and storage to one device
//! profile. It is SHA-256 over stable device characteristics plus a random
//! install id, so two profiles on identical hardware still differ.

use std::sync::{Arc, Mutex, OnceLock};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{NotesError, Result};
use crate::hot_wallet::record_key;
use crate::storage::KeyValueStore;

/// Storage key for the cached fingerprint.
pub const FINGERPRINT_KEY: &str = "device:fingerprint";

/// Storage key for the persisted random component.
pub const INSTALL_ID_KEY: &str = "device:install-id";

/// Version tag mixed into the fingerprint hash.
const FINGERPRINT_VERSION: &str = "notes-device-v2";

/// Fingerprint length in hex characters.
pub const FINGERPRINT_HEX_LENGTH: usize = 64;

/// A 256-bit device identifier as 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    /// Parse a fingerprint, rejecting anything but 64 lowercase hex characters.
    pub fn parse(value: &str) -> Result<Self> {
        if !is_current_format(value) {
            return Err(NotesError::InvalidInput(format!(
                "device fingerprint must be {} lowercase hex characters",
                FINGERPRINT_HEX_LENGTH
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable characteristics of the current device profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub os: String,
    pub arch: String,
    pub hostname: String,
    pub user: String,
    pub locale: String,
}

impl DeviceProfile {
    /// Read the characteristics of the running device.
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: first_env(&["HOSTNAME", "COMPUTERNAME"])
                .or_else(|| {
                    std::fs::read_to_string("/etc/hostname")
                        .ok()
                        .map(|value| value.trim().to_string())
                        .filter(|value| !value.is_empty())
                })
                .unwrap_or_else(|| "unknown".to_string()),
            user: first_env(&["USER", "USERNAME"]).unwrap_or_else(|| "unknown".to_string()),
            locale: first_env(&["LC_ALL", "LANG"]).unwrap_or_else(|| "C".to_string()),
        }
    }

    fn canonical(&self) -> String {
        [
            self.os.as_str(),
            self.arch.as_str(),
            self.hostname.as_str(),
            self.user.as_str(),
            self.locale.as_str(),
        ]
        .join("|")
    }
}

/// Derives and caches the device fingerprint.
pub struct FingerprintService {
    store: Arc<dyn KeyValueStore>,
    profile: DeviceProfile,
    cached: Mutex<Option<DeviceFingerprint>>,
    session_component: OnceLock<String>,
}

impl FingerprintService {
    pub fn new(store: Arc<dyn KeyValueStore>, profile: DeviceProfile) -> Self {
        Self {
            store,
            profile,
            cached: Mutex::new(None),
            session_component: OnceLock::new(),
        }
    }

    /// Return this device's fingerprint, generating it on first use.
    ///
    /// Never fails: if local storage is unusable the fingerprint is built from
    /// a session-scoped random component and will not survive a restart.
    pub fn derive(&self) -> DeviceFingerprint {
        if let Ok(cached) = self.cached.lock() {
            if let Some(fingerprint) = cached.as_ref() {
                return fingerprint.clone();
            }
        }

        let fingerprint = match self.store.get(FINGERPRINT_KEY) {
            Ok(Some(stored)) if is_current_format(&stored) => DeviceFingerprint(stored),
            Ok(Some(stale)) => {
                self.migrate_stale(&stale);
                self.generate_persistent()
            }
            Ok(None) => self.generate_persistent(),
            Err(err) => {
                tracing::warn!("device storage unavailable, using session fingerprint: {}", err);
                self.generate_session_scoped()
            }
        };

        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some(fingerprint.clone());
        }
        fingerprint
    }

    /// Drop the in-memory cache so the next `derive` consults storage again.
    pub fn reset_cache(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }

    fn migrate_stale(&self, stale: &str) {
        tracing::info!("migrating stale device fingerprint format");
        if let Err(err) = self.store.remove(&record_key(stale)) {
            tracing::warn!("failed to clear hot wallet under stale fingerprint: {}", err);
        }
        if let Err(err) = self.store.remove(FINGERPRINT_KEY) {
            tracing::warn!("failed to remove stale fingerprint: {}", err);
        }
    }

    fn generate_persistent(&self) -> DeviceFingerprint {
        let install_id = match self.load_or_create_install_id() {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("device storage unavailable, using session fingerprint: {}", err);
                return self.generate_session_scoped();
            }
        };

        let fingerprint = self.compute(&install_id);
        if let Err(err) = self.store.set(FINGERPRINT_KEY, fingerprint.as_str()) {
            tracing::warn!("failed to persist device fingerprint: {}", err);
        }
        tracing::debug!(fingerprint = %fingerprint, "generated device fingerprint");
        fingerprint
    }

    fn generate_session_scoped(&self) -> DeviceFingerprint {
        let component = self
            .session_component
            .get_or_init(|| Uuid::new_v4().to_string());
        self.compute(component)
    }

    fn load_or_create_install_id(&self) -> Result<String> {
        if let Some(existing) = self.store.get(INSTALL_ID_KEY)? {
            if !existing.trim().is_empty() {
                return Ok(existing);
            }
        }
        let install_id = Uuid::new_v4().to_string();
        self.store.set(INSTALL_ID_KEY, &install_id)?;
        Ok(install_id)
    }

    fn compute(&self, random_component: &str) -> DeviceFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(FINGERPRINT_VERSION.as_bytes());
        hasher.update(b"|");
        hasher.update(self.profile.canonical().as_bytes());
        hasher.update(b"|");
        hasher.update(random_component.as_bytes());
        DeviceFingerprint(hex::encode(hasher.finalize()))
    }
}

fn is_current_format(value: &str) -> bool {
    value.len() == FINGERPRINT_HEX_LENGTH
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(NotesError::Storage("storage disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(NotesError::Storage("storage disabled".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(NotesError::Storage("storage disabled".to_string()))
        }
    }

    fn profile() -> DeviceProfile {
        DeviceProfile {
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            hostname: "notebook".to_string(),
            user: "alice".to_string(),
            locale: "en_US.UTF-8".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_format() {
        let service = FingerprintService::new(Arc::new(MemoryStore::new()), profile());
        let fingerprint = service.derive();
        assert!(is_current_format(fingerprint.as_str()));
        assert!(DeviceFingerprint::parse(fingerprint.as_str()).is_ok());
    }

    #[test]
    fn test_fingerprint_stable_across_instances() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = FingerprintService::new(store.clone(), profile()).derive();
        let second = FingerprintService::new(store.clone(), profile()).derive();
        assert_eq!(first, second);
        assert_eq!(
            store.get(FINGERPRINT_KEY).unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[test]
    fn test_regenerated_from_install_id_is_stable() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = FingerprintService::new(store.clone(), profile()).derive();

        store.remove(FINGERPRINT_KEY).unwrap();
        let second = FingerprintService::new(store.clone(), profile()).derive();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_install_ids_differ() {
        let a = FingerprintService::new(Arc::new(MemoryStore::new()), profile()).derive();
        let b = FingerprintService::new(Arc::new(MemoryStore::new()), profile()).derive();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stale_fingerprint_migrated() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let stale = "legacy-fp-1234";
        store.set(FINGERPRINT_KEY, stale).unwrap();
        store.set(&record_key(stale), "{\"version\":\"v0\"}").unwrap();

        let fingerprint = FingerprintService::new(store.clone(), profile()).derive();

        assert_ne!(fingerprint.as_str(), stale);
        assert!(is_current_format(fingerprint.as_str()));
        assert_eq!(store.get(&record_key(stale)).unwrap(), None);
        assert_eq!(
            store.get(FINGERPRINT_KEY).unwrap().as_deref(),
            Some(fingerprint.as_str())
        );
    }

    #[test]
    fn test_uppercase_fingerprint_is_stale() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let upper = "A".repeat(64);
        store.set(FINGERPRINT_KEY, &upper).unwrap();

        let fingerprint = FingerprintService::new(store, profile()).derive();
        assert_ne!(fingerprint.as_str(), upper);
    }

    #[test]
    fn test_broken_storage_falls_back_to_session_fingerprint() {
        let service = FingerprintService::new(Arc::new(BrokenStore), profile());
        let first = service.derive();
        assert!(is_current_format(first.as_str()));

        service.reset_cache();
        let second = service.derive();
        assert_eq!(first, second, "session component is stable for the process");

        let other = FingerprintService::new(Arc::new(BrokenStore), profile()).derive();
        assert_ne!(first, other, "session component does not persist");
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(DeviceFingerprint::parse(&"a".repeat(64)).is_ok());
        assert!(DeviceFingerprint::parse(&"a".repeat(63)).is_err());
        assert!(DeviceFingerprint::parse(&"g".repeat(64)).is_err());
        assert!(DeviceFingerprint::parse(&"A".repeat(64)).is_err());
    }
}
