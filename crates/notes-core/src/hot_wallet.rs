//! Encrypted persistence of the hot wallet.
//!
//! The hot wallet's private seed is sealed under the content key (derived from
//! the same wallet signature that unlocks notes) and stored under a key
//! namespaced by the device fingerprint.
//!
//! Reads fail closed: any record that is the wrong version, belongs to another
//! fingerprint, has expired, does not decrypt, or decrypts to a different
//! address is erased rather than partially trusted. The user re-authorizes.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::address::validate_address;
use crate::crypto::envelope::{decrypt, encrypt, IV_LENGTH};
use crate::crypto::keypair::SEED_LENGTH;
use crate::crypto::{derive_content_key, HotWalletKeypair, WalletSignature};
use crate::error::{NotesError, Result};
use crate::fingerprint::DeviceFingerprint;
use crate::storage::KeyValueStore;
use crate::time::now_millis;

/// Current record format version.
pub const RECORD_VERSION: &str = "v1";

/// Storage key for the hot-wallet record of `fingerprint`.
pub fn record_key(fingerprint: &str) -> String {
    format!("hot-wallet:{}", fingerprint)
}

/// Persisted hot-wallet record (JSON, camelCase field names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedHotWalletRecord {
    pub version: String,
    /// Base64 of ciphertext ‖ tag.
    pub encrypted_private_key: String,
    /// Base64 of the 12-byte IV.
    pub iv: String,
    pub device_fingerprint: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
    pub hot_wallet_address: String,
}

/// Display metadata readable without the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotWalletInfo {
    pub address: String,
    pub expires_at: i64,
}

/// Store for the device's encrypted hot wallet.
pub struct HotWalletStore {
    store: Arc<dyn KeyValueStore>,
}

impl HotWalletStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Seal and persist `keypair` for this device until `expires_at` (epoch ms).
    pub fn store(
        &self,
        keypair: &HotWalletKeypair,
        fingerprint: &DeviceFingerprint,
        expires_at: i64,
        signature: &WalletSignature,
        user_address: &str,
    ) -> Result<()> {
        let key = derive_content_key(signature, user_address)?;
        let secret = keypair.secret_bytes();
        let envelope = encrypt(&secret[..], &key)?;
        let (iv, sealed) = envelope.split_at(IV_LENGTH);

        let record = EncryptedHotWalletRecord {
            version: RECORD_VERSION.to_string(),
            encrypted_private_key: STANDARD.encode(sealed),
            iv: STANDARD.encode(iv),
            device_fingerprint: fingerprint.as_str().to_string(),
            expires_at,
            hot_wallet_address: keypair.address(),
        };

        self.store
            .set(&record_key(fingerprint.as_str()), &serde_json::to_string(&record)?)?;
        tracing::debug!(
            hot_wallet = %record.hot_wallet_address,
            expires_at,
            "stored hot wallet"
        );
        Ok(())
    }

    /// Load and unseal the hot wallet for this device.
    ///
    /// Returns `Ok(None)` when there is no record, and also when a record was
    /// found but rejected (it is erased in that case). `Err` is reserved for
    /// storage backend failures and malformed caller input.
    pub fn retrieve(
        &self,
        fingerprint: &DeviceFingerprint,
        signature: &WalletSignature,
        user_address: &str,
    ) -> Result<Option<HotWalletKeypair>> {
        validate_address(user_address)?;

        let key = record_key(fingerprint.as_str());
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };

        match open_record(&raw, fingerprint, signature, user_address) {
            Ok(keypair) => Ok(Some(keypair)),
            Err(err) => {
                tracing::warn!("erasing stored hot wallet: {}", err);
                self.store.remove(&key)?;
                Ok(None)
            }
        }
    }

    /// Erase the record for this device. Absent records are fine.
    pub fn clear(&self, fingerprint: &DeviceFingerprint) -> Result<()> {
        self.store.remove(&record_key(fingerprint.as_str()))
    }

    /// Cheap liveness probe: version, fingerprint, and expiry only.
    pub fn has_valid(&self, fingerprint: &DeviceFingerprint) -> Result<bool> {
        Ok(self.info(fingerprint)?.is_some())
    }

    /// Address and expiry of a live record, without decrypting it.
    pub fn info(&self, fingerprint: &DeviceFingerprint) -> Result<Option<HotWalletInfo>> {
        let Some(raw) = self.store.get(&record_key(fingerprint.as_str()))? else {
            return Ok(None);
        };
        Ok(check_envelope(&raw, fingerprint).ok().map(|record| HotWalletInfo {
            address: record.hot_wallet_address,
            expires_at: record.expires_at,
        }))
    }
}

fn check_envelope(raw: &str, fingerprint: &DeviceFingerprint) -> Result<EncryptedHotWalletRecord> {
    let record: EncryptedHotWalletRecord = serde_json::from_str(raw)
        .map_err(|e| NotesError::StorageCorrupted(format!("unreadable record: {}", e)))?;

    if record.version != RECORD_VERSION {
        return Err(NotesError::StorageCorrupted(format!(
            "unsupported record version {}",
            record.version
        )));
    }

    if record.device_fingerprint != fingerprint.as_str() {
        return Err(NotesError::StorageCorrupted(
            "record belongs to another device".to_string(),
        ));
    }

    if now_millis() > record.expires_at {
        return Err(NotesError::StorageCorrupted("record expired".to_string()));
    }

    Ok(record)
}

fn open_record(
    raw: &str,
    fingerprint: &DeviceFingerprint,
    signature: &WalletSignature,
    user_address: &str,
) -> Result<HotWalletKeypair> {
    let record = check_envelope(raw, fingerprint)?;

    let iv = STANDARD
        .decode(record.iv.as_bytes())
        .map_err(|e| NotesError::StorageCorrupted(format!("iv is not base64: {}", e)))?;
    if iv.len() != IV_LENGTH {
        return Err(NotesError::StorageCorrupted(format!(
            "iv must be {} bytes (got {})",
            IV_LENGTH,
            iv.len()
        )));
    }
    let sealed = STANDARD
        .decode(record.encrypted_private_key.as_bytes())
        .map_err(|e| NotesError::StorageCorrupted(format!("private key is not base64: {}", e)))?;

    let mut envelope = iv;
    envelope.extend_from_slice(&sealed);

    let key = derive_content_key(signature, user_address)?;
    let secret = Zeroizing::new(decrypt(&envelope, &key).map_err(|e| {
        NotesError::StorageCorrupted(format!("private key did not decrypt: {}", e))
    })?);

    let seed: [u8; SEED_LENGTH] = secret.as_slice().try_into().map_err(|_| {
        NotesError::StorageCorrupted(format!(
            "private key must be {} bytes (got {})",
            SEED_LENGTH,
            secret.len()
        ))
    })?;
    let seed = Zeroizing::new(seed);
    let keypair = HotWalletKeypair::from_seed(&seed);

    if keypair.address() != record.hot_wallet_address {
        return Err(NotesError::StorageCorrupted(
            "decrypted key does not match stored address".to_string(),
        ));
    }

    Ok(keypair)
}
