//! Key derivation using HKDF-SHA256.
//!
//! Both derivations start from the same wallet signature. They are kept
//! cryptographically unrelated by distinct salt constructions and info strings:
//! the content key is salted with the full address, the hot-wallet seed with an
//! address prefix and bound to a device fingerprint through its info string.

use aes_gcm::{Aes256Gcm, KeyInit};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::address::validate_address;
use crate::error::{NotesError, Result};
use crate::fingerprint::DeviceFingerprint;

use super::keypair::{HotWalletKeypair, SEED_LENGTH};
use super::signature::WalletSignature;

/// Message the wallet signs once to unlock a device.
///
/// Changing this string invalidates every key previously derived from it.
pub const DERIVATION_MESSAGE: &str = "Encrypted Notes key derivation v1\n\nSign this message to unlock your notes on this device. This does not authorize any transaction.";

const CONTENT_KEY_SALT_PREFIX: &str = "notes-content-key-v1:";
const CONTENT_KEY_INFO: &[u8] = b"content-encryption-key";

const HOT_WALLET_SALT_PREFIX: &str = "notes-hot-wallet-v1:";
const HOT_WALLET_ADDRESS_PREFIX_CHARS: usize = 8;

/// Length of the AES-256 key in bytes.
const CONTENT_KEY_LENGTH: usize = 32;

/// AES-256-GCM key for note content and metadata.
///
/// The raw key bytes are dropped (and zeroized) as soon as the cipher is
/// initialized; there is no way to read them back.
#[derive(Clone)]
pub struct ContentKey {
    cipher: Aes256Gcm,
}

impl ContentKey {
    pub(crate) fn cipher(&self) -> &Aes256Gcm {
        &self.cipher
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive the content-encryption key for `user_address`.
///
/// # Security
///
/// - Same signature + address always yields a key that opens data sealed by
///   any earlier derivation
/// - The full address is part of the salt, so two users never share a key
///   even if the signature bytes collide
///
/// # Examples
///
/// ```
/// use notes_core::crypto::{decrypt, derive_content_key, encrypt, WalletSignature};
///
/// let signature = WalletSignature::from_bytes(vec![0u8; 64]).unwrap();
/// let address = format!("0x{}", "1".repeat(64));
/// let key = derive_content_key(&signature, &address).unwrap();
///
/// let sealed = encrypt(b"note", &key).unwrap();
/// let again = derive_content_key(&signature, &address).unwrap();
/// assert_eq!(decrypt(&sealed, &again).unwrap(), b"note");
/// ```
pub fn derive_content_key(signature: &WalletSignature, user_address: &str) -> Result<ContentKey> {
    validate_address(user_address)?;

    let salt = format!("{}{}", CONTENT_KEY_SALT_PREFIX, user_address);
    let mut key_bytes = Zeroizing::new([0u8; CONTENT_KEY_LENGTH]);
    hkdf_expand(
        signature,
        salt.as_bytes(),
        CONTENT_KEY_INFO,
        &mut key_bytes[..],
    )?;

    let cipher = Aes256Gcm::new_from_slice(&key_bytes[..])
        .map_err(|e| NotesError::KeyImportFailed(format!("AES key rejected: {}", e)))?;

    tracing::debug!("derived content key");
    Ok(ContentKey { cipher })
}

/// Derive this device's hot wallet keypair for `user_address`.
///
/// A different fingerprint or a different signature yields a different
/// keypair. The salt only carries the first eight characters of the address
/// (`0x` plus six hex digits), so two users whose addresses share that prefix
/// get the same salt. Their keypairs still differ because each user's wallet
/// produces its own signature; the address alone does not separate them.
pub fn derive_hot_wallet_keypair(
    signature: &WalletSignature,
    fingerprint: &DeviceFingerprint,
    user_address: &str,
) -> Result<HotWalletKeypair> {
    validate_address(user_address)?;

    let salt = format!(
        "{}{}",
        HOT_WALLET_SALT_PREFIX,
        &user_address[..HOT_WALLET_ADDRESS_PREFIX_CHARS]
    );
    let info = format!("device:{}:hot-wallet-seed", fingerprint.as_str());

    let mut seed = Zeroizing::new([0u8; SEED_LENGTH]);
    hkdf_expand(signature, salt.as_bytes(), info.as_bytes(), &mut seed[..])?;

    let keypair = HotWalletKeypair::from_seed(&seed);
    tracing::debug!(hot_wallet = %keypair.address(), "derived hot wallet keypair");
    Ok(keypair)
}

fn hkdf_expand(
    signature: &WalletSignature,
    salt: &[u8],
    info: &[u8],
    output: &mut [u8],
) -> Result<()> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), signature.as_bytes());
    hkdf.expand(info, output)
        .map_err(|e| NotesError::KeyImportFailed(format!("HKDF expansion failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::{decrypt, encrypt};

    fn signature(byte: u8) -> WalletSignature {
        WalletSignature::from_bytes(vec![byte; 64]).unwrap()
    }

    fn address(digit: char) -> String {
        format!("0x{}", digit.to_string().repeat(64))
    }

    fn fingerprint(digit: char) -> DeviceFingerprint {
        DeviceFingerprint::parse(&digit.to_string().repeat(64)).unwrap()
    }

    #[test]
    fn test_content_key_deterministic() {
        let key1 = derive_content_key(&signature(0), &address('1')).unwrap();
        let key2 = derive_content_key(&signature(0), &address('1')).unwrap();

        let sealed = encrypt(b"interchangeable", &key1).unwrap();
        assert_eq!(decrypt(&sealed, &key2).unwrap(), b"interchangeable");
    }

    #[test]
    fn test_content_key_user_separation() {
        let key1 = derive_content_key(&signature(0), &address('1')).unwrap();
        let key2 = derive_content_key(&signature(0), &address('2')).unwrap();

        let sealed = encrypt(b"private", &key1).unwrap();
        assert!(matches!(
            decrypt(&sealed, &key2),
            Err(NotesError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_content_key_signature_separation() {
        let key1 = derive_content_key(&signature(0), &address('1')).unwrap();
        let key2 = derive_content_key(&signature(1), &address('1')).unwrap();

        let sealed = encrypt(b"private", &key1).unwrap();
        assert!(decrypt(&sealed, &key2).is_err());
    }

    #[test]
    fn test_content_key_rejects_bad_address() {
        let result = derive_content_key(&signature(0), "0x1234");
        assert!(matches!(result, Err(NotesError::InvalidAddressFormat(_))));
    }

    #[test]
    fn test_hot_wallet_deterministic() {
        let a = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), &address('1')).unwrap();
        let b = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), &address('1')).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_hot_wallet_device_separation() {
        let a = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), &address('1')).unwrap();
        let b = derive_hot_wallet_keypair(&signature(0), &fingerprint('b'), &address('1')).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_hot_wallet_user_separation() {
        let a = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), &address('1')).unwrap();
        let b = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), &address('2')).unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_hot_wallet_salt_only_sees_address_prefix() {
        let first = format!("0x123456{}", "a".repeat(58));
        let second = format!("0x123456{}", "b".repeat(58));

        let a = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), &first).unwrap();
        let b = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), &second).unwrap();
        assert_eq!(a.address(), b.address());

        let c = derive_hot_wallet_keypair(&signature(1), &fingerprint('a'), &second).unwrap();
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn test_hot_wallet_rejects_bad_address() {
        let result = derive_hot_wallet_keypair(&signature(0), &fingerprint('a'), "1111");
        assert!(matches!(result, Err(NotesError::InvalidAddressFormat(_))));
    }

    #[test]
    fn test_content_key_debug_redacts() {
        let key = derive_content_key(&signature(0), &address('1')).unwrap();
        assert!(format!("{:?}", key).contains("REDACTED"));
    }
}
