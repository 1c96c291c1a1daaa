//! AES-256-GCM envelope encryption.
//!
//! Wire format (bit-exact, shared with previously stored data):
//!
//! ```text
//! IV[12] ‖ CIPHERTEXT[n] ‖ TAG[16]      total = n + 28
//! ```
//!
//! Short text fields (titles, folder names) carry the base64 encoding of the
//! same layout.

use aes_gcm::aead::Aead;
use aes_gcm::Nonce;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{NotesError, Result};

use super::kdf::ContentKey;

/// IV length in bytes.
pub const IV_LENGTH: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Smallest envelope that can possibly be valid (empty plaintext).
pub const MIN_ENVELOPE_LENGTH: usize = IV_LENGTH + TAG_LENGTH;

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// # Examples
///
/// ```
/// use notes_core::crypto::{decrypt, derive_content_key, encrypt, WalletSignature};
///
/// let signature = WalletSignature::from_bytes(vec![0u8; 64]).unwrap();
/// let key = derive_content_key(&signature, &format!("0x{}", "1".repeat(64))).unwrap();
///
/// let sealed = encrypt(b"secret note", &key).unwrap();
/// assert_eq!(sealed.len(), b"secret note".len() + 28);
/// assert_eq!(decrypt(&sealed, &key).unwrap(), b"secret note");
/// ```
pub fn encrypt(plaintext: &[u8], key: &ContentKey) -> Result<Vec<u8>> {
    let iv = generate_iv()?;

    let ciphertext = key
        .cipher()
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| NotesError::EncryptionFailed(format!("AES-GCM seal failed: {}", e)))?;

    let mut envelope = Vec::with_capacity(IV_LENGTH + ciphertext.len());
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// # Errors
///
/// - `NotesError::InvalidCiphertext` if the envelope is shorter than 28 bytes
///   (checked before any cryptographic work)
/// - `NotesError::DecryptionFailed` if authentication fails: wrong key,
///   corrupted ciphertext, or a modified tag
pub fn decrypt(envelope: &[u8], key: &ContentKey) -> Result<Vec<u8>> {
    if envelope.len() < MIN_ENVELOPE_LENGTH {
        return Err(NotesError::InvalidCiphertext(format!(
            "envelope must be at least {} bytes (got {})",
            MIN_ENVELOPE_LENGTH,
            envelope.len()
        )));
    }

    let (iv, ciphertext) = envelope.split_at(IV_LENGTH);
    key.cipher()
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| NotesError::DecryptionFailed)
}

/// Encrypt a text field and return the base64 form of the envelope.
pub fn encrypt_text(plaintext: &str, key: &ContentKey) -> Result<String> {
    let envelope = encrypt(plaintext.as_bytes(), key)?;
    Ok(STANDARD.encode(envelope))
}

/// Decrypt a base64 text field produced by [`encrypt_text`].
///
/// Input that fails strict base64 decoding gets one cleanup pass (foreign
/// characters stripped, padding rebuilt) before being rejected. The cleanup is
/// logged: it means something upstream mangled the stored value.
pub fn decrypt_text(encoded: &str, key: &ContentKey) -> Result<String> {
    let envelope = decode_lenient(encoded)?;
    let plaintext = decrypt(&envelope, key)?;
    String::from_utf8(plaintext).map_err(|_| NotesError::DecryptionFailed)
}

fn decode_lenient(encoded: &str) -> Result<Vec<u8>> {
    let trimmed = encoded.trim();
    match STANDARD.decode(trimmed.as_bytes()) {
        Ok(bytes) => Ok(bytes),
        Err(strict_err) => {
            let cleaned = clean_base64(trimmed);
            tracing::warn!(
                original_len = trimmed.len(),
                cleaned_len = cleaned.len(),
                "encrypted text field needed base64 cleanup: {}",
                strict_err
            );
            STANDARD.decode(cleaned.as_bytes()).map_err(|e| {
                NotesError::InvalidCiphertext(format!("text field is not valid base64: {}", e))
            })
        }
    }
}

fn clean_base64(input: &str) -> String {
    let mut cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '/')
        .collect();
    let remainder = cleaned.len() % 4;
    if remainder != 0 {
        cleaned.push_str(&"=".repeat(4 - remainder));
    }
    cleaned
}

fn generate_iv() -> Result<[u8; IV_LENGTH]> {
    let mut iv = [0u8; IV_LENGTH];
    getrandom::getrandom(&mut iv)
        .map_err(|e| NotesError::EncryptionFailed(format!("Failed to generate IV: {}", e)))?;
    Ok(iv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::derive_content_key;
    use crate::crypto::signature::WalletSignature;

    fn key() -> ContentKey {
        let signature = WalletSignature::from_bytes(vec![0u8; 64]).unwrap();
        derive_content_key(&signature, &format!("0x{}", "1".repeat(64))).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let key = key();
        let plaintext = b"Hello, World! This is secret data.";

        let encrypted = encrypt(plaintext, &key).unwrap();
        let decrypted = decrypt(&encrypted, &key).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_envelope_layout() {
        let key = key();
        let encrypted = encrypt(b"abc", &key).unwrap();
        assert_eq!(encrypted.len(), 3 + MIN_ENVELOPE_LENGTH);
    }

    #[test]
    fn test_empty_plaintext() {
        let key = key();
        let encrypted = encrypt(b"", &key).unwrap();
        assert_eq!(encrypted.len(), MIN_ENVELOPE_LENGTH);
        assert!(decrypt(&encrypted, &key).unwrap().is_empty());
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let key = key();
        let first = encrypt(b"same plaintext", &key).unwrap();
        let second = encrypt(b"same plaintext", &key).unwrap();

        assert_ne!(&first[..IV_LENGTH], &second[..IV_LENGTH]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_short_envelope_rejected() {
        let key = key();
        for len in 0..MIN_ENVELOPE_LENGTH {
            let result = decrypt(&vec![0u8; len], &key);
            assert!(matches!(result, Err(NotesError::InvalidCiphertext(_))));
        }
    }

    #[test]
    fn test_every_byte_flip_detected() {
        let key = key();
        let encrypted = encrypt(b"tamper me", &key).unwrap();

        for index in 0..encrypted.len() {
            let mut corrupted = encrypted.clone();
            corrupted[index] ^= 0x01;
            let result = decrypt(&corrupted, &key);
            assert!(
                matches!(result, Err(NotesError::DecryptionFailed)),
                "flip at byte {} was not detected",
                index
            );
        }
    }

    #[test]
    fn test_text_round_trip_multibyte() {
        let key = key();
        for plaintext in ["", "Hello, 世界", "emoji 🔐 and ümlauts"] {
            let encoded = encrypt_text(plaintext, &key).unwrap();
            assert_eq!(decrypt_text(&encoded, &key).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_text_cleanup_recovers_mangled_padding() {
        let key = key();
        let encoded = encrypt_text("folder name", &key).unwrap();

        let mangled = format!(" {}\n", encoded.trim_end_matches('='));
        assert_eq!(decrypt_text(&mangled, &key).unwrap(), "folder name");

        let with_noise: String = encoded
            .chars()
            .enumerate()
            .flat_map(|(i, c)| if i == 5 { vec!['"', c] } else { vec![c] })
            .collect();
        assert_eq!(decrypt_text(&with_noise, &key).unwrap(), "folder name");
    }

    #[test]
    fn test_text_unrecoverable_input_fails() {
        let key = key();
        let result = decrypt_text("A", &key);
        assert!(matches!(result, Err(NotesError::InvalidCiphertext(_))));
    }

    #[test]
    fn test_text_short_envelope_rejected() {
        let key = key();
        let result = decrypt_text(&STANDARD.encode([0u8; 10]), &key);
        assert!(matches!(result, Err(NotesError::InvalidCiphertext(_))));
    }
}
