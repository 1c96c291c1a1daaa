//! Wallet signature used as key material.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretBox};

use crate::error::{NotesError, Result};

/// Minimum signature length accepted as key material.
pub const MIN_SIGNATURE_BYTES: usize = 32;

/// A wallet signature over the derivation message.
///
/// The bytes are treated as high-entropy secret key material: they are never
/// persisted, never logged, and zeroized on drop.
pub struct WalletSignature {
    bytes: SecretBox<Vec<u8>>,
}

impl WalletSignature {
    /// Decode a signature from its base64 wire form.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim().as_bytes())
            .map_err(|e| NotesError::KeyImportFailed(format!("signature is not base64: {}", e)))?;
        Self::from_bytes(bytes)
    }

    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < MIN_SIGNATURE_BYTES {
            return Err(NotesError::KeyImportFailed(format!(
                "signature must be at least {} bytes (got {})",
                MIN_SIGNATURE_BYTES,
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: SecretBox::new(Box::new(bytes)),
        })
    }

    /// Base64 wire form.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes.expose_secret())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}

impl std::fmt::Debug for WalletSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSignature")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
