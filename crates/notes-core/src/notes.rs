//! Note content and metadata encryption over a blob store.
//!
//! Note bodies go to the blob store as envelopes; short fields such as
//! titles and folder names are sealed into base64 text for the ledger.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::crypto::{decrypt, decrypt_text, encrypt, encrypt_text, ContentKey};
use crate::error::{NotesError, Result};

/// Shown in place of a field that could not be decrypted.
pub const UNREADABLE_PLACEHOLDER: &str = "[Encrypted]";

/// Content address assigned by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(String);

impl BlobId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(NotesError::InvalidInput("empty blob id".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for opaque encrypted bytes.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>) -> Result<BlobId>;
    async fn download(&self, id: &BlobId) -> Result<Vec<u8>>;
}

/// Encrypts note content before it leaves the device.
pub struct NoteVault {
    key: ContentKey,
    blobs: Arc<dyn BlobStore>,
}

impl NoteVault {
    pub fn new(key: ContentKey, blobs: Arc<dyn BlobStore>) -> Self {
        Self { key, blobs }
    }

    /// Encrypt and upload a note body.
    pub async fn store_content(&self, plaintext: &[u8]) -> Result<BlobId> {
        let envelope = encrypt(plaintext, &self.key)?;
        let id = self.blobs.upload(envelope).await?;
        tracing::debug!(blob = %id, bytes = plaintext.len(), "stored note content");
        Ok(id)
    }

    /// Download and decrypt a note body.
    pub async fn load_content(&self, id: &BlobId) -> Result<Vec<u8>> {
        let envelope = self.blobs.download(id).await?;
        decrypt(&envelope, &self.key)
    }

    pub fn seal_field(&self, value: &str) -> Result<String> {
        encrypt_text(value, &self.key)
    }

    pub fn open_field(&self, sealed: &str) -> Result<String> {
        decrypt_text(sealed, &self.key)
    }

    /// Open a field for display. Failures are logged and replaced with a
    /// placeholder so one bad title doesn't hide the rest of a listing.
    pub fn open_field_or_placeholder(&self, sealed: &str) -> String {
        match self.open_field(sealed) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!("failed to decrypt field: {}", err);
                UNREADABLE_PLACEHOLDER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{derive_content_key, WalletSignature};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryBlobs {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl BlobStore for MemoryBlobs {
        async fn upload(&self, bytes: Vec<u8>) -> Result<BlobId> {
            let mut blobs = self.blobs.lock().unwrap();
            let id = format!("blob-{}", blobs.len());
            blobs.insert(id.clone(), bytes);
            BlobId::new(id)
        }

        async fn download(&self, id: &BlobId) -> Result<Vec<u8>> {
            self.blobs
                .lock()
                .unwrap()
                .get(id.as_str())
                .cloned()
                .ok_or_else(|| NotesError::Storage(format!("no blob {}", id)))
        }
    }

    fn key(seed: u8) -> ContentKey {
        let signature = WalletSignature::from_bytes(vec![seed; 64]).unwrap();
        derive_content_key(&signature, &format!("0x{}", "1".repeat(64))).unwrap()
    }

    #[tokio::test]
    async fn test_content_is_encrypted_at_rest() {
        let blobs = Arc::new(MemoryBlobs::default());
        let vault = NoteVault::new(key(1), blobs.clone());

        let id = vault.store_content(b"meeting notes").await.unwrap();

        let raw = blobs.blobs.lock().unwrap().get(id.as_str()).cloned().unwrap();
        assert!(!raw.windows(7).any(|w| w == b"meeting"));
        assert_eq!(vault.load_content(&id).await.unwrap(), b"meeting notes");
    }

    #[tokio::test]
    async fn test_other_key_cannot_load() {
        let blobs = Arc::new(MemoryBlobs::default());
        let id = NoteVault::new(key(1), blobs.clone())
            .store_content(b"secret")
            .await
            .unwrap();

        let err = NoteVault::new(key(2), blobs).load_content(&id).await;
        assert!(matches!(err, Err(NotesError::DecryptionFailed)));
    }

    #[test]
    fn test_field_placeholder() {
        let blobs = Arc::new(MemoryBlobs::default());
        let vault = NoteVault::new(key(1), blobs.clone());
        let sealed = vault.seal_field("Groceries").unwrap();

        assert_eq!(vault.open_field_or_placeholder(&sealed), "Groceries");
        let stranger = NoteVault::new(key(2), blobs);
        assert_eq!(stranger.open_field_or_placeholder(&sealed), UNREADABLE_PLACEHOLDER);
        assert!(stranger.open_field(&sealed).is_err());
    }

    #[test]
    fn test_blob_id_rejects_empty() {
        assert!(BlobId::new("  ").is_err());
        assert_eq!(BlobId::new("abc").unwrap().to_string(), "abc");
    }
}
