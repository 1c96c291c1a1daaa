//! Error types for notes core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-facing messages and exit codes.

use thiserror::Error;

/// Result type alias for notes operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Core error type for notes operations.
#[derive(Debug, Error)]
pub enum NotesError {
    /// Malformed wallet address
    #[error("Invalid address format: {0}")]
    InvalidAddressFormat(String),

    /// Signature bytes unusable as key material
    #[error("Key import failed: {0}")]
    KeyImportFailed(String),

    /// Envelope too short or not decodable
    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// AEAD authentication failure (wrong key, corruption, tampering)
    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    /// AEAD seal failure or no randomness available
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Capability creation needs more of the funding token than the wallet holds
    #[error(
        "Funding required: the wallet does not hold enough {coin_type}. Request test tokens from {faucet} and try again"
    )]
    FundingRequired { coin_type: String, faucet: String },

    /// The newly created capability never became visible on-chain
    #[error("Session capability not observed on-chain after {attempts} attempts")]
    CapabilityNotObserved { attempts: u32 },

    /// Stored hot-wallet record failed validation and was erased
    #[error("Stored hot wallet rejected: {0}")]
    StorageCorrupted(String),

    /// Local key-value backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Ledger client error
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Wallet declined or failed to produce a signature
    #[error("Signature request failed: {0}")]
    SignatureRequest(String),

    /// Ledger object did not have the expected shape
    #[error("Invalid ledger object: {0}")]
    InvalidObject(String),

    /// Operation requires an active session
    #[error("No active session")]
    SessionInactive,

    /// A revoke landed while the session was being authorized or restored
    #[error("Session was revoked before authorization completed")]
    SessionRevoked,

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl NotesError {
    /// Whether the failure is transient and worth retrying.
    ///
    /// Cryptographic and validation errors indicate bad input or a security
    /// event and are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotesError::Ledger(_) | NotesError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_message_names_faucet() {
        let err = NotesError::FundingRequired {
            coin_type: "0x2::wal::WAL".to_string(),
            faucet: "https://faucet.example".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("0x2::wal::WAL"));
        assert!(message.contains("https://faucet.example"));
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(NotesError::Ledger("timeout".to_string()).is_retryable());
        assert!(NotesError::Storage("locked".to_string()).is_retryable());
        assert!(!NotesError::DecryptionFailed.is_retryable());
        assert!(!NotesError::InvalidAddressFormat("0x".to_string()).is_retryable());
        assert!(!NotesError::CapabilityNotObserved { attempts: 3 }.is_retryable());
        assert!(!NotesError::SessionRevoked.is_retryable());
    }
}
