//! Cryptographic operations for notes.
//!
//! A single wallet signature over [`DERIVATION_MESSAGE`] is the root of every
//! secret on the device:
//!
//! ```text
//! WalletSignature
//!     ├── HKDF(salt = version ‖ full address)   → ContentKey (AES-256-GCM)
//!     └── HKDF(salt = version ‖ address prefix,
//!              info = device fingerprint)        → HotWalletKeypair (Ed25519)
//! ```
//!
//! The content key also seals the hot wallet's private key at rest.
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of stored records or blobs (ciphertext only, AEAD-authenticated)
//! - Cross-user and cross-device key reuse (distinct salts and info strings)
//! - Tampering with stored hot-wallet records (fail closed and erase)
//!
//! We do NOT defend against:
//! - Compromise of the wallet signature itself
//! - Access to an unlocked session / memory

pub mod envelope;
pub mod kdf;
pub mod keypair;
pub mod signature;

pub use envelope::{decrypt, decrypt_text, encrypt, encrypt_text};
pub use kdf::{derive_content_key, derive_hot_wallet_keypair, ContentKey, DERIVATION_MESSAGE};
pub use keypair::HotWalletKeypair;
pub use signature::WalletSignature;
