//! Device-bound hot wallet keypair.

use ed25519_dalek::{Signature, Signer, SigningKey};
use zeroize::Zeroizing;

/// Signature scheme flag prepended to the public key before hashing.
const ED25519_SCHEME_FLAG: u8 = 0x00;

/// Length of the Ed25519 seed in bytes.
pub const SEED_LENGTH: usize = 32;

/// An Ed25519 signing keypair acting as a delegated signer for one device.
#[derive(Clone)]
pub struct HotWalletKeypair {
    signing_key: SigningKey,
}

impl HotWalletKeypair {
    /// Build the keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SEED_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Ledger address: `0x` + hex(BLAKE2b-256(flag ‖ public key)).
    pub fn address(&self) -> String {
        let public_key = self.signing_key.verifying_key().to_bytes();
        let hash = blake2b_simd::Params::new()
            .hash_length(32)
            .to_state()
            .update(&[ED25519_SCHEME_FLAG])
            .update(&public_key)
            .finalize();
        format!("0x{}", hex::encode(hash.as_bytes()))
    }

    /// Raw Ed25519 public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message with the hot wallet key.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Raw private seed. Only the hot-wallet store should need this.
    pub(crate) fn secret_bytes(&self) -> Zeroizing<[u8; SEED_LENGTH]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }
}

impl std::fmt::Debug for HotWalletKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotWalletKeypair")
            .field("address", &self.address())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::validate_address;
    use ed25519_dalek::{Verifier, VerifyingKey};

    #[test]
    fn test_address_format() {
        let keypair = HotWalletKeypair::from_seed(&[9u8; 32]);
        let address = keypair.address();
        assert!(validate_address(&address).is_ok());
        assert_eq!(address, address.to_lowercase());
    }

    #[test]
    fn test_same_seed_same_address() {
        let a = HotWalletKeypair::from_seed(&[1u8; 32]);
        let b = HotWalletKeypair::from_seed(&[1u8; 32]);
        let c = HotWalletKeypair::from_seed(&[2u8; 32]);
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn test_signature_verifies() {
        let keypair = HotWalletKeypair::from_seed(&[3u8; 32]);
        let signature = keypair.sign(b"move call");
        let verifying_key = VerifyingKey::from_bytes(&keypair.public_key_bytes()).unwrap();
        assert!(verifying_key.verify(b"move call", &signature).is_ok());
    }

    #[test]
    fn test_secret_round_trip() {
        let keypair = HotWalletKeypair::from_seed(&[4u8; 32]);
        let restored = HotWalletKeypair::from_seed(&keypair.secret_bytes());
        assert_eq!(keypair.address(), restored.address());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let keypair = HotWalletKeypair::from_seed(&[5u8; 32]);
        let debug_output = format!("{:?}", keypair);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hex::encode([5u8; 4])));
    }
}
