//! External wallet contract.

use async_trait::async_trait;

use crate::crypto::WalletSignature;
use crate::error::Result;

/// The user's primary wallet.
///
/// Signing is user-interaction bound and may take arbitrarily long. A refusal
/// or cancellation is reported as `NotesError::SignatureRequest`.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address of the connected account.
    fn address(&self) -> String;

    /// Sign a human-readable message.
    async fn sign_personal_message(&self, message: &[u8]) -> Result<WalletSignature>;
}
