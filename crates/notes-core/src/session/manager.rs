//! Session state machine.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::ledger::{LedgerClient, LedgerTransaction, SessionCapability};
use super::monitor::{self, ExpirationObserver, ExpirationStatus};
use super::retry::poll_until;
use super::wallet::WalletSigner;
use super::{SessionConfig, HOT_WALLET_GAS_FUNDING, HOT_WALLET_TOKEN_FUNDING, SESSION_DURATION};
use crate::address::validate_address;
use crate::crypto::{
    derive_content_key, derive_hot_wallet_keypair, ContentKey, HotWalletKeypair, WalletSignature,
    DERIVATION_MESSAGE,
};
use crate::error::{NotesError, Result};
use crate::fingerprint::{DeviceFingerprint, FingerprintService};
use crate::hot_wallet::HotWalletStore;
use crate::time::now_millis;

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthorized,
    Authorizing,
    Active,
    /// Active, but within the warning threshold of expiry.
    Expiring,
    /// Past expiry and not yet revoked by the monitor.
    Expired,
    Revoked,
}

/// A live delegated session.
#[derive(Debug, Clone)]
pub struct AuthorizedSession {
    pub notebook_id: String,
    pub capability: SessionCapability,
    pub keypair: HotWalletKeypair,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

impl AuthorizedSession {
    pub fn hot_wallet_address(&self) -> String {
        self.keypair.address()
    }

    /// Time left at `now_ms`, zero once expired.
    pub fn remaining_at(&self, now_ms: i64) -> Duration {
        let millis = self.expires_at.saturating_sub(now_ms).max(0);
        Duration::from_millis(u64::try_from(millis).unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capability {
    ReuseLive,
    CreateNew,
}

enum Slot {
    Unauthorized,
    Authorizing,
    Active {
        session: AuthorizedSession,
        user_address: String,
    },
    Revoked,
}

/// Drives the authorize / restore / revoke lifecycle of a hot-wallet session.
pub struct SessionManager {
    config: SessionConfig,
    ledger: Arc<dyn LedgerClient>,
    wallet: Arc<dyn WalletSigner>,
    fingerprints: Arc<FingerprintService>,
    hot_wallets: Arc<HotWalletStore>,
    observer: Option<Arc<dyn ExpirationObserver>>,
    slot: RwLock<Slot>,
    /// Bumped by every revoke, always under the `slot` write lock.
    revocations: AtomicU64,
    authorizing: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        ledger: Arc<dyn LedgerClient>,
        wallet: Arc<dyn WalletSigner>,
        fingerprints: Arc<FingerprintService>,
        hot_wallets: Arc<HotWalletStore>,
    ) -> Self {
        Self {
            config,
            ledger,
            wallet,
            fingerprints,
            hot_wallets,
            observer: None,
            slot: RwLock::new(Slot::Unauthorized),
            revocations: AtomicU64::new(0),
            authorizing: Mutex::new(()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExpirationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Ask the wallet for the derivation signature and derive the content key.
    ///
    /// The signature is returned so the caller can reuse it for `restore` or
    /// `authorize_with_signature` without prompting again.
    pub async fn unlock(&self) -> Result<(ContentKey, WalletSignature)> {
        let user_address = self.wallet.address();
        validate_address(&user_address)?;
        let signature = self.request_signature().await?;
        let key = derive_content_key(&signature, &user_address)?;
        Ok((key, signature))
    }

    /// Authorize a session for `notebook_id`, prompting the wallet to sign.
    pub async fn authorize(&self, notebook_id: &str) -> Result<AuthorizedSession> {
        self.authorize_flow(notebook_id, None, Capability::ReuseLive)
            .await
    }

    /// Authorize with a signature the caller already holds.
    pub async fn authorize_with_signature(
        &self,
        notebook_id: &str,
        signature: &WalletSignature,
        user_address: &str,
    ) -> Result<AuthorizedSession> {
        self.authorize_flow(
            notebook_id,
            Some((signature, user_address)),
            Capability::ReuseLive,
        )
        .await
    }

    /// Resume a session from the hot wallet persisted on this device.
    ///
    /// `Ok(None)` when there is nothing usable to restore: no record, a
    /// rejected record, or no live capability on-chain for it.
    pub async fn restore(
        &self,
        signature: &WalletSignature,
        user_address: &str,
    ) -> Result<Option<AuthorizedSession>> {
        let _guard = self.authorizing.lock().await;
        let generation = self.revocations.load(Ordering::SeqCst);
        validate_address(user_address)?;
        let fingerprint = self.fingerprints.derive();

        let Some(keypair) = self
            .hot_wallets
            .retrieve(&fingerprint, signature, user_address)?
        else {
            return Ok(None);
        };

        let hot_address = keypair.address();
        let Some(capability) = self.find_active_capability(&hot_address, None).await? else {
            tracing::info!(hot_wallet = %hot_address, "no live capability for stored hot wallet");
            return Ok(None);
        };

        let session = AuthorizedSession {
            notebook_id: capability.notebook_id.clone(),
            expires_at: capability.expires_at,
            capability,
            keypair,
        };
        let restored = self.commit(
            generation,
            Slot::Active {
                session: session.clone(),
                user_address: user_address.to_string(),
            },
        );
        if !restored {
            tracing::info!(hot_wallet = %hot_address, "revoked during restore");
            return Ok(None);
        }
        tracing::info!(hot_wallet = %hot_address, "restored session");
        Ok(Some(session))
    }

    /// Distrust the hot wallet on this device.
    ///
    /// Erases the persisted record and in-memory state. The on-chain
    /// capability is left to expire. An authorization still in flight is
    /// discarded when it completes.
    pub fn revoke(&self) -> Result<()> {
        {
            let mut slot = self.write_slot();
            *slot = Slot::Revoked;
            self.revocations.fetch_add(1, Ordering::SeqCst);
        }
        let fingerprint = self.fingerprints.derive();
        self.hot_wallets.clear(&fingerprint)?;
        tracing::info!("session revoked");
        Ok(())
    }

    /// Revoke, then authorize again for the capability's notebook.
    pub async fn refresh(&self) -> Result<AuthorizedSession> {
        let notebook_id = match &*self.read_slot() {
            Slot::Active { session, .. } => session.capability.notebook_id.clone(),
            _ => return Err(NotesError::SessionInactive),
        };
        self.revoke()?;
        self.authorize_flow(&notebook_id, None, Capability::CreateNew)
            .await
    }

    pub fn state(&self) -> SessionState {
        match &*self.read_slot() {
            Slot::Unauthorized => SessionState::Unauthorized,
            Slot::Authorizing => SessionState::Authorizing,
            Slot::Revoked => SessionState::Revoked,
            Slot::Active { session, .. } => {
                let now = now_millis();
                if now >= session.expires_at {
                    SessionState::Expired
                } else if session.remaining_at(now) <= self.config.warning_threshold {
                    SessionState::Expiring
                } else {
                    SessionState::Active
                }
            }
        }
    }

    /// The active session, if it has not expired.
    pub fn current(&self) -> Option<AuthorizedSession> {
        match &*self.read_slot() {
            Slot::Active { session, .. } if now_millis() < session.expires_at => {
                Some(session.clone())
            }
            _ => None,
        }
    }

    /// Revoke an expired session, or warn the observer about one close to it.
    pub fn check_expiration(&self) -> Result<ExpirationStatus> {
        let (hot_address, remaining, expired) = match &*self.read_slot() {
            Slot::Active { session, .. } => {
                let now = now_millis();
                (
                    session.hot_wallet_address(),
                    session.remaining_at(now),
                    now >= session.expires_at,
                )
            }
            _ => return Ok(ExpirationStatus::Inactive),
        };

        if expired {
            tracing::info!(hot_wallet = %hot_address, "session expired");
            self.revoke()?;
            if let Some(observer) = &self.observer {
                observer.session_expired(&hot_address);
            }
            return Ok(ExpirationStatus::Expired);
        }

        if remaining <= self.config.warning_threshold {
            if let Some(observer) = &self.observer {
                observer.session_expiring(&hot_address, remaining);
            }
            return Ok(ExpirationStatus::Expiring { remaining });
        }
        Ok(ExpirationStatus::Healthy { remaining })
    }

    /// Start the background expiration monitor. It stops once the last
    /// `Arc` to the manager is dropped.
    pub fn spawn_expiration_monitor(self: &Arc<Self>) -> JoinHandle<()> {
        monitor::spawn(self)
    }

    async fn authorize_flow(
        &self,
        notebook_id: &str,
        supplied: Option<(&WalletSignature, &str)>,
        capability: Capability,
    ) -> Result<AuthorizedSession> {
        let _guard = self.authorizing.lock().await;
        let generation = self.revocations.load(Ordering::SeqCst);
        let user_address = match supplied {
            Some((_, address)) => address.to_string(),
            None => self.wallet.address(),
        };
        if capability == Capability::ReuseLive {
            if let Some(existing) = self.reusable(notebook_id, &user_address) {
                return Ok(existing);
            }
        }

        self.commit(generation, Slot::Authorizing);
        let result: Result<AuthorizedSession> = async {
            validate_address(&user_address)?;
            let fingerprint = self.fingerprints.derive();
            let requested;
            let signature = match supplied {
                Some((signature, _)) => signature,
                None => {
                    requested = self.request_signature().await?;
                    &requested
                }
            };
            self.establish(notebook_id, signature, &user_address, &fingerprint, capability)
                .await
        }
        .await;
        self.finish(result, user_address, generation)
    }

    async fn request_signature(&self) -> Result<WalletSignature> {
        tracing::debug!("requesting derivation signature");
        self.wallet
            .sign_personal_message(DERIVATION_MESSAGE.as_bytes())
            .await
    }

    async fn establish(
        &self,
        notebook_id: &str,
        signature: &WalletSignature,
        user_address: &str,
        fingerprint: &DeviceFingerprint,
        reuse: Capability,
    ) -> Result<AuthorizedSession> {
        let keypair = derive_hot_wallet_keypair(signature, fingerprint, user_address)?;
        let hot_address = keypair.address();

        let live = match reuse {
            Capability::ReuseLive => {
                self.find_active_capability(&hot_address, Some(notebook_id))
                    .await?
            }
            Capability::CreateNew => None,
        };
        let capability = match live {
            Some(existing) => {
                tracing::info!(
                    hot_wallet = %hot_address,
                    capability = %existing.object_id,
                    "reusing live capability"
                );
                existing
            }
            None => {
                self.create_capability(notebook_id, user_address, &hot_address)
                    .await?
            }
        };

        self.hot_wallets.store(
            &keypair,
            fingerprint,
            capability.expires_at,
            signature,
            user_address,
        )?;

        Ok(AuthorizedSession {
            notebook_id: capability.notebook_id.clone(),
            expires_at: capability.expires_at,
            capability,
            keypair,
        })
    }

    async fn create_capability(
        &self,
        notebook_id: &str,
        user_address: &str,
        hot_address: &str,
    ) -> Result<SessionCapability> {
        let coin_type = &self.config.funding_coin_type;
        let balance = poll_until(&self.config.poll, |_| async {
            self.ledger.get_balance(user_address, coin_type).await.map(Some)
        })
        .await?
        .ok_or_else(|| {
            NotesError::Ledger(format!(
                "balance query failed after {} attempts",
                self.config.poll.max_attempts
            ))
        })?;
        if balance < u128::from(HOT_WALLET_TOKEN_FUNDING) {
            tracing::warn!(
                balance = %balance,
                required = HOT_WALLET_TOKEN_FUNDING,
                "insufficient funding"
            );
            return Err(NotesError::FundingRequired {
                coin_type: self.config.funding_coin_type.clone(),
                faucet: self.config.faucet_url.clone(),
            });
        }

        // capabilities that already exist must not satisfy the poll below
        let known: HashSet<String> = self
            .live_capabilities(hot_address)
            .await?
            .into_iter()
            .map(|capability| capability.object_id)
            .collect();

        let session_millis = i64::try_from(SESSION_DURATION.as_millis()).unwrap_or(i64::MAX);
        let transaction = LedgerTransaction::CreateSessionCapability {
            package_id: self.config.package_id.clone(),
            notebook_id: notebook_id.to_string(),
            hot_wallet_address: hot_address.to_string(),
            expires_at: now_millis().saturating_add(session_millis),
            gas_funding: HOT_WALLET_GAS_FUNDING,
            token_funding: HOT_WALLET_TOKEN_FUNDING,
            funding_coin_type: self.config.funding_coin_type.clone(),
        };
        let receipt = self.ledger.submit_transaction(&transaction).await?;
        tracing::info!(digest = %receipt.digest, hot_wallet = %hot_address, "capability submitted");

        let observed = poll_until(&self.config.poll, |_| async {
            Ok(self
                .live_capabilities(hot_address)
                .await?
                .into_iter()
                .filter(|capability| !known.contains(&capability.object_id))
                .max_by_key(|capability| capability.expires_at))
        })
        .await?;
        observed.ok_or(NotesError::CapabilityNotObserved {
            attempts: self.config.poll.max_attempts,
        })
    }

    /// The live capability owned by `hot_address` with the latest expiry,
    /// optionally restricted to one notebook.
    async fn find_active_capability(
        &self,
        hot_address: &str,
        notebook_id: Option<&str>,
    ) -> Result<Option<SessionCapability>> {
        Ok(self
            .live_capabilities(hot_address)
            .await?
            .into_iter()
            .filter(|capability| notebook_id.map_or(true, |id| capability.notebook_id == id))
            .max_by_key(|capability| capability.expires_at))
    }

    async fn live_capabilities(&self, hot_address: &str) -> Result<Vec<SessionCapability>> {
        let objects = self
            .ledger
            .get_owned_objects_by_type(hot_address, &self.config.capability_type())
            .await?;
        let now = now_millis();

        Ok(objects
            .iter()
            .filter_map(|object| match SessionCapability::from_object(object) {
                Ok(capability) => Some(capability),
                Err(err) => {
                    tracing::warn!("skipping capability: {}", err);
                    None
                }
            })
            .filter(|capability| capability.owner == hot_address && !capability.is_expired_at(now))
            .collect())
    }

    fn reusable(&self, notebook_id: &str, user_address: &str) -> Option<AuthorizedSession> {
        match &*self.read_slot() {
            Slot::Active {
                session,
                user_address: active_user,
            } if session.notebook_id == notebook_id
                && active_user == user_address
                && now_millis() < session.expires_at =>
            {
                Some(session.clone())
            }
            _ => None,
        }
    }

    fn finish(
        &self,
        result: Result<AuthorizedSession>,
        user_address: String,
        generation: u64,
    ) -> Result<AuthorizedSession> {
        match result {
            Ok(session) => {
                let active = Slot::Active {
                    session: session.clone(),
                    user_address,
                };
                if !self.commit(generation, active) {
                    tracing::warn!(
                        hot_wallet = %session.hot_wallet_address(),
                        "session revoked during authorization, discarding"
                    );
                    // the record may have been written after the revoke erased it
                    let fingerprint = self.fingerprints.derive();
                    self.hot_wallets.clear(&fingerprint)?;
                    return Err(NotesError::SessionRevoked);
                }
                tracing::info!(
                    hot_wallet = %session.hot_wallet_address(),
                    notebook = %session.notebook_id,
                    expires_at = session.expires_at,
                    "session active"
                );
                Ok(session)
            }
            Err(err) => {
                tracing::error!("session authorization failed: {}", err);
                self.commit(generation, Slot::Unauthorized);
                Err(err)
            }
        }
    }

    /// Replace the slot unless a revoke happened since `generation` was read.
    fn commit(&self, generation: u64, slot: Slot) -> bool {
        let mut guard = self.write_slot();
        if self.revocations.load(Ordering::SeqCst) != generation {
            return false;
        }
        *guard = slot;
        true
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
