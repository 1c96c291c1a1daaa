//! Application context for the Notes CLI.
//!
//! Bundles CLI arguments with lazily loaded configuration and the device
//! services built on top of the local store.

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::unsync::OnceCell;

use notes_core::storage::{KeyValueStore, SqliteStore};
use notes_core::{DeviceProfile, FingerprintService, HotWalletStore};

use crate::cli::Cli;
use crate::config::{read_config, NotesConfig};

use super::resolver::{resolve_config_path, resolve_store_path};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<NotesConfig>,
    store: OnceCell<Arc<dyn KeyValueStore>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            store: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&NotesConfig> {
        self.config
            .get_or_try_init(|| read_config(&resolve_config_path(self.cli)?))
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        resolve_store_path(self.cli, self.config()?)
    }

    /// Open the device store, creating it on first use.
    pub fn store(&self) -> anyhow::Result<Arc<dyn KeyValueStore>> {
        let store = self.store.get_or_try_init(|| -> anyhow::Result<_> {
            let path = self.store_path()?;
            let store = SqliteStore::open(&path)?;
            tracing::debug!(path = %path.display(), "opened device store");
            Ok(Arc::new(store) as Arc<dyn KeyValueStore>)
        })?;
        Ok(store.clone())
    }

    pub fn fingerprints(&self) -> anyhow::Result<FingerprintService> {
        Ok(FingerprintService::new(self.store()?, DeviceProfile::current()))
    }

    pub fn hot_wallets(&self) -> anyhow::Result<HotWalletStore> {
        Ok(HotWalletStore::new(self.store()?))
    }
}
