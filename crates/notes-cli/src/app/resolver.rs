//! Path resolution for config and store files.

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{default_config_path, default_store_path, expand_home, NotesConfig};

/// Resolve the config file path: `--config` / `NOTES_CONFIG`, then XDG.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path(),
    }
}

/// Resolve the device store path: `--store` / `NOTES_STORE`, then config, then XDG.
pub fn resolve_store_path(cli: &Cli, config: &NotesConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = &cli.store {
        return Ok(path.clone());
    }
    match config.storage.path.as_deref() {
        Some(path) if !path.trim().is_empty() => expand_home(path),
        _ => default_store_path(),
    }
}
