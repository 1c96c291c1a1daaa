use std::path::{Path, PathBuf};
use std::time::Duration;

use notes_core::session::{PollPolicy, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOG_FILTER;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    pub storage: StorageSection,
    pub session: SessionSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub package_id: Option<String>,
    pub funding_coin_type: Option<String>,
    pub faucet_url: Option<String>,
    pub poll_max_attempts: u32,
    pub poll_base_delay_ms: u64,
    pub poll_max_delay_ms: u64,
    pub monitor_interval_seconds: u64,
    pub warning_threshold_seconds: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            package_id: None,
            funding_coin_type: None,
            faucet_url: None,
            poll_max_attempts: 8,
            poll_base_delay_ms: 500,
            poll_max_delay_ms: 8_000,
            monitor_interval_seconds: 60,
            warning_threshold_seconds: 600,
        }
    }
}

impl SessionSection {
    /// Build the core session settings. `None` until the package, coin type
    /// and faucet are all configured.
    pub fn to_session_config(&self) -> Option<SessionConfig> {
        let mut config = SessionConfig::new(
            self.package_id.as_deref()?,
            self.funding_coin_type.as_deref()?,
            self.faucet_url.as_deref()?,
        );
        config.poll = PollPolicy {
            max_attempts: self.poll_max_attempts.max(1),
            base_delay: Duration::from_millis(self.poll_base_delay_ms),
            max_delay: Duration::from_millis(self.poll_max_delay_ms),
        };
        config.monitor_interval = Duration::from_secs(self.monitor_interval_seconds.max(1));
        config.warning_threshold = Duration::from_secs(self.warning_threshold_seconds);
        Some(config)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("device.sqlite3"))
}

/// Read the config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> anyhow::Result<NotesConfig> {
    if !path.exists() {
        return Ok(NotesConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

/// Expand a leading `~/` against `$HOME`.
pub fn expand_home(path: &str) -> anyhow::Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("notes"));
        }
    }
    Ok(home_dir()?.join(".config").join("notes"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("notes"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("notes"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: NotesConfig = toml::from_str("").unwrap();
        assert!(config.storage.path.is_none());
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.session.poll_max_attempts, 8);
        assert!(config.session.to_session_config().is_none());
    }

    #[test]
    fn test_session_section_builds_core_config() {
        let config: NotesConfig = toml::from_str(
            r#"
[session]
package_id = "0xabc"
funding_coin_type = "0xabc::wal::WAL"
faucet_url = "https://faucet.test"
poll_max_attempts = 3
poll_base_delay_ms = 100
"#,
        )
        .unwrap();

        let session = config.session.to_session_config().unwrap();
        assert_eq!(session.capability_type(), "0xabc::session::SessionCap");
        assert_eq!(session.poll.max_attempts, 3);
        assert_eq!(session.poll.base_delay, Duration::from_millis(100));
        assert_eq!(session.poll.max_delay, Duration::from_secs(8));
        assert_eq!(session.warning_threshold, Duration::from_secs(600));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_config(&dir.path().join("absent.toml")).unwrap();
        assert!(config.session.package_id.is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage\npath = 1").unwrap();
        assert!(read_config(&path).is_err());
    }
}
