//! Configuration handling for the portal client
//!
//! Credentials live in a TOML file rather than in the source tree. The
//! first account entry is a reserved template slot that the random draw
//! never selects (see [`crate::portal::login::pick_account`]), so a
//! usable config carries at least two entries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::portal::session::RetryPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// One campus network credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Retry behavior of the login loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum login cycles before giving up. 0 means retry forever.
    #[serde(default)]
    pub max_attempts: u32,
    /// Delay between failed cycles, in seconds. 0 means retry
    /// immediately; the per-request timeouts are the only pacing then.
    #[serde(default)]
    pub delay_secs: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
            retry_delay: Duration::from_secs(self.delay_secs),
        }
    }
}

/// Pacing of the `watch` keep-alive loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Probe interval while the connection is up, in seconds.
    #[serde(default = "default_online_interval")]
    pub online_interval_secs: u64,
    /// Probe interval while the connection is down, in seconds.
    #[serde(default = "default_offline_interval")]
    pub offline_interval_secs: u64,
    /// Minimum spacing between two login attempts, in seconds.
    #[serde(default = "default_login_cooldown")]
    pub login_cooldown_secs: u64,
}

fn default_online_interval() -> u64 {
    30
}

fn default_offline_interval() -> u64 {
    15
}

fn default_login_cooldown() -> u64 {
    120
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            online_interval_secs: default_online_interval(),
            offline_interval_secs: default_offline_interval(),
            login_cooldown_secs: default_login_cooldown(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accounts: vec![
                // Slot 0 is never drawn; keep it as the template row.
                Account {
                    account: "template-do-not-remove".to_string(),
                    password: String::new(),
                },
                Account {
                    account: "202300000000".to_string(),
                    password: "changeme".to_string(),
                },
            ],
            retry: RetryConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default per-user config location, e.g.
    /// `~/.config/csust-portal/config.toml` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("csust-portal").join("config.toml"))
    }

    /// The account list used for random selection.
    ///
    /// Requires the reserved slot 0 plus at least one drawable entry.
    pub fn selectable_accounts(&self) -> Result<&[Account], ConfigError> {
        if self.accounts.len() < 2 {
            return Err(ConfigError::Invalid(
                "account list needs the reserved first entry plus at least one \
                 selectable account; run `csust-portal init` for a template"
                    .to_string(),
            ));
        }
        Ok(&self.accounts)
    }

    pub fn find_account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.account == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::default();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.accounts, config.accounts);
        assert_eq!(loaded.watch.online_interval_secs, 30);
        assert_eq!(loaded.retry.max_attempts, 0);
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let toml = r#"
            [[accounts]]
            account = "reserved"
            password = ""

            [[accounts]]
            account = "202312345678"
            password = "hunter2"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.accounts.len(), 2);
        assert_eq!(config.watch.offline_interval_secs, 15);
        assert_eq!(config.watch.login_cooldown_secs, 120);
        assert_eq!(config.retry.delay_secs, 0);
    }

    #[test]
    fn test_selectable_accounts_requires_two_entries() {
        let mut config = Config::default();
        assert!(config.selectable_accounts().is_ok());

        config.accounts.truncate(1);
        assert!(matches!(
            config.selectable_accounts(),
            Err(ConfigError::Invalid(_))
        ));

        config.accounts.clear();
        assert!(config.selectable_accounts().is_err());
    }

    #[test]
    fn test_retry_policy_mapping() {
        let retry = RetryConfig {
            max_attempts: 0,
            delay_secs: 0,
        };
        let policy = retry.policy();
        assert_eq!(policy.max_attempts, None);
        assert!(policy.retry_delay.is_zero());

        let retry = RetryConfig {
            max_attempts: 3,
            delay_secs: 2,
        };
        let policy = retry.policy();
        assert_eq!(policy.max_attempts, Some(3));
        assert_eq!(policy.retry_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_find_account() {
        let config = Config::default();
        assert!(config.find_account("202300000000").is_some());
        assert!(config.find_account("nobody").is_none());
    }
}
