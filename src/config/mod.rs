// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for lcsync.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. lcsync.toml (cwd, optional)
//! 3. --config FILE (each, in order)
//! 4. LCSYNC_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! LCSYNC_REMOTE__NAME=upstream           → remote.name = "upstream"
//! LCSYNC_SYNC__POLL_INTERVAL_SECS=5      → sync.poll_interval_secs = 5
//! LCSYNC_GLOBAL__OUTPUT_LOG_LEVEL=4      → global.output_log_level = 4
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::sync::identity::JsonIdentityStore;
use crate::sync::tracker::TrackerOptions;

use loader::ConfigLoader;
use types::{GlobalConfig, IdentityConfig, RemoteSettings, SyncConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Tracked remote.
    pub remote: RemoteSettings,
    /// Polling and network settings.
    pub sync: SyncConfig,
    /// Identity store location.
    pub identity: IdentityConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lcsync::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("lcsync.toml")
    ///     .with_env_prefix("LCSYNC")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Reject values the tracker cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty remote name or a zero
    /// interval/timeout.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let invalid = |section: &str, key: &str, message: &str| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        };

        let name = self.remote.name.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(invalid(
                "remote",
                "name",
                "must be a non-empty name without whitespace",
            ));
        }
        if self.sync.poll_interval_secs == 0 {
            return Err(invalid("sync", "poll_interval_secs", "must be at least 1"));
        }
        if self.sync.network_timeout_secs == 0 {
            return Err(invalid("sync", "network_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sync.poll_interval_secs)
    }

    #[must_use]
    pub const fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.network_timeout_secs)
    }

    /// Commit log cap (None for the whole history).
    #[must_use]
    pub const fn log_limit(&self) -> Option<usize> {
        match self.sync.log_limit {
            0 => None,
            n => Some(n),
        }
    }

    /// Log file path, if file logging is enabled.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        let path = self.global.log_file.as_path();
        (!path.as_os_str().is_empty()).then_some(path)
    }

    /// Tracker settings derived from `[remote]` and `[sync]`.
    #[must_use]
    pub fn tracker_options(&self) -> TrackerOptions {
        TrackerOptions::builder()
            .with_remote(self.remote.name.trim())
            .with_network_timeout(self.network_timeout())
            .build()
    }

    /// Identity store for a repository whose git directory is `git_dir`.
    #[must_use]
    pub fn identity_store(&self, git_dir: &Path) -> JsonIdentityStore {
        if self.identity.file.as_os_str().is_empty() {
            JsonIdentityStore::in_git_dir(git_dir)
        } else {
            JsonIdentityStore::new(&self.identity.file)
        }
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_remote_options(&mut options);
        self.format_sync_options(&mut options);
        options.insert(
            "identity.file".into(),
            self.identity.file.display().to_string(),
        );

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            u8::from(self.global.output_log_level).to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            u8::from(self.global.file_log_level).to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global.log_file.display().to_string(),
        );
        options.insert("global.log_json".into(), self.global.log_json.to_string());
    }

    fn format_remote_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("remote.name".into(), self.remote.name.clone());
        options.insert("remote.url".into(), self.remote.url.clone());
    }

    fn format_sync_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "sync.poll_interval_secs".into(),
            self.sync.poll_interval_secs.to_string(),
        );
        options.insert(
            "sync.network_timeout_secs".into(),
            self.sync.network_timeout_secs.to_string(),
        );
        options.insert("sync.log_limit".into(), self.sync.log_limit.to_string());
        options.insert(
            "sync.fetch_on_poll".into(),
            self.sync.fetch_on_poll.to_string(),
        );
    }
}
