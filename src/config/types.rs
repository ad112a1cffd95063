// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration section types.
//!
//! ```text
//! Config: GlobalConfig, RemoteSettings, SyncConfig, IdentityConfig
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogLevel;
use crate::sync::types::DEFAULT_REMOTE;

/// Global options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; empty disables file logging.
    pub log_file: PathBuf,
    /// Write the log file as JSON lines.
    pub log_json: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: PathBuf::new(),
            log_json: false,
        }
    }
}

/// Remote the tracker synchronizes with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSettings {
    /// Remote name.
    pub name: String,
    /// URL applied by `remote set` when none is given; empty leaves the
    /// repository's remote configuration alone.
    pub url: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_REMOTE.to_string(),
            url: String::new(),
        }
    }
}

/// Polling and network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Seconds between polls in `watch`.
    pub poll_interval_secs: u64,
    /// Seconds before fetch or push is abandoned.
    pub network_timeout_secs: u64,
    /// Default commit log length; 0 shows the whole history.
    pub log_limit: usize,
    /// Fetch on every poll (otherwise only local state is refreshed).
    pub fetch_on_poll: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            network_timeout_secs: 30,
            log_limit: 50,
            fetch_on_poll: true,
        }
    }
}

/// Where the user identity is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Identity file; empty uses `<git-dir>/lcsync/identity.json`.
    pub file: PathBuf,
}
