// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! -C DIR            ← repository (any path inside the working tree)
//! --config FILE     ← additional config files (can repeat)
//! --log-level N     ← console verbosity (0-6)
//! --file-log-level  ← file verbosity (falls back to --log-level)
//! --log-file FILE   ← global.log_file override
//! --remote NAME     ← remote.name override
//! --timeout SECS    ← sync.network_timeout_secs override
//!
//! Precedence: CLI flags > LCSYNC_* env > --config > lcsync.toml > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

/// Global options available for all commands.
#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// Repository to operate on.
    #[arg(short = 'C', long = "repo", value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times; later files win.
    #[arg(long = "config", value_name = "FILE", action = clap::ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// File log level, overrides --log-level for the log file.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Name of the remote to synchronize with.
    #[arg(long = "remote", value_name = "NAME")]
    pub remote: Option<String>,

    /// Seconds before fetch or push is abandoned.
    #[arg(long = "timeout", value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            configs: Vec::new(),
            log_level: None,
            file_log_level: None,
            log_file: None,
            remote: None,
            timeout: None,
        }
    }
}

impl GlobalOptions {
    /// Converts command-line options to configuration overrides
    /// (dotted key, value).
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<(&'static str, config::Value)> {
        let mut overrides: Vec<(&'static str, config::Value)> = Vec::new();

        if let Some(level) = self.log_level {
            overrides.push(("global.output_log_level", i64::from(level).into()));
        }

        // file_log_level falls back to log_level if not specified
        if let Some(level) = self.file_log_level.or(self.log_level) {
            overrides.push(("global.file_log_level", i64::from(level).into()));
        }

        if let Some(ref path) = self.log_file {
            overrides.push(("global.log_file", path.display().to_string().into()));
        }

        if let Some(ref remote) = self.remote {
            overrides.push(("remote.name", remote.clone().into()));
        }

        if let Some(secs) = self.timeout {
            overrides.push((
                "sync.network_timeout_secs",
                i64::try_from(secs).unwrap_or(i64::MAX).into(),
            ));
        }

        overrides
    }
}
