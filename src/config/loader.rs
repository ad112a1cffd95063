// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading from multiple sources.
//!
//! # Loader Pipeline
//!
//! ```text
//! ConfigLoader::new()
//!   .add_toml_file_optional("lcsync.toml")
//!   .add_toml_file(--config)...
//!   .with_env_prefix("LCSYNC")
//!   .set(key, value)            CLI flags
//!        |
//!        v
//!    build() --> Config (validated)
//! ```

use config::{File, FileFormat};
use std::fmt;
use std::path::{Path, PathBuf};

use super::Config;
use crate::error::Result;

/// Kind of source a loaded TOML document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config FILE`; must exist.
    Required,
    /// `lcsync.toml`; skipped when absent.
    Optional,
    /// Inline TOML string.
    Inline,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Required => "file",
            Self::Optional => "optional",
            Self::Inline => "string",
        })
    }
}

/// Builder for loading configuration from multiple sources.
///
/// Sources added later win; environment variables beat every file and
/// overrides from [`ConfigLoader::set`] beat everything.
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: Option<String>,
    sources: Vec<(ConfigSource, PathBuf)>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            sources: Vec::new(),
        }
    }

    fn add_file(mut self, path: &Path, source: ConfigSource) -> Self {
        let required = source == ConfigSource::Required;
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(required));
        if required || path.exists() {
            self.sources.push((source, path.to_path_buf()));
        }
        self
    }

    /// Adds a TOML file that must exist; `build()` fails otherwise.
    #[must_use]
    pub fn add_toml_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_file(path.as_ref(), ConfigSource::Required)
    }

    /// Adds a TOML file that is silently skipped when absent.
    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_file(path.as_ref(), ConfigSource::Optional)
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.sources
            .push((ConfigSource::Inline, PathBuf::from("<string>")));
        self
    }

    /// Read `PREFIX_SECTION__KEY` variables, e.g. `LCSYNC_SYNC__LOG_LIMIT`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Sets a configuration override.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid config path.
    pub fn set<T: Into<config::Value>>(mut self, key: &str, value: T) -> Result<Self> {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(|e| anyhow::anyhow!("config error: {e}"))?;
        Ok(self)
    }

    /// Merge every source into a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required file is missing, a file is not valid
    /// TOML, a key is unknown, a value has the wrong type, or
    /// [`Config::validate`] rejects the result.
    pub fn build(self) -> Result<Config> {
        let mut builder = self.builder;
        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Sources that contributed a document, in load order.
    #[must_use]
    pub fn sources(&self) -> &[(ConfigSource, PathBuf)] {
        &self.sources
    }

    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, (source, path))| format!("{}. [{source}] {}", i + 1, path.display()))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
