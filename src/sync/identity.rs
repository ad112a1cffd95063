// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persisted author identity.
//!
//! ```text
//! IdentityStore
//!   JsonIdentityStore    <git-dir>/lcsync/identity.json (atomic write)
//!   MemoryIdentityStore  in-process
//! ```

use serde::{Deserialize, Serialize};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::types::UserIdentity;
use crate::error::IdentityError;

/// Load/save contract for the user's name and email.
pub trait IdentityStore: Send + Sync {
    /// Saved identity, if any.
    ///
    /// # Errors
    ///
    /// Returns an `IdentityError` if the store exists but cannot be read.
    fn load(&self) -> Result<Option<UserIdentity>, IdentityError>;

    /// Replace the saved identity.
    ///
    /// # Errors
    ///
    /// Returns an `IdentityError` if the store cannot be written.
    fn save(&self, identity: &UserIdentity) -> Result<(), IdentityError>;

    /// Saved identity, or `NotConfigured`.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::NotConfigured` if nothing has been saved.
    fn require(&self) -> Result<UserIdentity, IdentityError> {
        self.load()?.ok_or(IdentityError::NotConfigured)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdentityFile {
    name: String,
    email: String,
}

/// Identity stored as a small JSON file.
#[derive(Debug, Clone)]
pub struct JsonIdentityStore {
    path: PathBuf,
}

impl JsonIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location inside a repository's git directory.
    #[must_use]
    pub fn in_git_dir(git_dir: &Path) -> Self {
        Self::new(git_dir.join("lcsync").join("identity.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, message: impl std::fmt::Display) -> IdentityError {
        IdentityError::Write {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }
}

impl IdentityStore for JsonIdentityStore {
    fn load(&self) -> Result<Option<UserIdentity>, IdentityError> {
        let read_error = |message: String| IdentityError::Read {
            path: self.path.display().to_string(),
            message,
        };

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(read_error(e.to_string())),
        };
        let file: IdentityFile =
            serde_json::from_str(&content).map_err(|e| read_error(e.to_string()))?;
        UserIdentity::new(file.name, file.email).map(Some)
    }

    fn save(&self, identity: &UserIdentity) -> Result<(), IdentityError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;

        let file = IdentityFile {
            name: identity.name().to_string(),
            email: identity.email().to_string(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| self.write_error(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| self.write_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        debug!(path = %self.path.display(), %identity, "saved identity");
        Ok(())
    }
}

/// Identity kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    identity: Mutex<Option<UserIdentity>>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn with_identity(identity: UserIdentity) -> Self {
        Self {
            identity: Mutex::new(Some(identity)),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<UserIdentity>, IdentityError> {
        Ok(self
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, identity: &UserIdentity) -> Result<(), IdentityError> {
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        Ok(())
    }
}
