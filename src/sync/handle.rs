// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exclusive handle to a local working copy.

use crate::error::{GixError, LcResult, SyncError};
use crate::git::cmd::init_repo;
use anyhow::Context as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An open repository with a working tree.
///
/// Holds the thread-safe gix handle; every query takes a fresh thread-local
/// view so refs written by the git CLI are always seen.
pub struct RepositoryHandle {
    repo: gix::ThreadSafeRepository,
    workdir: PathBuf,
}

impl std::fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

impl RepositoryHandle {
    /// Open the repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotARepository` if `path` is not inside a git
    /// working tree, or `GixError::BareRepository` for a bare repository.
    pub fn open(path: &Path) -> LcResult<Self> {
        let not_a_repo = || SyncError::NotARepository {
            path: path.display().to_string(),
        };
        let absolute = std::fs::canonicalize(path).map_err(|_| not_a_repo())?;
        let repo = gix::discover(&absolute).map_err(|e| {
            debug!(path = %absolute.display(), error = %e, "discover failed");
            not_a_repo()
        })?;
        let workdir = repo
            .workdir()
            .ok_or(GixError::BareRepository)?
            .to_path_buf();

        debug!(workdir = %workdir.display(), "opened repository");
        Ok(Self {
            repo: repo.into_sync(),
            workdir,
        })
    }

    /// Initialize a repository at `path` (creating the directory) and open it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `git init` fails.
    pub fn init(path: &Path) -> crate::error::Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        init_repo(path).with_context(|| format!("failed to init {}", path.display()))?;
        info!(path = %path.display(), "initialized repository");
        Ok(Self::open(path)?)
    }

    /// Fresh thread-local view of the repository.
    #[must_use]
    pub fn repo(&self) -> gix::Repository {
        self.repo.to_thread_local()
    }

    /// Root of the working tree.
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The `.git` directory (or the linked worktree's git directory).
    #[must_use]
    pub fn git_dir(&self) -> PathBuf {
        self.repo().git_dir().to_path_buf()
    }

    /// Whether a merge stopped part-way and awaits a concluding commit.
    #[must_use]
    pub fn merge_in_progress(&self) -> bool {
        self.repo().git_dir().join("MERGE_HEAD").exists()
    }
}
