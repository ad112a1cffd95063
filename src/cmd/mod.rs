// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   config   options, inis
//!   sync     init, remote, identity, sync {status|fetch|push|merge|commit}
//!   inspect  log, files, diverged, branches
//!   watch    poller loop until Ctrl+C
//! ```

pub mod config;
pub mod inspect;
pub mod sync;
pub mod watch;

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::sync::identity::{IdentityStore, JsonIdentityStore};
use crate::sync::tracker::SyncStateTracker;
use crate::sync::types::UserIdentity;

/// Open the repository at `repo` with settings from `config`.
///
/// # Errors
///
/// Returns `SyncError::NotARepository` if `repo` is not inside a working tree.
pub fn open_tracker(config: &Config, repo: &Path) -> Result<SyncStateTracker> {
    Ok(SyncStateTracker::open(repo, config.tracker_options())?)
}

/// Identity store for the tracker's repository.
#[must_use]
pub fn identity_store(config: &Config, tracker: &SyncStateTracker) -> JsonIdentityStore {
    config.identity_store(&tracker.handle().git_dir())
}

/// Saved identity, or `IdentityError::NotConfigured`.
///
/// # Errors
///
/// Returns an error if no identity is saved or the store cannot be read.
pub fn require_identity(config: &Config, tracker: &SyncStateTracker) -> Result<UserIdentity> {
    Ok(identity_store(config, tracker).require()?)
}
