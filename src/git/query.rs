// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only repository questions answered in-process.
//!
//! ```text
//! query.rs --> GixBackend --> .git/ (no subprocess)
//! ```

use crate::error::LcResult;
use std::path::Path;

use super::backend::{GitQuery, GixBackend};

/// Whether `path` is inside a git repository (searching upwards).
#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    GixBackend::is_git_repo(path)
}

/// Branch HEAD points at, or None when detached.
///
/// # Errors
///
/// Returns a `GitError` if no repository contains `path` or HEAD cannot be
/// read.
pub fn current_branch(path: &Path) -> LcResult<Option<String>> {
    GixBackend::current_branch(path)
}

/// Whether the working tree differs from HEAD, untracked files included.
///
/// # Errors
///
/// Returns a `GitError` if no repository contains `path` or the status walk
/// fails.
pub fn has_uncommitted_changes(path: &Path) -> LcResult<bool> {
    GixBackend::has_uncommitted_changes(path)
}
