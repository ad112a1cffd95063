// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git command operations using shell backend.
//!
//! ```text
//! cmd.rs --> ShellBackend --> git (index, worktree, config)
//! ```

use crate::error::LcResult;
use std::path::Path;

use super::backend::{GitMutation, ShellBackend};
use super::status::{parse_name_status, parse_status};
use crate::sync::types::FileStatusEntry;

/// Initialize a new repository.
///
/// # Errors
///
/// Returns a `GitError` if repository initialization fails.
pub fn init_repo(path: &Path) -> LcResult<()> {
    ShellBackend::init_repo(path)
}

/// Add a remote.
///
/// # Errors
///
/// Returns a `GitError` if the remote cannot be added.
pub fn add_remote(repo_path: &Path, name: &str, url: &str) -> LcResult<()> {
    ShellBackend::add_remote(repo_path, name, url)
}

/// Remove a remote and its tracking refs.
///
/// # Errors
///
/// Returns a `GitError` if the remote does not exist.
pub fn remove_remote(repo_path: &Path, name: &str) -> LcResult<()> {
    ShellBackend::remove_remote(repo_path, name)
}

/// URL of a remote (None if no such remote).
///
/// # Errors
///
/// Returns a `GitError` if the config cannot be read.
pub fn remote_url(repo_path: &Path, name: &str) -> LcResult<Option<String>> {
    ShellBackend::get_config(repo_path, &format!("remote.{name}.url"))
}

/// Set git config value.
///
/// # Errors
///
/// Returns a `GitError` if the config value cannot be set.
pub fn set_config(repo_path: &Path, key: &str, value: &str) -> LcResult<()> {
    ShellBackend::set_config(repo_path, key, value)
}

/// Read git config value.
///
/// # Errors
///
/// Returns a `GitError` if the config cannot be read.
pub fn get_config(repo_path: &Path, key: &str) -> LcResult<Option<String>> {
    ShellBackend::get_config(repo_path, key)
}

/// Working-tree status relative to HEAD, ignored files excluded.
///
/// # Errors
///
/// Returns a `GitError` if `git status` fails.
pub fn file_status(repo_path: &Path) -> LcResult<Vec<FileStatusEntry>> {
    ShellBackend::status_porcelain(repo_path).map(|raw| parse_status(&raw))
}

/// Files changed between two commits.
///
/// # Errors
///
/// Returns a `GitError` if `git diff` fails.
pub fn changed_files(repo_path: &Path, from: &str, to: &str) -> LcResult<Vec<FileStatusEntry>> {
    ShellBackend::diff_name_status(repo_path, from, to).map(|raw| parse_name_status(&raw))
}

/// Paths with unresolved merge conflicts.
///
/// # Errors
///
/// Returns a `GitError` if `git diff` fails.
pub fn unmerged_paths(repo_path: &Path) -> LcResult<Vec<String>> {
    ShellBackend::unmerged_paths(repo_path)
}

/// Local branch names.
///
/// # Errors
///
/// Returns a `GitError` if `git for-each-ref` fails.
pub fn local_branches(repo_path: &Path) -> LcResult<Vec<String>> {
    ShellBackend::local_branches(repo_path)
}

/// Stage every working-tree change.
///
/// # Errors
///
/// Returns a `GitError` if staging or committing fails.
pub fn stage_all(repo_path: &Path) -> LcResult<()> {
    ShellBackend::stage_all(repo_path)
}

/// Commit the index.
///
/// # Errors
///
/// Returns a `GitError` if `git commit` fails.
pub fn commit(repo_path: &Path, message: &str, name: &str, email: &str) -> LcResult<()> {
    ShellBackend::commit(repo_path, message, name, email)
}

/// Merge a ref into HEAD; false means conflicts were left in the tree.
///
/// # Errors
///
/// Returns a `GitError` if the merge fails without conflicts.
pub fn merge(repo_path: &Path, what: &str, name: &str, email: &str) -> LcResult<bool> {
    ShellBackend::merge(repo_path, what, name, email)
}
