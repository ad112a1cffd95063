// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only commands: `log`, `files`, `diverged`, `branches`.

use std::path::Path;

use super::open_tracker;
use crate::cli::sync::LogArgs;
use crate::config::Config;
use crate::error::Result;
use crate::sync::types::{CommitSummary, DivergentFiles, FileStatusEntry};

/// Handler for `log`.
///
/// # Errors
///
/// Returns `SyncError::BranchNotFound` for an unknown branch, or a traversal
/// error from the commit walk.
pub fn run_log_command(args: &LogArgs, config: &Config, repo: &Path) -> Result<()> {
    let tracker = open_tracker(config, repo)?;
    let log = tracker.list_commits(args.branch.as_deref(), args.limit.or(config.log_limit()))?;
    for commit in log.iter()? {
        println!("{}", format_commit(&commit?));
    }
    Ok(())
}

/// Handler for `files`.
///
/// # Errors
///
/// Returns an error if `git status` fails.
pub fn run_files_command(config: &Config, repo: &Path) -> Result<()> {
    let tracker = open_tracker(config, repo)?;
    let entries = tracker.list_file_status()?;
    if entries.is_empty() {
        println!("Working tree clean");
    }
    entries.iter().for_each(|e| println!("{}", format_entry(e)));
    Ok(())
}

/// Handler for `diverged`.
///
/// # Errors
///
/// Returns `NoUpstream`, `UnbornHead` or `NoMergeBase` when there is nothing
/// to compare against.
pub fn run_diverged_command(config: &Config, repo: &Path) -> Result<()> {
    let tracker = open_tracker(config, repo)?;
    let files = tracker.compute_divergent_files()?;
    format_divergent(&files)
        .iter()
        .for_each(|line| println!("{line}"));
    Ok(())
}

/// Handler for `branches`. The current branch is marked with `*`.
///
/// # Errors
///
/// Returns an error if the branch list cannot be read.
pub fn run_branches_command(config: &Config, repo: &Path) -> Result<()> {
    let tracker = open_tracker(config, repo)?;
    let current = tracker.current_branch().ok();
    for branch in tracker.list_branches()? {
        let mark = if current.as_deref() == Some(branch.as_str()) {
            '*'
        } else {
            ' '
        };
        println!("{mark} {branch}");
    }
    Ok(())
}

fn format_commit(commit: &CommitSummary) -> String {
    format!("{} {} {}", commit.short_id, commit.author, commit.subject())
}

fn format_entry(entry: &FileStatusEntry) -> String {
    format!("{} {}", entry.state.marker(), entry.path)
}

fn format_divergent(files: &DivergentFiles) -> Vec<String> {
    if files.is_empty() {
        return vec!["No changes on either side since the merge base".to_string()];
    }

    let mut lines = Vec::new();
    for (title, entries) in [("local", &files.local), ("remote", &files.remote)] {
        lines.push(format!("{title}:"));
        if entries.is_empty() {
            lines.push("  (none)".to_string());
        }
        lines.extend(entries.iter().map(|e| format!("  {}", format_entry(e))));
    }

    let overlapping = files.overlapping();
    if !overlapping.is_empty() {
        lines.push("changed on both sides:".to_string());
        lines.extend(overlapping.iter().map(|p| format!("  {p}")));
    }
    lines
}
