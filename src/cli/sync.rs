// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync, inspection and watch command arguments.
//!
//! # Subcommands
//!
//! ```text
//! sync status [--json]      → state, ahead/behind, dirty
//! sync fetch                → update tracking refs
//! sync push                 → guarded push
//! sync merge                → merge tracking branch (exit 2 on conflicts)
//! sync commit MESSAGE       → stage all and commit
//! log [-b BRANCH] [-n N]    → newest-first commits
//! watch [--interval SECS]   → poll until Ctrl+C
//! ```

use clap::{Args, Subcommand};

/// Arguments for the `sync` command.
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Sync subcommand.
    #[command(subcommand)]
    pub subcommand: SyncSubcommand,
}

/// Sync subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum SyncSubcommand {
    /// Shows how HEAD relates to its upstream.
    Status(StatusArgs),

    /// Downloads remote commits without touching the working tree.
    Fetch,

    /// Pushes the current branch, refusing when the remote has unseen commits.
    Push,

    /// Merges the tracking branch into HEAD.
    Merge,

    /// Stages every change and commits it.
    Commit(CommitArgs),
}

/// Arguments for sync status subcommand.
#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Print machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for sync commit subcommand.
#[derive(Debug, Clone, Args)]
pub struct CommitArgs {
    /// Commit message.
    #[arg(value_name = "MESSAGE")]
    pub message: String,
}

/// Arguments for the `log` command.
#[derive(Debug, Clone, Args)]
pub struct LogArgs {
    /// Branch to list (defaults to HEAD).
    #[arg(short = 'b', long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Maximum number of commits (defaults to `sync.log_limit`).
    #[arg(short = 'n', long, value_name = "LIMIT")]
    pub limit: Option<usize>,
}

/// Arguments for the `watch` command.
#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Seconds between polls (defaults to `sync.poll_interval_secs`).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Only refresh local state, never fetch.
    #[arg(long = "no-fetch")]
    pub no_fetch: bool,

    /// Print one JSON object per poll.
    #[arg(long)]
    pub json: bool,
}
