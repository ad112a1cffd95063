// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for lcsync using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! lcsync [global options] <command>
//! version | options | inis | init [--remote URL]
//! remote {set|show}
//! identity {set|show}
//! sync {status|fetch|push|merge|commit}
//! log | files | diverged | branches
//! watch
//! ```

pub mod global;
pub mod remote;
pub mod sync;


use crate::cli::global::GlobalOptions;
use crate::cli::remote::{IdentityArgs, RemoteArgs};
use crate::cli::sync::{LogArgs, SyncArgs, WatchArgs};
use clap::{Args, Parser, Subcommand};

/// Local Collaborate - git sync state tracker
///
/// Shows whether a working copy is ahead of, behind or diverged from its
/// remote, and performs the fetch/merge/commit/push round trip safely.
#[derive(Debug, Parser)]
#[command(
    name = "lcsync",
    author,
    version,
    about = "Local Collaborate - git sync state tracker",
    long_about = "lcsync Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Tracks how a git working copy relates to its remote and\n\
                  performs fetch, merge, commit and push without surprises.\n\
                  A push is refused while the remote has commits you have not\n\
                  merged. See `lcsync <command> --help` for more information.",
    after_help = "EXIT CODES:\n\n\
                  0  success\n\
                  1  push rejected (remote ahead) or any other error\n\
                  2  merge stopped with conflicts\n\
                  3  network failure or timeout\n\n\
                  CONFIG FILES:\n\n\
                  lcsync reads `lcsync.toml` from the current directory if it\n\
                  exists, then every --config file in order, then LCSYNC_*\n\
                  environment variables (e.g. LCSYNC_SYNC__POLL_INTERVAL_SECS=5)."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the config files that were loaded.
    Inis,

    /// Initializes a repository at -C (recovery for "not a git repository").
    Init(InitArgs),

    /// Manages the tracked remote.
    Remote(RemoteArgs),

    /// Manages the commit identity.
    Identity(IdentityArgs),

    /// Fetch, push, merge, commit and status.
    Sync(SyncArgs),

    /// Lists commits, newest first.
    Log(LogArgs),

    /// Lists working-tree changes.
    Files,

    /// Lists files changed locally and remotely since the merge base.
    Diverged,

    /// Lists local branches.
    Branches,

    /// Polls sync state until interrupted.
    Watch(WatchArgs),
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Remote URL to configure right away.
    #[arg(long = "remote-url", value_name = "URL")]
    pub remote_url: Option<String>,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
