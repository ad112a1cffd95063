// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote and identity command arguments.
//!
//! # Subcommands
//!
//! ```text
//! remote set [URL]          → add/update remote, set branch upstream
//! remote show               → name and URL of the tracked remote
//! identity set -n NAME -e EMAIL
//! identity show
//! ```

use clap::{Args, Subcommand};

/// Arguments for the `remote` command.
#[derive(Debug, Clone, Args)]
pub struct RemoteArgs {
    /// Remote subcommand.
    #[command(subcommand)]
    pub subcommand: RemoteSubcommand,
}

/// Remote subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum RemoteSubcommand {
    /// Adds or updates the remote and makes it the current branch's upstream.
    Set(RemoteSetArgs),

    /// Shows the tracked remote.
    Show,
}

/// Arguments for remote set subcommand.
#[derive(Debug, Clone, Args)]
pub struct RemoteSetArgs {
    /// Remote URL; defaults to `remote.url` from the configuration.
    #[arg(value_name = "URL")]
    pub url: Option<String>,
}

/// Arguments for the `identity` command.
#[derive(Debug, Clone, Args)]
pub struct IdentityArgs {
    /// Identity subcommand.
    #[command(subcommand)]
    pub subcommand: IdentitySubcommand,
}

/// Identity subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum IdentitySubcommand {
    /// Saves the name and email used for commits and merges.
    Set(IdentitySetArgs),

    /// Shows the saved identity.
    Show,
}

/// Arguments for identity set subcommand.
#[derive(Debug, Clone, Args)]
pub struct IdentitySetArgs {
    /// Author and committer name.
    #[arg(short = 'n', long, required = true)]
    pub name: String,

    /// Author and committer email.
    #[arg(short = 'e', long, required = true)]
    pub email: String,
}
