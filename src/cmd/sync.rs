// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `init`, `remote`, `identity` and `sync` commands.
//!
//! ```text
//! sync status   divergence + dirty flag, text or JSON
//! sync fetch    --> tracker.fetch   (exit 3 on network failure)
//! sync push     --> tracker.push    (exit 1 when remote is ahead)
//! sync merge    --> tracker.merge   (exit 2 on conflicts)
//! sync commit   --> tracker.commit
//! ```

use anyhow::Context as _;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use super::{identity_store, open_tracker, require_identity};
use crate::cli::InitArgs;
use crate::cli::remote::{IdentityArgs, IdentitySubcommand, RemoteArgs, RemoteSubcommand};
use crate::cli::sync::{SyncArgs, SyncSubcommand};
use crate::config::Config;
use crate::error::{ConfigError, Result, SyncError};
use crate::git::backend::ShellBackend;
use crate::git::query;
use crate::sync::handle::RepositoryHandle;
use crate::sync::identity::IdentityStore;
use crate::sync::tracker::SyncStateTracker;
use crate::sync::types::{Divergence, MergeOutcome, RemoteConfig, SyncState, UserIdentity};

/// Machine-readable `sync status` output.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub branch: Option<String>,
    pub remote: Option<RemoteConfig>,
    #[serde(flatten)]
    pub divergence: Divergence,
    pub dirty: bool,
}

impl StatusReport {
    /// Collect the report for `tracker`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository state cannot be read.
    pub fn collect(tracker: &SyncStateTracker) -> Result<Self> {
        Ok(Self {
            branch: tracker.current_branch().ok(),
            remote: tracker.remote()?,
            divergence: tracker.divergence()?,
            dirty: tracker.has_uncommitted_changes()?,
        })
    }

    /// Human-readable lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let d = &self.divergence;
        let mut lines = vec![
            format!("branch:   {}", self.branch.as_deref().unwrap_or("(detached)")),
            format!(
                "remote:   {}",
                self.remote
                    .as_ref()
                    .map_or_else(|| "(none)".to_string(), |r| format!("{} {}", r.name, r.url))
            ),
            format!("upstream: {}", d.upstream.as_deref().unwrap_or("(none)")),
            format!("state:    {} (ahead {}, behind {})", d.state, d.ahead, d.behind),
            format!(
                "worktree: {}",
                if self.dirty { "uncommitted changes" } else { "clean" }
            ),
        ];
        if let Some(hint) = state_hint(d.state, self.remote.is_some()) {
            lines.push(format!("hint:     {hint}"));
        }
        lines
    }
}

/// Next step suggested for a state.
#[must_use]
pub const fn state_hint(state: SyncState, has_remote: bool) -> Option<&'static str> {
    match state {
        SyncState::Unknown if has_remote => Some("run `lcsync sync fetch` to compare with the remote"),
        SyncState::Unknown => Some("run `lcsync remote set URL` to configure a remote"),
        SyncState::UpToDate => None,
        SyncState::LocalAhead => Some("run `lcsync sync push` to publish your commits"),
        SyncState::RemoteAhead | SyncState::Diverged => {
            Some("run `lcsync sync merge` before pushing")
        }
        SyncState::Conflicted => {
            Some("resolve the conflicted files, then run `lcsync sync commit MESSAGE`")
        }
    }
}

/// Initialize a repository, optionally configuring its remote.
///
/// # Errors
///
/// Returns an error if `git init` fails or the remote cannot be configured.
pub fn run_init_command(args: &InitArgs, config: &Config, repo: &Path) -> Result<()> {
    if query::is_git_repo(repo) {
        warn!(path = %repo.display(), "already inside a git repository, reinitializing");
    }
    let handle = RepositoryHandle::init(repo)?;
    println!("Initialized repository in {}", handle.workdir().display());

    let url = args
        .remote_url
        .as_deref()
        .or_else(|| (!config.remote.url.is_empty()).then_some(config.remote.url.as_str()));
    if let Some(url) = url {
        let tracker = SyncStateTracker::with_transport(
            handle,
            ShellBackend,
            config.tracker_options(),
        );
        let remote = tracker.configure_remote(url)?;
        println!("Remote {} -> {}", remote.name, remote.url);
    }
    Ok(())
}

/// Handler for `remote`.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or git config fails.
pub fn run_remote_command(args: &RemoteArgs, config: &Config, repo: &Path) -> Result<()> {
    let tracker = open_tracker(config, repo)?;
    match &args.subcommand {
        RemoteSubcommand::Set(set) => {
            let url = match set.url.as_deref() {
                Some(url) => url,
                None if !config.remote.url.is_empty() => config.remote.url.as_str(),
                None => {
                    return Err(ConfigError::MissingKey {
                        section: "remote".to_string(),
                        key: "url".to_string(),
                    }
                    .into());
                }
            };
            let remote = tracker.configure_remote(url)?;
            println!("Remote {} -> {}", remote.name, remote.url);
        }
        RemoteSubcommand::Show => match tracker.remote()? {
            Some(remote) => println!("{} {}", remote.name, remote.url),
            None => println!("No remote named '{}' configured", config.remote.name),
        },
    }
    Ok(())
}

/// Handler for `identity`.
///
/// # Errors
///
/// Returns an error if the identity is invalid or the store cannot be used.
pub fn run_identity_command(args: &IdentityArgs, config: &Config, repo: &Path) -> Result<()> {
    let tracker = open_tracker(config, repo)?;
    let store = identity_store(config, &tracker);
    match &args.subcommand {
        IdentitySubcommand::Set(set) => {
            let identity = UserIdentity::new(&set.name, &set.email)?;
            store.save(&identity)?;
            info!(path = %store.path().display(), "saved identity");
            println!("Identity set to {identity}");
        }
        IdentitySubcommand::Show => match store.load()? {
            Some(identity) => println!("{identity}"),
            None => println!("No identity configured"),
        },
    }
    Ok(())
}

/// Handler for `sync`.
///
/// # Errors
///
/// Returns the tracker's error; see [`crate::error::exit_code`] for how each
/// one maps to an exit status.
pub async fn run_sync_command(args: &SyncArgs, config: &Config, repo: &Path) -> Result<()> {
    let tracker = open_tracker(config, repo)?;
    match &args.subcommand {
        SyncSubcommand::Status(status) => {
            let report = StatusReport::collect(&tracker)?;
            if status.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("failed to encode status")?
                );
            } else {
                report.lines().iter().for_each(|line| println!("{line}"));
            }
        }
        SyncSubcommand::Fetch => {
            let d = tracker.fetch().await?;
            println!("Fetched: {} (ahead {}, behind {})", d.state, d.ahead, d.behind);
        }
        SyncSubcommand::Push => {
            let d = tracker.push().await?;
            println!("Pushed: {}", d.state);
        }
        SyncSubcommand::Merge => {
            let identity = require_identity(config, &tracker)?;
            match tracker.merge(&identity)? {
                MergeOutcome::Success => {
                    println!("Merged: {}", tracker.compute_sync_state()?);
                }
                MergeOutcome::Conflicts(paths) => {
                    for path in &paths {
                        println!("conflict: {path}");
                    }
                    return Err(SyncError::MergeConflict { paths }.into());
                }
            }
        }
        SyncSubcommand::Commit(commit) => {
            let identity = require_identity(config, &tracker)?;
            let summary = tracker.commit(&commit.message, &identity)?;
            println!("[{}] {}", summary.short_id, summary.subject());
        }
    }
    Ok(())
}
