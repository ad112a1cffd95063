// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync state tracker.
//!
//! ```text
//!            fetch                 push (state != RemoteAhead/Diverged)
//!   Idle ------------> Idle        Idle ------------> Idle | Rejected
//!
//!            merge                 commit (after manual resolution)
//!   Idle ------------> Idle        Conflicted ------> Idle
//!            \
//!             '------> Conflicted
//! ```
//!
//! Reads go through gix (`CommitGraph`), writes and status through the git
//! CLI, network through a [`GitTransport`]. Fetch, push, merge and commit
//! are mutually exclusive: a second call while one is running fails with
//! `SyncError::Busy`.

use bon::Builder;
use gix::ObjectId;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::handle::RepositoryHandle;
use super::log::CommitLog;
use super::types::{
    CommitSummary, DEFAULT_REMOTE, Divergence, DivergentFiles, FileStatusEntry, MergeOutcome,
    Operation, RemoteConfig, SyncState, UserIdentity,
};
use crate::error::{ConfigError, GitError, GixError, LcError, LcResult, SyncError};
use crate::git::backend::{CommitGraph, GitTransport, GixBackend, ShellBackend};
use crate::git::cmd;

/// Default deadline for fetch and push.
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(30);

/// Tracker settings.
#[derive(Debug, Clone, Builder)]
pub struct TrackerOptions {
    #[builder(setters(name = with_remote), into, default = DEFAULT_REMOTE.to_string())]
    remote: String,
    #[builder(setters(name = with_network_timeout), default = DEFAULT_NETWORK_TIMEOUT)]
    network_timeout: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TrackerOptions {
    /// Name of the remote the tracker synchronizes with.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Deadline for fetch and push.
    #[must_use]
    pub const fn network_timeout(&self) -> Duration {
        self.network_timeout
    }
}

/// Where the current branch synchronizes to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Upstream {
    remote: String,
    /// Branch on the remote, e.g. `refs/heads/main`.
    merge_ref: String,
    /// Local remote-tracking ref, e.g. `refs/remotes/origin/main`.
    tracking_ref: String,
}

impl Upstream {
    fn from_config(remote: String, merge_ref: String) -> Self {
        let tracking_ref = if remote == "." {
            merge_ref.clone()
        } else {
            let branch = merge_ref.strip_prefix("refs/heads/").unwrap_or(&merge_ref);
            format!("refs/remotes/{remote}/{branch}")
        };
        Self {
            remote,
            merge_ref,
            tracking_ref,
        }
    }
}

/// Clears the in-flight operation slot when dropped.
struct OperationGuard<'a> {
    slot: &'a Mutex<Option<Operation>>,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Owns a repository handle and answers how HEAD relates to its upstream.
pub struct SyncStateTracker<T: GitTransport = ShellBackend> {
    handle: RepositoryHandle,
    transport: T,
    options: TrackerOptions,
    running: Mutex<Option<Operation>>,
}

impl SyncStateTracker<ShellBackend> {
    /// Open the repository at `path` with the git CLI transport.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotARepository` if `path` is not in a working tree.
    pub fn open(path: &Path, options: TrackerOptions) -> LcResult<Self> {
        Ok(Self::with_transport(
            RepositoryHandle::open(path)?,
            ShellBackend,
            options,
        ))
    }
}

impl<T: GitTransport> SyncStateTracker<T> {
    pub fn with_transport(handle: RepositoryHandle, transport: T, options: TrackerOptions) -> Self {
        Self {
            handle,
            transport,
            options,
            running: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn handle(&self) -> &RepositoryHandle {
        &self.handle
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        self.handle.workdir()
    }

    #[must_use]
    pub const fn options(&self) -> &TrackerOptions {
        &self.options
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Operation currently in flight, if any.
    #[must_use]
    pub fn running(&self) -> Option<Operation> {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, operation: Operation) -> LcResult<OperationGuard<'_>> {
        let mut slot = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = *slot {
            debug!(%operation, %running, "rejected reentrant call");
            return Err(SyncError::Busy { running }.into());
        }
        *slot = Some(operation);
        Ok(OperationGuard {
            slot: &self.running,
        })
    }

    // --- Queries ---

    /// Current branch name.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::DetachedHead` if HEAD is not on a branch.
    pub fn current_branch(&self) -> LcResult<String> {
        let repo = self.handle.repo();
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        head.map(|name| name.shorten().to_string())
            .ok_or_else(|| SyncError::DetachedHead.into())
    }

    /// Local branch names.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the refs cannot be listed.
    pub fn list_branches(&self) -> LcResult<Vec<String>> {
        cmd::local_branches(self.workdir())
    }

    /// The tracked remote, if it exists.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the git config cannot be read.
    pub fn remote(&self) -> LcResult<Option<RemoteConfig>> {
        let name = self.options.remote();
        Ok(cmd::remote_url(self.workdir(), name)?.map(|url| RemoteConfig {
            name: name.to_string(),
            url,
        }))
    }

    fn require_remote(&self) -> LcResult<RemoteConfig> {
        self.remote()?.ok_or_else(|| {
            SyncError::NoRemoteConfigured {
                remote: self.options.remote().to_string(),
            }
            .into()
        })
    }

    fn upstream(&self) -> LcResult<Option<Upstream>> {
        let Ok(branch) = self.current_branch() else {
            return Ok(None);
        };
        let workdir = self.workdir();
        let remote = cmd::get_config(workdir, &format!("branch.{branch}.remote"))?;
        let merge_ref = cmd::get_config(workdir, &format!("branch.{branch}.merge"))?;
        Ok(remote
            .zip(merge_ref)
            .map(|(remote, merge_ref)| Upstream::from_config(remote, merge_ref)))
    }

    /// Whether a merge awaits its concluding commit or the index holds
    /// unmerged entries (left by cherry-pick, revert or stash pop).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the index cannot be inspected.
    pub fn has_unresolved_conflicts(&self) -> LcResult<bool> {
        if self.handle.merge_in_progress() {
            return Ok(true);
        }
        Ok(!cmd::unmerged_paths(self.workdir())?.is_empty())
    }

    /// Sync state together with the ahead/behind counts.
    ///
    /// ```text
    /// unresolved conflicts            Conflicted
    /// no upstream / never fetched     Unknown
    /// ahead == 0, behind == 0         UpToDate
    /// ahead == 0, behind  > 0         RemoteAhead
    /// ahead  > 0, behind == 0         LocalAhead
    /// ahead  > 0, behind  > 0         Diverged
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if refs or the commit graph cannot be read.
    pub fn divergence(&self) -> LcResult<Divergence> {
        let upstream = self.upstream()?;
        let upstream_name = upstream.as_ref().map(|u| u.tracking_ref.clone());

        if self.has_unresolved_conflicts()? {
            return Ok(Divergence {
                state: SyncState::Conflicted,
                upstream: upstream_name,
                ..Divergence::default()
            });
        }

        let Some(upstream) = upstream else {
            return Ok(Divergence::default());
        };

        let repo = self.handle.repo();
        let Some(remote_tip) = GixBackend::resolve_ref(&repo, &upstream.tracking_ref)? else {
            debug!(tracking = %upstream.tracking_ref, "tracking ref not fetched yet");
            return Ok(Divergence {
                upstream: upstream_name,
                ..Divergence::default()
            });
        };
        let head = GixBackend::head_id(&repo)?;

        let ahead = match head {
            Some(head) => GixBackend::count_exclusive(&repo, head, Some(remote_tip))?,
            None => 0,
        };
        let behind = GixBackend::count_exclusive(&repo, remote_tip, head)?;
        let state = SyncState::classify(ahead, behind);

        debug!(%state, ahead, behind, tracking = %upstream.tracking_ref, "computed sync state");
        Ok(Divergence {
            state,
            ahead,
            behind,
            upstream: upstream_name,
        })
    }

    /// Relationship between HEAD and its tracking branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if refs or the commit graph cannot be read.
    pub fn compute_sync_state(&self) -> LcResult<SyncState> {
        self.divergence().map(|d| d.state)
    }

    /// Whether the working tree has uncommitted or untracked changes.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the status cannot be computed.
    pub fn has_uncommitted_changes(&self) -> LcResult<bool> {
        crate::git::query::has_uncommitted_changes(self.workdir())
    }

    /// Commits reachable from `branch` (HEAD when None), newest first.
    ///
    /// The returned log is lazy and restartable; nothing is walked until it is
    /// iterated.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::BranchNotFound` if the branch does not exist.
    pub fn list_commits(&self, branch: Option<&str>, limit: Option<usize>) -> LcResult<CommitLog> {
        let repo = self.handle.repo();
        let tip = match branch {
            Some(name) => {
                let full = if name.starts_with("refs/") {
                    name.to_string()
                } else {
                    format!("refs/heads/{name}")
                };
                Some(GixBackend::resolve_ref(&repo, &full)?.ok_or_else(|| {
                    SyncError::BranchNotFound {
                        branch: name.to_string(),
                    }
                })?)
            }
            None => GixBackend::head_id(&repo)?,
        };
        Ok(CommitLog::new(repo, tip, limit))
    }

    /// Working-tree changes relative to HEAD, ignored files excluded.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git status` fails.
    pub fn list_file_status(&self) -> LcResult<Vec<FileStatusEntry>> {
        cmd::file_status(self.workdir())
    }

    /// What changed locally and remotely since the merge base.
    ///
    /// Diffs merge-base → HEAD and merge-base → tracking tip separately, so a
    /// file changed the same way on both sides shows up on both lists instead
    /// of disappearing from a direct HEAD ↔ tracking diff.
    ///
    /// # Errors
    ///
    /// Returns `NoUpstream` if there is no fetched tracking branch,
    /// `UnbornHead` if HEAD has no commits, `NoMergeBase` for unrelated
    /// histories.
    pub fn compute_divergent_files(&self) -> LcResult<DivergentFiles> {
        let branch = self.current_branch()?;
        let no_upstream = || SyncError::NoUpstream {
            branch: branch.clone(),
        };
        let upstream = self.upstream()?.ok_or_else(no_upstream)?;

        let repo = self.handle.repo();
        let remote_tip =
            GixBackend::resolve_ref(&repo, &upstream.tracking_ref)?.ok_or_else(no_upstream)?;
        let head = GixBackend::head_id(&repo)?.ok_or_else(|| SyncError::UnbornHead {
            branch: branch.clone(),
        })?;
        let base = GixBackend::merge_base(&repo, head, remote_tip).ok_or_else(|| {
            SyncError::NoMergeBase {
                upstream: upstream.tracking_ref.clone(),
            }
        })?;

        divergent_files(self.workdir(), base, head, remote_tip)
    }

    // --- Mutations ---

    /// Add or update the remote and make it the current branch's upstream.
    ///
    /// Running it twice with the same URL changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty URL,
    /// `SyncError::DetachedHead` if there is no current branch.
    pub fn configure_remote(&self, url: &str) -> LcResult<RemoteConfig> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidValue {
                section: "remote".to_string(),
                key: "url".to_string(),
                message: "remote URL is empty".to_string(),
            }
            .into());
        }

        let workdir = self.workdir();
        let name = self.options.remote();
        match cmd::remote_url(workdir, name)? {
            Some(existing) if existing == url => debug!(remote = name, url, "remote unchanged"),
            Some(old) => {
                // Tracking refs of the old URL would skew the sync state.
                cmd::remove_remote(workdir, name)?;
                cmd::add_remote(workdir, name, url)?;
                info!(remote = name, from = %old, to = url, "replaced remote");
            }
            None => cmd::add_remote(workdir, name, url)?,
        }

        let branch = self.current_branch()?;
        cmd::set_config(workdir, &format!("branch.{branch}.remote"), name)?;
        cmd::set_config(
            workdir,
            &format!("branch.{branch}.merge"),
            &format!("refs/heads/{branch}"),
        )?;

        info!(remote = name, url, branch = %branch, "configured remote");
        Ok(RemoteConfig {
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    /// Download remote refs and objects. Only remote-tracking refs move; the
    /// working tree and local branches are untouched, so this is safe to call
    /// on a timer.
    ///
    /// # Errors
    ///
    /// Returns `NoRemoteConfigured`, `Busy`, or `NetworkFailure` (including
    /// timeouts).
    pub async fn fetch(&self) -> LcResult<Divergence> {
        let _guard = self.begin(Operation::Fetch)?;
        let remote = self.require_remote()?;

        info!(remote = %remote.name, "fetching");
        self.transport
            .fetch(self.workdir(), &remote.name, self.options.network_timeout)
            .await
            .map_err(|e| network_failure(Operation::Fetch, &remote.name, e))?;

        let divergence = self.divergence()?;
        info!(remote = %remote.name, state = %divergence.state, behind = divergence.behind, "fetched");
        Ok(divergence)
    }

    /// Push the current branch to its upstream.
    ///
    /// Refuses without touching the network when the tracking branch has
    /// commits HEAD does not contain. Without an upstream the push goes to the
    /// configured remote and records the upstream.
    ///
    /// # Errors
    ///
    /// Returns `RemoteAheadRejected`, `UnresolvedConflicts`,
    /// `NoRemoteConfigured`, `UnbornHead`, `Busy`, or `NetworkFailure`.
    pub async fn push(&self) -> LcResult<Divergence> {
        let _guard = self.begin(Operation::Push)?;

        let divergence = self.divergence()?;
        match divergence.state {
            SyncState::Conflicted => return Err(SyncError::UnresolvedConflicts.into()),
            state if state.remote_has_unseen_commits() => {
                warn!(%state, behind = divergence.behind, "push refused, remote has unseen commits");
                return Err(SyncError::RemoteAheadRejected {
                    behind: divergence.behind,
                }
                .into());
            }
            _ => {}
        }

        let branch = self.current_branch()?;
        let remote = self.require_remote()?;
        if GixBackend::head_id(&self.handle.repo())?.is_none() {
            return Err(SyncError::UnbornHead { branch }.into());
        }

        let (target_remote, refspec, set_upstream) = match self.upstream()? {
            Some(upstream) if upstream.remote != "." => (
                upstream.remote,
                format!("refs/heads/{branch}:{}", upstream.merge_ref),
                false,
            ),
            _ => (remote.name.clone(), branch.clone(), true),
        };

        info!(remote = %target_remote, %refspec, set_upstream, "pushing");
        self.transport
            .push(
                self.workdir(),
                &target_remote,
                &refspec,
                set_upstream,
                self.options.network_timeout,
            )
            .await
            .map_err(|e| {
                if is_non_fast_forward(&e) {
                    warn!(remote = %target_remote, "push rejected by remote");
                    SyncError::RemoteAheadRejected { behind: 0 }.into()
                } else {
                    network_failure(Operation::Push, &target_remote, e)
                }
            })?;

        let divergence = self.divergence()?;
        info!(remote = %target_remote, state = %divergence.state, "pushed");
        Ok(divergence)
    }

    /// Merge the tracking branch into HEAD as `identity`.
    ///
    /// On conflicts the working tree keeps the conflict markers and the state
    /// becomes `Conflicted` until a commit concludes the merge.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedConflicts`, `NoUpstream`, `DetachedHead`, `Busy`, or
    /// a `GitError` if git refuses the merge (e.g. local changes would be
    /// overwritten).
    pub fn merge(&self, identity: &UserIdentity) -> LcResult<MergeOutcome> {
        let _guard = self.begin(Operation::Merge)?;
        if self.has_unresolved_conflicts()? {
            return Err(SyncError::UnresolvedConflicts.into());
        }

        let branch = self.current_branch()?;
        let no_upstream = || SyncError::NoUpstream {
            branch: branch.clone(),
        };
        let upstream = self.upstream()?.ok_or_else(no_upstream)?;
        if GixBackend::resolve_ref(&self.handle.repo(), &upstream.tracking_ref)?.is_none() {
            return Err(no_upstream().into());
        }

        info!(branch = %branch, from = %upstream.tracking_ref, "merging");
        let clean = cmd::merge(
            self.workdir(),
            &upstream.tracking_ref,
            identity.name(),
            identity.email(),
        )?;

        if clean {
            info!(branch = %branch, "merge complete");
            Ok(MergeOutcome::Success)
        } else {
            let paths = cmd::unmerged_paths(self.workdir())?;
            warn!(branch = %branch, conflicts = paths.len(), "merge stopped with conflicts");
            Ok(MergeOutcome::Conflicts(paths))
        }
    }

    /// Stage every working-tree change and commit it as `identity`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCommit` for a blank message, `NoChangesToCommit` when
    /// there is nothing to commit and no merge to conclude, `Busy`, or a
    /// `GitError` if git fails.
    pub fn commit(&self, message: &str, identity: &UserIdentity) -> LcResult<CommitSummary> {
        let _guard = self.begin(Operation::Commit)?;
        if message.trim().is_empty() {
            return Err(SyncError::EmptyCommit.into());
        }

        let workdir = self.workdir();
        cmd::stage_all(workdir)?;
        let concluding_merge = self.handle.merge_in_progress();
        if !concluding_merge && cmd::file_status(workdir)?.is_empty() {
            return Err(SyncError::NoChangesToCommit.into());
        }

        cmd::commit(workdir, message, identity.name(), identity.email())?;

        let repo = self.handle.repo();
        let head = GixBackend::head_id(&repo)?.ok_or_else(|| GitError::CommandFailed {
            command: "git commit".to_string(),
            message: "HEAD is unborn after commit".to_string(),
        })?;
        let summary = GixBackend::commit_summary(&repo, head)?;
        info!(id = %summary.short_id, concluding_merge, author = %identity, "committed");
        Ok(summary)
    }
}

/// Diff `base → local` and `base → remote` independently.
///
/// Swapping `local` and `remote` swaps the two halves of the result.
///
/// # Errors
///
/// Returns a `GitError` if `git diff` fails.
pub fn divergent_files(
    workdir: &Path,
    base: ObjectId,
    local: ObjectId,
    remote: ObjectId,
) -> LcResult<DivergentFiles> {
    let side = |tip: ObjectId| -> LcResult<Vec<FileStatusEntry>> {
        if tip == base {
            Ok(Vec::new())
        } else {
            cmd::changed_files(workdir, &base.to_string(), &tip.to_string())
        }
    };
    Ok(DivergentFiles {
        local: side(local)?,
        remote: side(remote)?,
    })
}

fn network_failure(operation: Operation, remote: &str, err: LcError) -> LcError {
    let message = match &err {
        LcError::Git(git) => match git.as_ref() {
            GitError::CommandFailed { message, .. } => message.clone(),
            other => other.to_string(),
        },
        other => other.to_string(),
    };
    SyncError::NetworkFailure {
        operation,
        remote: remote.to_string(),
        message,
    }
    .into()
}

fn is_non_fast_forward(err: &LcError) -> bool {
    let LcError::Git(git) = err else {
        return false;
    };
    let GitError::CommandFailed { message, .. } = git.as_ref() else {
        return false;
    };
    ["[rejected]", "non-fast-forward", "fetch first"]
        .iter()
        .any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests;
