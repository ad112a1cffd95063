// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Value types shared by the tracker, the poller and the CLI.
//!
//! ```text
//! SyncState   Unknown | UpToDate | RemoteAhead | LocalAhead | Diverged | Conflicted
//! FileState   Unmodified | Modified | New | Deleted | Conflicted | Ignored
//! Operation   Fetch | Push | Merge | Commit
//! ```
//!
//! All of these are snapshots: recomputed on demand, never cached across
//! refreshes.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Default remote name.
pub const DEFAULT_REMOTE: &str = "origin";

/// Relationship between HEAD and its upstream tracking branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    /// No tracking branch, or the tracking ref has never been fetched.
    #[default]
    Unknown,
    /// HEAD and tracking tip are the same commit.
    UpToDate,
    /// Only the remote has commits HEAD does not contain.
    RemoteAhead,
    /// Only HEAD has commits the remote does not contain.
    LocalAhead,
    /// Both sides have exclusive commits.
    Diverged,
    /// A merge stopped with conflicts and has not been concluded.
    Conflicted,
}

impl SyncState {
    /// Classify from the number of commits exclusive to each side.
    #[must_use]
    pub const fn classify(local_exclusive: usize, remote_exclusive: usize) -> Self {
        match (local_exclusive, remote_exclusive) {
            (0, 0) => Self::UpToDate,
            (0, _) => Self::RemoteAhead,
            (_, 0) => Self::LocalAhead,
            _ => Self::Diverged,
        }
    }

    /// Whether the remote has commits that a push would overwrite or be
    /// rejected for.
    #[must_use]
    pub const fn remote_has_unseen_commits(self) -> bool {
        matches!(self, Self::RemoteAhead | Self::Diverged)
    }

    /// Short label for display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::UpToDate => "up-to-date",
            Self::RemoteAhead => "remote-ahead",
            Self::LocalAhead => "local-ahead",
            Self::Diverged => "diverged",
            Self::Conflicted => "conflicted",
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutating operations guarded against reentrancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Fetch,
    Push,
    Merge,
    Commit,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Push => write!(f, "push"),
            Self::Merge => write!(f, "merge"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A named remote and its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub name: String,
    pub url: String,
}

impl RemoteConfig {
    /// Remote named `origin` pointing at `url`.
    pub fn origin(url: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_REMOTE.to_string(),
            url: url.into(),
        }
    }
}

/// Name and email used as author and committer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    name: String,
    email: String,
}

impl UserIdentity {
    /// Create an identity, rejecting values git would refuse.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Invalid` if the name is blank, the email has no
    /// `@`, or either field contains `<`, `>` or a newline.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> std::result::Result<Self, IdentityError> {
        let name = name.into().trim().to_string();
        let email = email.into().trim().to_string();

        if name.is_empty() {
            return Err(IdentityError::Invalid("name is empty".to_string()));
        }
        if !email.contains('@') {
            return Err(IdentityError::Invalid(format!(
                "email '{email}' has no '@'"
            )));
        }
        let forbidden = |s: &str| s.contains(['<', '>', '\n']);
        if forbidden(&name) || forbidden(&email) {
            return Err(IdentityError::Invalid(
                "name and email must not contain '<', '>' or newlines".to_string(),
            ));
        }

        Ok(Self { name, email })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl std::fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// One commit as shown in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub short_id: String,
    pub author: String,
    pub message: String,
}

impl CommitSummary {
    /// First line of the message.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// State of a single path relative to HEAD or between two commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Unmodified,
    Modified,
    New,
    Deleted,
    Conflicted,
    Ignored,
}

impl FileState {
    /// One-letter marker for compact listings.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Unmodified => ' ',
            Self::Modified => 'M',
            Self::New => 'A',
            Self::Deleted => 'D',
            Self::Conflicted => 'U',
            Self::Ignored => '!',
        }
    }
}

/// A path and its state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileStatusEntry {
    pub path: String,
    pub state: FileState,
}

impl FileStatusEntry {
    pub fn new(path: impl Into<String>, state: FileState) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }
}

/// Changes on each side since the merge base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergentFiles {
    /// merge-base → HEAD.
    pub local: Vec<FileStatusEntry>,
    /// merge-base → tracking tip.
    pub remote: Vec<FileStatusEntry>,
}

impl DivergentFiles {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }

    /// Paths changed on both sides (candidates for conflicts).
    #[must_use]
    pub fn overlapping(&self) -> Vec<&str> {
        let remote: std::collections::BTreeSet<&str> =
            self.remote.iter().map(|e| e.path.as_str()).collect();
        let mut both: Vec<&str> = self
            .local
            .iter()
            .map(|e| e.path.as_str())
            .filter(|p| remote.contains(p))
            .collect();
        both.sort_unstable();
        both.dedup();
        both
    }
}

/// Sync state with the commit counts behind it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Divergence {
    pub state: SyncState,
    /// Commits in HEAD not in the tracking branch.
    pub ahead: usize,
    /// Commits in the tracking branch not in HEAD.
    pub behind: usize,
    /// Full name of the tracking ref, if one is configured.
    pub upstream: Option<String>,
}

/// Result of merging the tracking branch into HEAD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// Merge completed (fast-forward, merge commit, or nothing to do).
    Success,
    /// Working tree left with conflict markers in these paths.
    Conflicts(Vec<String>),
}

impl MergeOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}
