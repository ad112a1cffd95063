// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              LcError (16 bytes)
//!                     |
//!   +--------+--------+--------+--------+
//!   |        |        |        |        |
//!   v        v        v        v        v
//!  Git     Sync    Config  Identity   Io
//!  Box     Box      Box      Box      Box
//!
//! Sub-errors (unboxed internally):
//!   Git      Gix, CommandFailed, Timeout, GitNotFound
//!   Sync     NotARepository, NetworkFailure, RemoteAheadRejected,
//!            NoRemoteConfigured, MergeConflict, EmptyCommit, Busy, ...
//!   Config   MissingKey, InvalidValue
//!   Identity NotConfigured, Invalid, Read/Write
//!
//! Exit codes: 0 ok, 1 rejected push / other, 2 conflict, 3 network
//! ```

use thiserror::Error;

use crate::sync::types::Operation;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`LcError`].
pub type LcResult<T> = std::result::Result<T, LcError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at 16 bytes on the stack.
#[derive(Debug, Error)]
pub enum LcError {
    /// Git backend failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Sync operation refused or failed.
    #[error("{0}")]
    Sync(#[from] Box<SyncError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Identity store error.
    #[error("identity error: {0}")]
    Identity(#[from] Box<IdentityError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

impl LcError {
    /// Returns the sync error if this is one.
    #[must_use]
    pub fn as_sync(&self) -> Option<&SyncError> {
        match self {
            Self::Sync(e) => Some(e),
            _ => None,
        }
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for LcError {
                fn from(err: $error) -> Self {
                    LcError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    SyncError => Sync,
    ConfigError => Config,
    IdentityError => Identity,
    std::io::Error => Io,
}

impl From<GixError> for LcError {
    fn from(err: GixError) -> Self {
        GitError::Gix(err).into()
    }
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
///
/// gix has many error types; the ones on hot paths are kept typed, graph
/// traversal errors are erased into [`GixError::Traverse`].
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to get HEAD or another reference.
    #[error("failed to get head reference: {0}")]
    Head(#[from] gix::reference::find::existing::Error),

    /// Failed to look up a reference by name.
    #[error("failed to find reference: {0}")]
    FindReference(#[from] gix::reference::find::Error),

    /// Commit walk, merge-base or object lookup failed.
    #[error("{context}: {source}")]
    Traverse {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Repository has no worktree (bare repository).
    #[error("repository has no worktree (bare repository)")]
    BareRepository,
}

impl GixError {
    /// Erase a gix traversal error, keeping a short description of the step.
    pub fn traverse(
        context: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Traverse {
            context,
            source: Box::new(source),
        }
    }
}

// --- Git Errors ---

/// Git backend errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Git command did not finish in time.
    #[error("git command timed out after {timeout_secs}s: {command}")]
    Timeout { command: String, timeout_secs: u64 },

    /// The git executable is not on PATH.
    #[error("git executable not found in PATH")]
    GitNotFound,

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// Reference resolved to something other than a commit id.
    #[error("reference {name} does not point to an object")]
    SymbolicReference { name: String },
}

// --- Sync Errors ---

/// Errors surfaced by the sync state tracker.
///
/// None of these are fatal; each one is reported to the caller as a status
/// value and the tracker stays usable.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Path is not inside a git working tree.
    #[error("not a git repository: {path}")]
    NotARepository { path: String },

    /// Fetch or push could not reach the remote.
    #[error("{operation} with remote '{remote}' failed: {message}")]
    NetworkFailure {
        operation: Operation,
        remote: String,
        message: String,
    },

    /// Push refused because the upstream has commits HEAD does not contain.
    ///
    /// `behind` is 0 when the server rejected the push rather than the local
    /// guard (the remote moved since the last fetch).
    #[error("push rejected: remote has commits not in HEAD, fetch and merge first")]
    RemoteAheadRejected { behind: usize },

    /// No local branch with this name.
    #[error("branch not found: {branch}")]
    BranchNotFound { branch: String },

    /// No remote with the expected name exists.
    #[error("no remote named '{remote}' is configured")]
    NoRemoteConfigured { remote: String },

    /// Current branch has no tracking branch.
    #[error("branch '{branch}' has no upstream tracking branch")]
    NoUpstream { branch: String },

    /// HEAD does not point at a branch.
    #[error("HEAD is detached")]
    DetachedHead,

    /// Current branch has no commits yet.
    #[error("branch '{branch}' has no commits yet")]
    UnbornHead { branch: String },

    /// Merge stopped with conflicts in the working tree.
    #[error("merge produced conflicts in {} file(s): {}", paths.len(), paths.join(", "))]
    MergeConflict { paths: Vec<String> },

    /// A merge is in progress and must be resolved and committed first.
    #[error("unresolved merge in progress, resolve conflicts and commit first")]
    UnresolvedConflicts,

    /// Commit message is empty.
    #[error("commit message is empty")]
    EmptyCommit,

    /// Nothing to commit.
    #[error("no changes to commit")]
    NoChangesToCommit,

    /// Another mutating operation is still running.
    #[error("{running} already in progress")]
    Busy { running: Operation },

    /// HEAD and upstream share no history.
    #[error("no common ancestor between HEAD and {upstream}")]
    NoMergeBase { upstream: String },
}

impl SyncError {
    /// Process exit code for this error when surfaced by the CLI.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MergeConflict { .. } => 2,
            Self::NetworkFailure { .. } => 3,
            _ => 1,
        }
    }
}

/// Map an application error to a process exit code.
///
/// ```text
/// 0  success
/// 1  rejected push, any other failure
/// 2  merge conflict
/// 3  network failure
/// ```
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(sync) = cause.downcast_ref::<SyncError>() {
            return sync.exit_code();
        }
        if let Some(sync) = cause.downcast_ref::<LcError>().and_then(LcError::as_sync) {
            return sync.exit_code();
        }
    }
    1
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Identity Errors ---

/// Identity store errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No identity has been saved yet.
    #[error("no user identity configured, run `lcsync identity set -n NAME -e EMAIL`")]
    NotConfigured,

    /// Identity fields are unusable for a git signature.
    #[error("invalid identity: {0}")]
    Invalid(String),

    /// Identity file could not be read or parsed.
    #[error("failed to read identity file '{path}': {message}")]
    Read { path: String, message: String },

    /// Identity file could not be written.
    #[error("failed to write identity file '{path}': {message}")]
    Write { path: String, message: String },
}
