// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local/remote synchronization state.
//!
//! ```text
//! RepositoryHandle --> SyncStateTracker --+--> SyncState / Divergence
//!                          |              +--> CommitLog, FileStatusEntry
//!                          |              +--> DivergentFiles
//!                          v
//!                     GitTransport (fetch, push)
//!
//! IdentityStore --> UserIdentity --> commit / merge
//! SyncPoller    --> SyncSnapshot (every poll interval)
//! ```

pub mod handle;
pub mod identity;
pub mod log;
pub mod poller;
pub mod tracker;
pub mod types;

pub use handle::RepositoryHandle;
pub use identity::{IdentityStore, JsonIdentityStore, MemoryIdentityStore};
pub use log::CommitLog;
pub use poller::{SyncPoller, SyncSnapshot};
pub use tracker::{SyncStateTracker, TrackerOptions};
pub use types::{
    CommitSummary, Divergence, DivergentFiles, FileState, FileStatusEntry, MergeOutcome,
    Operation, RemoteConfig, SyncState, UserIdentity,
};

#[cfg(test)]
pub(crate) mod test_utils;
