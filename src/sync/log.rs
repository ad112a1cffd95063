// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lazy commit log.
//!
//! A `CommitLog` is a query, not a cursor: every call to [`CommitLog::iter`]
//! starts a new walk from the tip it was created with.

use gix::ObjectId;

use crate::error::{GitError, GixError, LcResult};
use crate::git::backend::{CommitGraph, GixBackend};
use crate::sync::types::CommitSummary;

/// Newest-first commits reachable from a tip, optionally capped.
pub struct CommitLog {
    repo: gix::Repository,
    tip: Option<ObjectId>,
    limit: Option<usize>,
}

impl CommitLog {
    pub(crate) const fn new(
        repo: gix::Repository,
        tip: Option<ObjectId>,
        limit: Option<usize>,
    ) -> Self {
        Self { repo, tip, limit }
    }

    /// Tip the walk starts from (None for an unborn branch).
    #[must_use]
    pub const fn tip(&self) -> Option<ObjectId> {
        self.tip
    }

    /// Start a walk. Commits are decoded one at a time as the iterator is
    /// advanced.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the walk cannot be started.
    pub fn iter(&self) -> LcResult<impl Iterator<Item = LcResult<CommitSummary>> + '_> {
        let walk = match self.tip {
            Some(tip) => Some(
                self.repo
                    .rev_walk([tip])
                    .all()
                    .map_err(|e| GitError::Gix(GixError::traverse("failed to start commit walk", e)))?,
            ),
            None => None,
        };

        Ok(walk
            .into_iter()
            .flatten()
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|info| {
                let info =
                    info.map_err(|e| GitError::Gix(GixError::traverse("commit walk failed", e)))?;
                GixBackend::commit_summary(&self.repo, info.id)
            }))
    }

    /// Run the walk to completion.
    ///
    /// # Errors
    ///
    /// Returns the first error hit while walking or decoding.
    pub fn to_vec(&self) -> LcResult<Vec<CommitSummary>> {
        self.iter()?.collect()
    }
}
