// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Periodic sync state refresh.
//!
//! ```text
//! SyncPoller::spawn(tracker, interval, fetch)
//!   every tick:  [fetch] --> divergence + dirty --> SyncSnapshot --> channel
//!   tracker busy:        tick skipped
//!   stop() / cancel:     loop exits, channel disconnects
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::tracker::SyncStateTracker;
use super::types::Divergence;
use crate::error::SyncError;
use crate::git::backend::GitTransport;

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Snapshots buffered for a slow consumer before new ones are dropped.
const SNAPSHOT_BUFFER: usize = 8;

/// Result of one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    pub divergence: Divergence,
    /// Working tree has uncommitted changes.
    pub dirty: bool,
    /// Fetch or state error hit during this poll.
    pub error: Option<String>,
}

/// Background task that keeps sync state fresh.
pub struct SyncPoller {
    cancel_token: CancellationToken,
    updates: flume::Receiver<SyncSnapshot>,
    task: JoinHandle<()>,
}

impl SyncPoller {
    /// Start polling `tracker` every `interval`. The first poll runs
    /// immediately. With `fetch` set each poll fetches first (when a remote
    /// is configured).
    pub fn spawn<T: GitTransport + 'static>(
        tracker: Arc<SyncStateTracker<T>>,
        interval: Duration,
        fetch: bool,
    ) -> Self {
        let cancel_token = CancellationToken::new();
        let (tx, updates) = flume::bounded(SNAPSHOT_BUFFER);
        let token = cancel_token.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let snapshot = tokio::select! {
                    () = token.cancelled() => break,
                    snapshot = poll_once(&tracker, fetch) => snapshot,
                };
                let Some(snapshot) = snapshot else {
                    continue;
                };
                match tx.try_send(snapshot) {
                    Ok(()) => {}
                    Err(flume::TrySendError::Full(_)) => trace!("snapshot dropped, consumer lagging"),
                    Err(flume::TrySendError::Disconnected(_)) => break,
                }
            }
            debug!("poller stopped");
        });

        debug!(interval_ms = interval.as_millis(), fetch, "poller started");
        Self {
            cancel_token,
            updates,
            task,
        }
    }

    /// Snapshot stream. Disconnects once the poller stops.
    #[must_use]
    pub const fn updates(&self) -> &flume::Receiver<SyncSnapshot> {
        &self.updates
    }

    /// Token that stops the poller when cancelled.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Stop polling and wait for the task to exit. An in-flight fetch is
    /// dropped, which kills the git child.
    pub async fn stop(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "poller task failed");
        }
    }
}

/// Run one poll. Returns None when the tracker is busy with another
/// operation.
pub async fn poll_once<T: GitTransport>(
    tracker: &SyncStateTracker<T>,
    fetch: bool,
) -> Option<SyncSnapshot> {
    if tracker.running().is_some() {
        trace!("tracker busy, skipping poll");
        return None;
    }

    let mut error = None;
    if fetch && matches!(tracker.remote(), Ok(Some(_))) {
        match tracker.fetch().await {
            Ok(_) => {}
            Err(e) if matches!(e.as_sync(), Some(SyncError::Busy { .. })) => return None,
            Err(e) => {
                debug!(error = %e, "poll fetch failed");
                error = Some(e.to_string());
            }
        }
    }

    let divergence = match tracker.divergence() {
        Ok(divergence) => divergence,
        Err(e) => {
            error.get_or_insert_with(|| e.to_string());
            Divergence::default()
        }
    };
    let dirty = match tracker.has_uncommitted_changes() {
        Ok(dirty) => dirty,
        Err(e) => {
            error.get_or_insert_with(|| e.to_string());
            false
        }
    };

    Some(SyncSnapshot {
        divergence,
        dirty,
        error,
    })
}
