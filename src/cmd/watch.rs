// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `watch`: print sync state as it changes until Ctrl+C.

use anyhow::Context as _;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::open_tracker;
use crate::cli::sync::WatchArgs;
use crate::config::Config;
use crate::error::Result;
use crate::sync::poller::{SyncPoller, SyncSnapshot};

/// Handler for `watch`.
///
/// # Errors
///
/// Returns an error if the repository cannot be opened or a snapshot cannot
/// be encoded.
pub async fn run_watch_command(args: &WatchArgs, config: &Config, repo: &Path) -> Result<()> {
    let tracker = Arc::new(open_tracker(config, repo)?);
    let interval = args
        .interval
        .map_or_else(|| config.poll_interval(), Duration::from_secs);
    let fetch = config.sync.fetch_on_poll && !args.no_fetch;

    let poller = SyncPoller::spawn(Arc::clone(&tracker), interval, fetch);
    let updates = poller.updates().clone();
    let mut last: Option<SyncSnapshot> = None;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping watch");
                break Ok(());
            }
            snapshot = updates.recv_async() => {
                let Ok(snapshot) = snapshot else {
                    break Ok(());
                };
                if args.json {
                    match serde_json::to_string(&snapshot).context("failed to encode snapshot") {
                        Ok(line) => println!("{line}"),
                        Err(e) => break Err(e),
                    }
                } else if last.as_ref() != Some(&snapshot) {
                    println!("{}", format_snapshot(&snapshot));
                }
                last = Some(snapshot);
            }
        }
    };

    poller.stop().await;
    result
}

fn format_snapshot(snapshot: &SyncSnapshot) -> String {
    let d = &snapshot.divergence;
    let mut line = format!("{} (ahead {}, behind {})", d.state, d.ahead, d.behind);
    if snapshot.dirty {
        line.push_str(", uncommitted changes");
    }
    if let Some(error) = &snapshot.error {
        let _ = write!(line, " [{error}]");
    }
    line
}
