// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::str::FromStr;

use gix::ObjectId;

use super::divergent_files;
use crate::error::{ConfigError, LcError, SyncError, exit_code};
use crate::git::cmd::get_config;
use crate::sync::test_utils::{
    BlockingTransport, CountingTransport, FailingTransport, RepoFixture, commit_file,
    fake_upstream, identity, run_git, run_with_logs,
};
use crate::sync::types::{FileState, FileStatusEntry, MergeOutcome, Operation, SyncState};

fn oid(hex: &str) -> ObjectId {
    ObjectId::from_str(hex).expect("valid object id")
}

fn sync_error(err: &LcError) -> &SyncError {
    err.as_sync().expect("expected a sync error")
}

/// `main` one commit behind `origin/main`.
fn remote_ahead() -> RepoFixture {
    let fx = RepoFixture::new();
    let base = run_git(&fx.work, &["rev-parse", "HEAD"]);
    let remote = commit_file(&fx.work, "remote.txt", "theirs\n", "Remote change");
    fake_upstream(&fx.work, &remote);
    run_git(&fx.work, &["reset", "-q", "--hard", &base]);
    fx
}

/// `main` and `origin/main` each one commit past the shared base.
fn diverged(local_file: &str, remote_file: &str) -> (RepoFixture, String, String, String) {
    let fx = RepoFixture::new();
    let base = run_git(&fx.work, &["rev-parse", "HEAD"]);
    let remote = commit_file(&fx.work, remote_file, "remote\n", "Remote change");
    fake_upstream(&fx.work, &remote);
    run_git(&fx.work, &["reset", "-q", "--hard", &base]);
    let local = commit_file(&fx.work, local_file, "local\n", "Local change");
    (fx, base, local, remote)
}

// --- State ---

#[test]
fn test_state_unknown_without_upstream() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let divergence = tracker.divergence().unwrap();
    assert_eq!(divergence.state, SyncState::Unknown);
    assert_eq!(divergence.upstream, None);
    assert_eq!(tracker.current_branch().unwrap(), "main");
    assert!(tracker.remote().unwrap().is_none());
}

#[test]
fn test_state_up_to_date() {
    let fx = RepoFixture::new();
    let head = run_git(&fx.work, &["rev-parse", "HEAD"]);
    fake_upstream(&fx.work, &head);
    let tracker = fx.tracker(CountingTransport::default());

    let divergence = tracker.divergence().unwrap();
    assert_eq!(divergence.state, SyncState::UpToDate);
    assert_eq!(
        divergence.upstream.as_deref(),
        Some("refs/remotes/origin/main")
    );
}

#[test]
fn test_state_counts_both_sides() {
    let (fx, ..) = diverged("local.txt", "remote.txt");
    let tracker = fx.tracker(CountingTransport::default());

    let divergence = tracker.divergence().unwrap();
    assert_eq!(
        (divergence.state, divergence.ahead, divergence.behind),
        (SyncState::Diverged, 1, 1)
    );
}

#[test]
fn test_state_is_recomputed_after_commit() {
    let fx = RepoFixture::new();
    let head = run_git(&fx.work, &["rev-parse", "HEAD"]);
    fake_upstream(&fx.work, &head);
    let tracker = fx.tracker(CountingTransport::default());
    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::UpToDate);

    std::fs::write(fx.work.join("notes.txt"), "hello\n").unwrap();
    tracker.commit("Add notes", &identity()).unwrap();

    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::LocalAhead);
}

// --- Push ---

#[tokio::test]
async fn test_push_refused_when_remote_ahead() {
    let fx = remote_ahead();
    let tracker = fx.tracker(CountingTransport::default());
    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::RemoteAhead);

    let (result, logs) = run_with_logs(|| tracker.push()).await.unwrap();
    let err = result.unwrap_err();

    assert!(matches!(
        sync_error(&err),
        SyncError::RemoteAheadRejected { behind: 1 }
    ));
    assert!(logs.contains("push refused"), "logs: {logs}");
    assert_eq!(tracker.transport().calls(), (0, 0));
}

#[tokio::test]
async fn test_push_refused_when_diverged() {
    let (fx, ..) = diverged("local.txt", "remote.txt");
    let tracker = fx.tracker(CountingTransport::default());

    let err = tracker.push().await.unwrap_err();
    assert!(matches!(
        sync_error(&err),
        SyncError::RemoteAheadRejected { .. }
    ));
    assert_eq!(tracker.transport().calls(), (0, 0));
}

#[tokio::test]
async fn test_push_local_ahead_uses_upstream_refspec() {
    let fx = RepoFixture::new();
    let head = run_git(&fx.work, &["rev-parse", "HEAD"]);
    fake_upstream(&fx.work, &head);
    commit_file(&fx.work, "notes.txt", "mine\n", "Local change");
    let tracker = fx.tracker(CountingTransport::default());

    tracker.push().await.unwrap();

    let pushed = tracker.transport().pushed.lock().unwrap().clone();
    assert_eq!(
        pushed,
        vec![(
            "origin".to_string(),
            "refs/heads/main:refs/heads/main".to_string(),
            false
        )]
    );
}

#[tokio::test]
async fn test_push_without_upstream_sets_it() {
    let fx = RepoFixture::new();
    run_git(&fx.work, &["remote", "add", "origin", "/nonexistent/remote.git"]);
    let tracker = fx.tracker(CountingTransport::default());

    tracker.push().await.unwrap();

    let pushed = tracker.transport().pushed.lock().unwrap().clone();
    assert_eq!(
        pushed,
        vec![("origin".to_string(), "main".to_string(), true)]
    );
}

#[tokio::test]
async fn test_push_without_remote() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let err = tracker.push().await.unwrap_err();
    assert!(matches!(
        sync_error(&err),
        SyncError::NoRemoteConfigured { .. }
    ));
}

// --- Fetch ---

#[tokio::test]
async fn test_fetch_without_remote() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let err = tracker.fetch().await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"no remote named 'origin' is configured");
    assert_eq!(tracker.transport().calls(), (0, 0));
}

#[tokio::test]
async fn test_fetch_failure_is_network_failure() {
    let fx = RepoFixture::new();
    let head = run_git(&fx.work, &["rev-parse", "HEAD"]);
    fake_upstream(&fx.work, &head);
    let tracker = fx.tracker(FailingTransport);

    let err = tracker.fetch().await.unwrap_err();
    assert!(matches!(
        sync_error(&err),
        SyncError::NetworkFailure {
            operation: Operation::Fetch,
            ..
        }
    ));
    assert_eq!(exit_code(&anyhow::Error::new(err)), 3);
    // guard released after failure
    assert_eq!(tracker.running(), None);
}

#[tokio::test]
async fn test_second_operation_while_fetch_in_flight_is_busy() {
    let fx = RepoFixture::new();
    let head = run_git(&fx.work, &["rev-parse", "HEAD"]);
    fake_upstream(&fx.work, &head);
    let (transport, control) = BlockingTransport::new();
    let tracker = fx.shared_tracker(transport);

    let background = std::sync::Arc::clone(&tracker);
    let task = tokio::spawn(async move { background.fetch().await.map(|d| d.state) });
    control.entered.recv_async().await.unwrap();

    assert_eq!(tracker.running(), Some(Operation::Fetch));
    let err = tracker.commit("Racing commit", &identity()).unwrap_err();
    assert!(matches!(
        sync_error(&err),
        SyncError::Busy {
            running: Operation::Fetch
        }
    ));
    let err = tracker.merge(&identity()).unwrap_err();
    assert!(matches!(sync_error(&err), SyncError::Busy { .. }));

    control.release.send(()).unwrap();
    assert_eq!(task.await.unwrap().unwrap(), SyncState::UpToDate);
    assert_eq!(tracker.running(), None);
}

// --- Merge ---

#[test]
fn test_merge_remote_ahead_fast_forwards() {
    let fx = remote_ahead();
    let tracker = fx.tracker(CountingTransport::default());

    let outcome = tracker.merge(&identity()).unwrap();
    assert!(outcome.is_success());
    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::UpToDate);
    assert!(fx.work.join("remote.txt").exists());
}

#[test]
fn test_merge_disjoint_changes_creates_merge_commit() {
    let (fx, ..) = diverged("local.txt", "remote.txt");
    let tracker = fx.tracker(CountingTransport::default());

    assert_eq!(tracker.merge(&identity()).unwrap(), MergeOutcome::Success);

    let divergence = tracker.divergence().unwrap();
    assert_eq!(
        (divergence.state, divergence.ahead, divergence.behind),
        (SyncState::LocalAhead, 2, 0)
    );
    let author = run_git(&fx.work, &["log", "-1", "--format=%cn <%ce>"]);
    assert_eq!(author, "Ada <ada@example.com>");
}

#[tokio::test]
async fn test_merge_conflict_then_resolution_commit() {
    let (fx, ..) = diverged("README.md", "README.md");
    let tracker = fx.tracker(CountingTransport::default());

    let outcome = tracker.merge(&identity()).unwrap();
    assert_eq!(outcome, MergeOutcome::Conflicts(vec!["README.md".to_string()]));
    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::Conflicted);
    assert_eq!(
        tracker.list_file_status().unwrap(),
        vec![FileStatusEntry::new("README.md", FileState::Conflicted)]
    );

    let err = tracker.push().await.unwrap_err();
    assert!(matches!(sync_error(&err), SyncError::UnresolvedConflicts));
    let err = tracker.merge(&identity()).unwrap_err();
    assert!(matches!(sync_error(&err), SyncError::UnresolvedConflicts));

    std::fs::write(fx.work.join("README.md"), "local and remote\n").unwrap();
    tracker.commit("Resolve README", &identity()).unwrap();

    assert!(tracker.list_file_status().unwrap().is_empty());
    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::LocalAhead);
}

#[test]
fn test_merge_without_upstream() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let err = tracker.merge(&identity()).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"branch 'main' has no upstream tracking branch");
}

// --- Commit ---

#[test]
fn test_commit_validation() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let err = tracker.commit("  \n", &identity()).unwrap_err();
    assert!(matches!(sync_error(&err), SyncError::EmptyCommit));

    let err = tracker.commit("Nothing here", &identity()).unwrap_err();
    assert!(matches!(sync_error(&err), SyncError::NoChangesToCommit));
}

#[test]
fn test_commit_stages_everything() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());
    std::fs::write(fx.work.join("new.txt"), "new\n").unwrap();
    std::fs::remove_file(fx.work.join("README.md")).unwrap();
    assert!(tracker.has_uncommitted_changes().unwrap());

    let summary = tracker.commit("Replace readme", &identity()).unwrap();

    assert_eq!(summary.author, "Ada");
    assert_eq!(summary.message, "Replace readme");
    assert_eq!(summary.short_id.len(), 7);
    assert!(tracker.list_file_status().unwrap().is_empty());
    assert!(!tracker.has_uncommitted_changes().unwrap());
}

#[test]
fn test_commit_message_is_stored_exactly() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    for (i, message) in [
        "Fix bug\n",
        "Subject\n\nBody paragraph.\n\nSecond paragraph.\n",
        "  padded  ",
        "Two newlines\n\n",
        "# not a comment",
    ]
    .into_iter()
    .enumerate()
    {
        std::fs::write(fx.work.join(format!("file{i}.txt")), "x\n").unwrap();
        let summary = tracker.commit(message, &identity()).unwrap();
        assert_eq!(summary.message, message);

        let logged = tracker.list_commits(None, Some(1)).unwrap().to_vec().unwrap();
        assert_eq!(logged[0].message, message);
    }
}

// --- Listings ---

#[test]
fn test_list_commits_newest_first_and_restartable() {
    let fx = RepoFixture::new();
    commit_file(&fx.work, "a.txt", "a\n", "Second");
    commit_file(&fx.work, "b.txt", "b\n", "Third");
    let tracker = fx.tracker(CountingTransport::default());

    let log = tracker.list_commits(None, Some(2)).unwrap();
    let subjects = |log: &crate::sync::log::CommitLog| -> Vec<String> {
        log.iter()
            .unwrap()
            .map(|c| c.unwrap().subject().to_string())
            .collect()
    };
    assert_eq!(subjects(&log), ["Third", "Second"]);
    assert_eq!(subjects(&log), ["Third", "Second"]);

    let all = tracker.list_commits(Some("main"), None).unwrap().to_vec().unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_list_commits_unknown_branch() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let Err(err) = tracker.list_commits(Some("nope"), None) else {
        panic!("expected BranchNotFound");
    };
    assert!(matches!(
        sync_error(&err),
        SyncError::BranchNotFound { branch } if branch == "nope"
    ));
}

#[test]
fn test_list_branches() {
    let fx = RepoFixture::new();
    run_git(&fx.work, &["branch", "feature"]);
    let tracker = fx.tracker(CountingTransport::default());

    assert_eq!(tracker.list_branches().unwrap(), ["feature", "main"]);
}

#[test]
fn test_divergent_files_split_by_side() {
    let (fx, ..) = diverged("local.txt", "remote.txt");
    let tracker = fx.tracker(CountingTransport::default());

    let files = tracker.compute_divergent_files().unwrap();
    assert_eq!(
        files.local,
        vec![FileStatusEntry::new("local.txt", FileState::New)]
    );
    assert_eq!(
        files.remote,
        vec![FileStatusEntry::new("remote.txt", FileState::New)]
    );
    assert!(files.overlapping().is_empty());
}

#[test]
fn test_divergent_files_swap_symmetry() {
    let (fx, base, local, remote) = diverged("local.txt", "remote.txt");

    let forward = divergent_files(&fx.work, oid(&base), oid(&local), oid(&remote)).unwrap();
    let swapped = divergent_files(&fx.work, oid(&base), oid(&remote), oid(&local)).unwrap();

    assert_eq!(forward.local, swapped.remote);
    assert_eq!(forward.remote, swapped.local);
}

#[test]
fn test_divergent_files_same_edit_on_both_sides() {
    let (fx, ..) = diverged("shared.txt", "shared.txt");
    let tracker = fx.tracker(CountingTransport::default());

    let files = tracker.compute_divergent_files().unwrap();
    assert_eq!(files.overlapping(), vec!["shared.txt"]);
}

#[test]
fn test_divergent_files_without_upstream() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let err = tracker.compute_divergent_files().unwrap_err();
    assert!(matches!(sync_error(&err), SyncError::NoUpstream { .. }));
}

// --- Remote configuration ---

#[test]
fn test_configure_remote_is_idempotent() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    tracker.configure_remote("/srv/git/project.git").unwrap();
    tracker.configure_remote("/srv/git/project.git").unwrap();

    let remote = tracker.remote().unwrap().unwrap();
    assert_eq!(remote.url, "/srv/git/project.git");
    assert_eq!(
        get_config(&fx.work, "branch.main.merge").unwrap().as_deref(),
        Some("refs/heads/main")
    );

    tracker.configure_remote("/srv/git/moved.git").unwrap();
    assert_eq!(tracker.remote().unwrap().unwrap().url, "/srv/git/moved.git");
}

#[test]
fn test_configure_remote_rejects_empty_url() {
    let fx = RepoFixture::new();
    let tracker = fx.tracker(CountingTransport::default());

    let err = tracker.configure_remote("   ").unwrap_err();
    let LcError::Config(config) = &err else {
        panic!("expected a config error, got {err}");
    };
    assert!(matches!(**config, ConfigError::InvalidValue { .. }));
}

#[tokio::test]
async fn test_configure_remote_new_url_drops_stale_tracking_refs() {
    let fx = remote_ahead();
    let tracker = fx.tracker(CountingTransport::default());
    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::RemoteAhead);

    let fresh = tempfile::tempdir().unwrap();
    run_git(fresh.path(), &["init", "-q", "--bare"]);
    let url = fresh.path().display().to_string();
    tracker.configure_remote(&url).unwrap();

    assert_eq!(tracker.remote().unwrap().unwrap().url, url);
    assert_eq!(
        run_git(&fx.work, &["for-each-ref", "refs/remotes/origin/"]),
        ""
    );
    let d = tracker.divergence().unwrap();
    assert_eq!(d.state, SyncState::Unknown);
    assert_eq!(d.upstream.as_deref(), Some("refs/remotes/origin/main"));

    tracker.push().await.unwrap();
    assert_eq!(tracker.transport().calls(), (0, 1));
}

// --- Conflicts outside a merge ---

#[tokio::test]
async fn test_cherry_pick_conflict_is_conflicted() {
    let fx = RepoFixture::new();
    run_git(&fx.work, &["checkout", "-q", "-b", "other"]);
    let theirs = commit_file(&fx.work, "level.txt", "theirs\n", "Their level");
    run_git(&fx.work, &["checkout", "-q", "main"]);
    commit_file(&fx.work, "level.txt", "ours\n", "Our level");

    let status = std::process::Command::new("git")
        .args(["cherry-pick", &theirs])
        .current_dir(&fx.work)
        .output()
        .unwrap()
        .status;
    assert!(!status.success());
    assert!(!fx.work.join(".git/MERGE_HEAD").exists());

    let tracker = fx.tracker(CountingTransport::default());
    assert!(tracker.has_unresolved_conflicts().unwrap());
    assert_eq!(tracker.compute_sync_state().unwrap(), SyncState::Conflicted);
    assert!(matches!(
        sync_error(&tracker.push().await.unwrap_err()),
        SyncError::UnresolvedConflicts
    ));
    assert!(matches!(
        sync_error(&tracker.merge(&identity()).unwrap_err()),
        SyncError::UnresolvedConflicts
    ));
    assert_eq!(tracker.transport().calls(), (0, 0));
}

// --- Threading ---

#[test]
fn test_tracker_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<super::SyncStateTracker<crate::git::backend::ShellBackend>>();
    assert_send_sync::<super::SyncStateTracker<CountingTransport>>();
    assert_send_sync::<crate::sync::handle::RepositoryHandle>();
}
