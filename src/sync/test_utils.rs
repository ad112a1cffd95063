// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities for sync tests.
//!
//! Temporary repositories driven by the git CLI, scripted transports and
//! log capture.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use super::handle::RepositoryHandle;
use super::tracker::{SyncStateTracker, TrackerOptions};
use super::types::UserIdentity;
use crate::error::{GitError, LcResult};
use crate::git::backend::GitTransport;

/// Run git in `cwd`, panicking on failure. Returns trimmed stdout.
pub(crate) fn run_git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialize a repository on branch `main` with one commit (`README.md`).
pub(crate) fn init_repo_with_commit(dir: &Path) -> String {
    std::fs::create_dir_all(dir).expect("failed to create repo dir");
    run_git(dir, &["init", "-q"]);
    run_git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    run_git(dir, &["config", "user.name", "Test"]);
    run_git(dir, &["config", "user.email", "test@test.com"]);
    run_git(dir, &["config", "commit.gpgsign", "false"]);
    commit_file(dir, "README.md", "# Test\n", "Initial commit")
}

/// Write `name` and commit it. Returns the new commit id.
pub(crate) fn commit_file(dir: &Path, name: &str, content: &str, message: &str) -> String {
    std::fs::write(dir.join(name), content).expect("failed to write file");
    run_git(dir, &["add", name]);
    run_git(dir, &["commit", "-q", "-m", message]);
    run_git(dir, &["rev-parse", "HEAD"])
}

/// Point `refs/remotes/origin/main` at `id` and make it the upstream of
/// `main`, without any real remote behind it.
pub(crate) fn fake_upstream(dir: &Path, id: &str) {
    run_git(dir, &["config", "remote.origin.url", "/nonexistent/remote.git"]);
    run_git(dir, &["config", "branch.main.remote", "origin"]);
    run_git(dir, &["config", "branch.main.merge", "refs/heads/main"]);
    run_git(dir, &["update-ref", "refs/remotes/origin/main", id]);
}

/// One working copy in a temporary directory.
pub(crate) struct RepoFixture {
    _dir: TempDir,
    pub work: PathBuf,
}

impl RepoFixture {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let work = dir.path().join("work");
        init_repo_with_commit(&work);
        Self { _dir: dir, work }
    }

    pub(crate) fn tracker<T: GitTransport>(&self, transport: T) -> SyncStateTracker<T> {
        let handle = RepositoryHandle::open(&self.work).expect("failed to open fixture");
        SyncStateTracker::with_transport(handle, transport, TrackerOptions::default())
    }

    pub(crate) fn shared_tracker<T: GitTransport>(
        &self,
        transport: T,
    ) -> Arc<SyncStateTracker<T>> {
        Arc::new(self.tracker(transport))
    }
}

pub(crate) fn identity() -> UserIdentity {
    UserIdentity::new("Ada", "ada@example.com").expect("valid identity")
}

// --- Transports ---

/// Succeeds without touching the network and records calls.
#[derive(Debug, Default)]
pub(crate) struct CountingTransport {
    pub fetches: AtomicUsize,
    pub pushes: AtomicUsize,
    /// `(remote, refspec, set_upstream)` of every push.
    pub pushed: Mutex<Vec<(String, String, bool)>>,
}

impl CountingTransport {
    pub(crate) fn calls(&self) -> (usize, usize) {
        (
            self.fetches.load(Ordering::SeqCst),
            self.pushes.load(Ordering::SeqCst),
        )
    }
}

impl GitTransport for CountingTransport {
    async fn fetch(&self, _: &Path, _: &str, _: Duration) -> LcResult<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn push(
        &self,
        _: &Path,
        remote: &str,
        refspec: &str,
        set_upstream: bool,
        _: Duration,
    ) -> LcResult<()> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        self.pushed.lock().expect("push log poisoned").push((
            remote.to_string(),
            refspec.to_string(),
            set_upstream,
        ));
        Ok(())
    }
}

/// Fails every call the way an unreachable remote does.
#[derive(Debug, Default)]
pub(crate) struct FailingTransport;

impl FailingTransport {
    fn unreachable() -> GitError {
        GitError::CommandFailed {
            command: "git fetch".to_string(),
            message: "fatal: unable to access remote: Could not resolve host".to_string(),
        }
    }
}

impl GitTransport for FailingTransport {
    async fn fetch(&self, _: &Path, _: &str, _: Duration) -> LcResult<()> {
        Err(Self::unreachable().into())
    }

    async fn push(&self, _: &Path, _: &str, _: &str, _: bool, _: Duration) -> LcResult<()> {
        Err(Self::unreachable().into())
    }
}

/// Parks inside `fetch` until released, so tests can observe an operation
/// in flight.
pub(crate) struct BlockingTransport {
    entered: flume::Sender<()>,
    release: flume::Receiver<()>,
}

/// Test-side controls for a [`BlockingTransport`].
pub(crate) struct BlockingControl {
    pub entered: flume::Receiver<()>,
    pub release: flume::Sender<()>,
}

impl BlockingTransport {
    pub(crate) fn new() -> (Self, BlockingControl) {
        let (entered_tx, entered_rx) = flume::unbounded();
        let (release_tx, release_rx) = flume::unbounded();
        (
            Self {
                entered: entered_tx,
                release: release_rx,
            },
            BlockingControl {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }
}

impl GitTransport for BlockingTransport {
    async fn fetch(&self, _: &Path, _: &str, _: Duration) -> LcResult<()> {
        let _ = self.entered.send(());
        let _ = self.release.recv_async().await;
        Ok(())
    }

    async fn push(&self, _: &Path, _: &str, _: &str, _: bool, _: Duration) -> LcResult<()> {
        Ok(())
    }
}

// --- Log capture ---

#[derive(Clone)]
struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct BufferMakeWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferMakeWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Runs an async closure while capturing tracing output at `WARN` and above.
///
/// Returns the closure's value and the captured log output.
pub(crate) async fn run_with_logs<F, Fut, T>(f: F) -> Result<(T, String)>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(BufferMakeWriter {
            buffer: buffer.clone(),
        })
        .with_max_level(Level::WARN)
        .with_ansi(false)
        .with_target(false)
        .with_level(false)
        .finish();

    let _guard = tracing::subscriber::set_default(subscriber);
    let value = f().await;

    let guard = buffer
        .lock()
        .map_err(|_| anyhow::anyhow!("log buffer poisoned"))?;
    Ok((value, String::from_utf8_lossy(&guard).to_string()))
}
