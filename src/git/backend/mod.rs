// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery     (read, path)   --> GixBackend   (pure Rust gix)
//! CommitGraph  (read, graph)  --> GixBackend   (rev-walk, merge-base)
//! GitMutation  (write, local) --> ShellBackend (git CLI)
//! GitTransport (network)      --> ShellBackend (git CLI, async, timeout)
//! ```

use crate::error::{GitError, GixError, LcResult};
use crate::sync::types::CommitSummary;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, trace};

use gix::ObjectId;

// --- Query Trait (Read-only operations) ---

/// Read-only git query operations keyed by path.
pub trait GitQuery {
    /// Check if path is inside a git work tree.
    fn is_git_repo(path: &Path) -> bool;

    /// Get current branch name (None if HEAD is detached).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or head resolution fails.
    fn current_branch(path: &Path) -> LcResult<Option<String>>;

    /// Check for uncommitted changes (staged, unstaged, or untracked files).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository discovery or status check fails.
    fn has_uncommitted_changes(path: &Path) -> LcResult<bool>;
}

// --- Commit Graph Trait ---

/// Commit-graph queries against an open repository.
pub trait CommitGraph {
    /// Resolve a full reference name to the commit it points at.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reference store cannot be read or the
    /// reference is symbolic.
    fn resolve_ref(repo: &gix::Repository, name: &str) -> LcResult<Option<ObjectId>>;

    /// Commit HEAD points at, None for an unborn branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if HEAD cannot be read.
    fn head_id(repo: &gix::Repository) -> LcResult<Option<ObjectId>>;

    /// Number of commits reachable from `tip` but not from `hidden`
    /// (all of `tip`'s history when `hidden` is None).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit walk fails.
    fn count_exclusive(
        repo: &gix::Repository,
        tip: ObjectId,
        hidden: Option<ObjectId>,
    ) -> LcResult<usize>;

    /// Best common ancestor of two commits, None if the histories are unrelated.
    fn merge_base(repo: &gix::Repository, one: ObjectId, two: ObjectId) -> Option<ObjectId>;

    /// Decode a commit into a log entry.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the object is missing or not a commit.
    fn commit_summary(repo: &gix::Repository, id: ObjectId) -> LcResult<CommitSummary>;
}

// --- Mutation Trait (Local write operations) ---

/// Git operations that modify local repository state.
///
/// These go through the git CLI so hooks, attributes and merge drivers behave
/// exactly as they do for a user at the terminal.
pub trait GitMutation {
    /// Initialize a new repository.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if repository initialization fails.
    fn init_repo(path: &Path) -> LcResult<()>;

    /// Add a remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be added.
    fn add_remote(repo_path: &Path, name: &str, url: &str) -> LcResult<()>;

    /// Remove a remote together with its remote-tracking refs and the
    /// branch settings that point at it.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote does not exist.
    fn remove_remote(repo_path: &Path, name: &str) -> LcResult<()>;

    /// Set git config value.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the config value cannot be set.
    fn set_config(repo_path: &Path, key: &str, value: &str) -> LcResult<()>;

    /// Read a git config value (None if unset).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if git fails for a reason other than a missing key.
    fn get_config(repo_path: &Path, key: &str) -> LcResult<Option<String>>;

    /// Stage every change in the working tree, including deletions.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git add` fails.
    fn stage_all(repo_path: &Path) -> LcResult<()>;

    /// Create a commit from the index with the given author/committer.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git commit` fails.
    fn commit(repo_path: &Path, message: &str, name: &str, email: &str) -> LcResult<()>;

    /// Merge `what` into HEAD. Returns false if git stopped with conflicts.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the merge fails for any reason other than
    /// content conflicts.
    fn merge(repo_path: &Path, what: &str, name: &str, email: &str) -> LcResult<bool>;

    /// Raw `git status --porcelain=v1 -z` output.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git status` fails.
    fn status_porcelain(repo_path: &Path) -> LcResult<String>;

    /// Raw `git diff --name-status -z` output between two commits.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git diff` fails.
    fn diff_name_status(repo_path: &Path, from: &str, to: &str) -> LcResult<String>;

    /// Paths with unresolved conflicts.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git diff` fails.
    fn unmerged_paths(repo_path: &Path) -> LcResult<Vec<String>>;

    /// Local branch names.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if `git for-each-ref` fails.
    fn local_branches(repo_path: &Path) -> LcResult<Vec<String>>;
}

// --- Transport Trait (Network operations) ---

/// Network operations. Implementors must honour `timeout`.
pub trait GitTransport: Send + Sync {
    /// Fetch all refs of `remote`, updating remote-tracking refs only.
    fn fetch(
        &self,
        repo_path: &Path,
        remote: &str,
        timeout: Duration,
    ) -> impl Future<Output = LcResult<()>> + Send;

    /// Push `refspec` to `remote`; with `set_upstream` record the tracking
    /// branch as well.
    fn push(
        &self,
        repo_path: &Path,
        remote: &str,
        refspec: &str,
        set_upstream: bool,
        timeout: Duration,
    ) -> impl Future<Output = LcResult<()>> + Send;
}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
///
/// Provides read-only operations without spawning subprocesses.
pub struct GixBackend;

impl GitQuery for GixBackend {
    fn is_git_repo(path: &Path) -> bool {
        gix::discover(path).is_ok()
    }

    fn current_branch(path: &Path) -> LcResult<Option<String>> {
        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
        let head = repo
            .head_name()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.map(|name| name.shorten().to_string()))
    }

    fn has_uncommitted_changes(path: &Path) -> LcResult<bool> {
        use gix::status::UntrackedFiles;

        let repo =
            gix::discover(path).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;

        let has_changes = repo
            .status(gix::progress::Discard)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to prepare status check".to_string(),
            })?
            .untracked_files(UntrackedFiles::Files)
            .into_iter(None)
            .map_err(|_| GitError::CommandFailed {
                command: "status".to_string(),
                message: "failed to check repository status".to_string(),
            })?
            .next()
            .is_some();

        Ok(has_changes)
    }
}

impl CommitGraph for GixBackend {
    fn resolve_ref(repo: &gix::Repository, name: &str) -> LcResult<Option<ObjectId>> {
        let Some(reference) = repo
            .try_find_reference(name)
            .map_err(|e| GitError::Gix(GixError::FindReference(e)))?
        else {
            return Ok(None);
        };
        let id = reference.try_id().ok_or_else(|| GitError::SymbolicReference {
            name: name.to_string(),
        })?;
        Ok(Some(id.detach()))
    }

    fn head_id(repo: &gix::Repository) -> LcResult<Option<ObjectId>> {
        let head = repo
            .head()
            .map_err(|e| GitError::Gix(GixError::Head(e)))?;
        Ok(head.id().map(gix::Id::detach))
    }

    fn count_exclusive(
        repo: &gix::Repository,
        tip: ObjectId,
        hidden: Option<ObjectId>,
    ) -> LcResult<usize> {
        if hidden == Some(tip) {
            return Ok(0);
        }
        let walk = repo
            .rev_walk([tip])
            .with_hidden(hidden)
            .all()
            .map_err(|e| GitError::Gix(GixError::traverse("failed to start commit walk", e)))?;

        let mut count = 0;
        for info in walk {
            info.map_err(|e| GitError::Gix(GixError::traverse("commit walk failed", e)))?;
            count += 1;
        }
        Ok(count)
    }

    fn merge_base(repo: &gix::Repository, one: ObjectId, two: ObjectId) -> Option<ObjectId> {
        if one == two {
            return Some(one);
        }
        match repo.merge_base(one, two) {
            Ok(id) => Some(id.detach()),
            Err(e) => {
                debug!(%one, %two, error = %e, "no merge base");
                None
            }
        }
    }

    fn commit_summary(repo: &gix::Repository, id: ObjectId) -> LcResult<CommitSummary> {
        let commit = repo
            .find_commit(id)
            .map_err(|e| GitError::Gix(GixError::traverse("failed to find commit", e)))?;
        let author = commit
            .author()
            .map_err(|e| GitError::Gix(GixError::traverse("failed to decode author", e)))?
            .name
            .to_string();
        // `commit` always stores the message plus one newline.
        let raw = commit.message_raw_sloppy().to_string();
        let message = raw.strip_suffix('\n').unwrap_or(&raw).to_string();

        Ok(CommitSummary {
            short_id: id.to_hex_with_len(7).to_string(),
            author,
            message,
        })
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Resolved path of the git executable.
static GIT_EXECUTABLE: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Shell-based git backend using the git CLI.
///
/// Used for:
/// - Anything that writes the index, working tree or config
/// - Fetch and push (credential helpers, SSH agents)
/// - Status and tree diffs in porcelain form
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBackend;

impl ShellBackend {
    /// Locate git on PATH once per process.
    ///
    /// # Errors
    ///
    /// Returns `GitError::GitNotFound` if git is not installed.
    pub fn git_executable() -> LcResult<&'static Path> {
        GIT_EXECUTABLE
            .get_or_init(|| which::which("git").ok())
            .as_deref()
            .ok_or_else(|| GitError::GitNotFound.into())
    }

    /// Base command: non-interactive, fixed locale.
    /// ALWAYS sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    fn base_command(args: &[&str], cwd: &Path) -> LcResult<std::process::Command> {
        let mut command = std::process::Command::new(Self::git_executable()?);
        command
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C");
        Ok(command)
    }

    /// Run git and return the raw process output regardless of exit status.
    fn git_output(
        args: &[&str],
        cwd: &Path,
        envs: &[(&str, &str)],
    ) -> LcResult<Output> {
        debug!(cwd = %cwd.display(), cmd = %format!("git {}", args.join(" ")), "exec");
        let output = Self::base_command(args, cwd)?
            .envs(envs.iter().copied())
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;
        trace!(
            status = ?output.status.code(),
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "git finished"
        );
        Ok(output)
    }

    fn command_failed(args: &[&str], output: &Output) -> GitError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            message,
        }
    }

    /// Execute a git command, returning untrimmed stdout.
    fn git_command_raw(args: &[&str], cwd: &Path) -> LcResult<String> {
        let output = Self::git_output(args, cwd, &[])?;
        if !output.status.success() {
            return Err(Self::command_failed(args, &output).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Execute a git command, returning trimmed stdout.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> LcResult<String> {
        Self::git_command_raw(args, cwd).map(|s| s.trim().to_string())
    }

    /// Execute a network git command with a deadline; the child is killed
    /// if the deadline passes.
    pub(crate) async fn git_command_timeout(
        args: &[&str],
        cwd: &Path,
        timeout: Duration,
    ) -> LcResult<String> {
        let command_line = format!("git {}", args.join(" "));
        debug!(cwd = %cwd.display(), cmd = %command_line, timeout_secs = timeout.as_secs(), "exec");

        let mut command = tokio::process::Command::from(Self::base_command(args, cwd)?);
        command.kill_on_drop(true);

        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| GitError::Timeout {
                command: command_line.clone(),
                timeout_secs: timeout.as_secs(),
            })?
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        if !output.status.success() {
            return Err(Self::command_failed(args, &output).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn identity_env<'a>(name: &'a str, email: &'a str) -> [(&'static str, &'a str); 4] {
        [
            ("GIT_AUTHOR_NAME", name),
            ("GIT_AUTHOR_EMAIL", email),
            ("GIT_COMMITTER_NAME", name),
            ("GIT_COMMITTER_EMAIL", email),
        ]
    }
}

impl GitMutation for ShellBackend {
    fn init_repo(path: &Path) -> LcResult<()> {
        Self::git_command(&["init", "--quiet"], path)?;
        Ok(())
    }

    fn add_remote(repo_path: &Path, name: &str, url: &str) -> LcResult<()> {
        Self::git_command(&["remote", "add", name, url], repo_path)?;
        Ok(())
    }

    fn remove_remote(repo_path: &Path, name: &str) -> LcResult<()> {
        Self::git_command(&["remote", "remove", name], repo_path)?;
        // Refs outside the remote's fetch refspec survive `remote remove`.
        let prefix = format!("refs/remotes/{name}/");
        let leftovers =
            Self::git_command(&["for-each-ref", "--format=%(refname)", &prefix], repo_path)?;
        for refname in leftovers.lines() {
            Self::git_command(&["update-ref", "-d", refname], repo_path)?;
        }
        Ok(())
    }

    fn set_config(repo_path: &Path, key: &str, value: &str) -> LcResult<()> {
        Self::git_command(&["config", key, value], repo_path)?;
        Ok(())
    }

    fn get_config(repo_path: &Path, key: &str) -> LcResult<Option<String>> {
        let args = ["config", "--get", key];
        let output = Self::git_output(&args, repo_path, &[])?;
        match output.status.code() {
            Some(0) => Ok(Some(
                String::from_utf8_lossy(&output.stdout).trim().to_string(),
            )),
            // exit 1: key not set
            Some(1) => Ok(None),
            _ => Err(Self::command_failed(&args, &output).into()),
        }
    }

    fn stage_all(repo_path: &Path) -> LcResult<()> {
        Self::git_command(&["add", "--all", "--", "."], repo_path)?;
        Ok(())
    }

    fn commit(repo_path: &Path, message: &str, name: &str, email: &str) -> LcResult<()> {
        // git completes an unterminated `-m` line, so terminate it ourselves
        // and a trailing newline in `message` survives.
        let message = format!("{message}\n");
        let args = [
            "commit",
            "--quiet",
            "--no-verify",
            "--cleanup=verbatim",
            "-m",
            &message,
        ];
        let output = Self::git_output(&args, repo_path, &Self::identity_env(name, email))?;
        if !output.status.success() {
            return Err(Self::command_failed(&args, &output).into());
        }
        Ok(())
    }

    fn merge(repo_path: &Path, what: &str, name: &str, email: &str) -> LcResult<bool> {
        let args = ["merge", "--no-edit", "--no-stat", what];
        let output = Self::git_output(&args, repo_path, &Self::identity_env(name, email))?;
        if output.status.success() {
            return Ok(true);
        }
        if Self::unmerged_paths(repo_path)?.is_empty() {
            return Err(Self::command_failed(&args, &output).into());
        }
        Ok(false)
    }

    fn status_porcelain(repo_path: &Path) -> LcResult<String> {
        Self::git_command_raw(
            &["status", "--porcelain=v1", "-z", "--untracked-files=all"],
            repo_path,
        )
    }

    fn diff_name_status(repo_path: &Path, from: &str, to: &str) -> LcResult<String> {
        Self::git_command_raw(
            &["diff", "--name-status", "-z", "--no-renames", from, to, "--"],
            repo_path,
        )
    }

    fn unmerged_paths(repo_path: &Path) -> LcResult<Vec<String>> {
        let raw = Self::git_command_raw(
            &["diff", "--name-only", "-z", "--diff-filter=U"],
            repo_path,
        )?;
        let mut paths: Vec<String> = raw
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        paths.dedup();
        Ok(paths)
    }

    fn local_branches(repo_path: &Path) -> LcResult<Vec<String>> {
        let raw = Self::git_command(
            &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
            repo_path,
        )?;
        Ok(raw.lines().map(str::to_string).collect())
    }
}

impl GitTransport for ShellBackend {
    async fn fetch(&self, repo_path: &Path, remote: &str, timeout: Duration) -> LcResult<()> {
        Self::git_command_timeout(&["fetch", "--quiet", "--prune", remote], repo_path, timeout)
            .await?;
        Ok(())
    }

    async fn push(
        &self,
        repo_path: &Path,
        remote: &str,
        refspec: &str,
        set_upstream: bool,
        timeout: Duration,
    ) -> LcResult<()> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.extend([remote, refspec]);
        Self::git_command_timeout(&args, repo_path, timeout).await?;
        Ok(())
    }
}
