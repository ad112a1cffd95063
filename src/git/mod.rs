// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!          Public API
//!   query.rs  cmd.rs  status.rs
//!        \      |      /
//!         v     v     v
//!      ,------------------,
//!      | backend (traits) |
//!      '--+----------+----'
//!         |          |
//!         v          v
//!   GitQuery       GitMutation
//!   CommitGraph    GitTransport
//!   (gix, read)    (CLI, write/net)
//!         |          |
//!         v          v
//!    GixBackend  ShellBackend
//!    .head_id    .commit/.merge
//!    .rev-walk   .fetch/.push
//!    .merge_base .status/.diff
//! ```
//!
//! **`GixBackend`**: pure Rust, no subprocess, read-only.
//! **`ShellBackend`**: git CLI for writes, network and porcelain output.

pub mod backend;
pub mod cmd;
pub mod query;
pub mod status;
