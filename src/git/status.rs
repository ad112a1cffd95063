// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parsers for NUL-separated git porcelain output.
//!
//! ```text
//! status --porcelain=v1 -z   "XY path\0"  ("XY new\0old\0" for R/C)
//! diff --name-status -z      "S\0path\0"
//! ```
//!
//! ```text
//! XY                          FileState
//! ??                          New
//! !!                          Ignored
//! DD AU UD UA DU AA UU        Conflicted
//! D in X or Y                 Deleted
//! A in X                      New
//! R/C in X                    New (+ Deleted for the source path)
//! anything else               Modified
//! ```

use crate::sync::types::{FileState, FileStatusEntry};

fn is_unmerged(x: char, y: char) -> bool {
    matches!(
        (x, y),
        ('D', 'D') | ('A', 'U') | ('U', 'D') | ('U', 'A') | ('D', 'U') | ('A', 'A') | ('U', 'U')
    )
}

fn classify_xy(x: char, y: char) -> FileState {
    match (x, y) {
        ('?', '?') => FileState::New,
        ('!', '!') => FileState::Ignored,
        _ if is_unmerged(x, y) => FileState::Conflicted,
        _ if x == 'D' || y == 'D' => FileState::Deleted,
        ('A' | 'R' | 'C', _) => FileState::New,
        _ => FileState::Modified,
    }
}

/// Parse `git status --porcelain=v1 -z` output.
///
/// Ignored entries are dropped. Malformed records are skipped.
#[must_use]
pub fn parse_status(raw: &str) -> Vec<FileStatusEntry> {
    let mut entries = Vec::new();
    let mut records = raw.split('\0').filter(|r| !r.is_empty());

    while let Some(record) = records.next() {
        let mut chars = record.chars();
        let (Some(x), Some(y), Some(' ')) = (chars.next(), chars.next(), chars.next()) else {
            continue;
        };
        let path = chars.as_str();
        if path.is_empty() {
            continue;
        }

        let state = classify_xy(x, y);
        if matches!(x, 'R' | 'C')
            && let Some(source) = records.next()
            && x == 'R'
        {
            entries.push(FileStatusEntry::new(source, FileState::Deleted));
        }
        if state != FileState::Ignored {
            entries.push(FileStatusEntry::new(path, state));
        }
    }

    entries
}

/// Parse `git diff --name-status -z --no-renames` output.
#[must_use]
pub fn parse_name_status(raw: &str) -> Vec<FileStatusEntry> {
    let mut entries = Vec::new();
    let mut fields = raw.split('\0').filter(|f| !f.is_empty());

    while let (Some(status), Some(path)) = (fields.next(), fields.next()) {
        let state = match status.chars().next() {
            Some('A') => FileState::New,
            Some('D') => FileState::Deleted,
            Some('U') => FileState::Conflicted,
            _ => FileState::Modified,
        };
        entries.push(FileStatusEntry::new(path, state));
    }

    entries
}
