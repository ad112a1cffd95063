// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `options` and `inis` commands.

use crate::config::Config;
use crate::config::loader::ConfigLoader;

/// Print every resolved option, sorted by key.
pub fn run_options_command(config: &Config) {
    config
        .format_options()
        .iter()
        .for_each(|line| println!("{line}"));
}

/// Print the config files that contribute to the resolved options.
pub fn run_inis_command(loader: &ConfigLoader) {
    let files = loader.format_loaded_files();
    if files.is_empty() {
        println!("No configuration files loaded (defaults and LCSYNC_* only)");
    }
    files.iter().for_each(|line| println!("{line}"));
}
