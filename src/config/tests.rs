// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Config, ConfigLoader};
use crate::logging::LogLevel;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();
    insta::assert_debug_snapshot!(config.format_options(), @r#"
    [
        "global.file_log_level     = 5",
        "global.log_file           = ",
        "global.log_json           = false",
        "global.output_log_level   = 3",
        "identity.file             = ",
        "remote.name               = origin",
        "remote.url                = ",
        "sync.fetch_on_poll        = true",
        "sync.log_limit            = 50",
        "sync.network_timeout_secs = 30",
        "sync.poll_interval_secs   = 2",
    ]
    "#);
    assert!(config.validate().is_ok());
    assert_eq!(config.log_file(), None);
}

#[test]
fn test_format_options_shows_numeric_log_levels() {
    let config = Config::parse("[global]\noutput_log_level = 4\nfile_log_level = 6\n").unwrap();
    let levels: Vec<String> = config
        .format_options()
        .into_iter()
        .filter(|line| line.contains("log_level"))
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    assert_eq!(
        levels,
        ["global.file_log_level = 6", "global.output_log_level = 4"]
    );
}

#[test]
fn test_config_parse() {
    let toml = r#"
[global]
output_log_level = 4
log_file = "logs/lcsync.log"

[remote]
name = "upstream"
url = "git@example.com:team/level.git"

[sync]
poll_interval_secs = 10
network_timeout_secs = 5
log_limit = 0
"#;

    let config = Config::parse(toml).unwrap();
    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(config.log_file(), Some(Path::new("logs/lcsync.log")));
    assert_eq!(config.remote.name, "upstream");
    assert_eq!(config.poll_interval(), Duration::from_secs(10));
    assert_eq!(config.network_timeout(), Duration::from_secs(5));
    assert_eq!(config.log_limit(), None);

    let options = config.tracker_options();
    assert_eq!(options.remote(), "upstream");
    assert_eq!(options.network_timeout(), Duration::from_secs(5));
}

#[test]
fn test_config_rejects_unknown_keys() {
    let err = Config::parse("[sync]\npoll_every = 3\n").unwrap_err();
    assert!(err.to_string().contains("poll_every"), "{err}");

    assert!(Config::parse("[network]\ntimeout = 3\n").is_err());
}

#[test]
fn test_config_rejects_invalid_values() {
    let err = Config::parse("[sync]\nnetwork_timeout_secs = 0\n").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'network_timeout_secs' in section '[sync]': must be at least 1"
    );

    assert!(Config::parse("[sync]\npoll_interval_secs = 0\n").is_err());
    assert!(Config::parse("[remote]\nname = \"my remote\"\n").is_err());
    assert!(Config::parse("[global]\noutput_log_level = 9\n").is_err());
}

#[test]
fn test_identity_store_location() {
    let config = Config::default();
    let store = config.identity_store(Path::new("/repo/.git"));
    assert_eq!(
        store.path(),
        Path::new("/repo/.git").join("lcsync").join("identity.json")
    );

    let config = Config::parse("[identity]\nfile = \"/home/me/identity.json\"\n").unwrap();
    let store = config.identity_store(Path::new("/repo/.git"));
    assert_eq!(store.path(), Path::new("/home/me/identity.json"));
}

#[test]
fn test_config_loader_tracks_files() {
    let loader = ConfigLoader::new()
        .add_toml_str("[sync]\n log_limit = 10")
        .add_toml_file_optional("/nonexistent/optional.toml");

    insta::assert_debug_snapshot!(loader.format_loaded_files(), @r#"
    [
        "1. [string] <string>",
    ]
    "#);
}

#[test]
fn test_config_loader_later_files_win() {
    let mut first = NamedTempFile::new().expect("failed to create temp file");
    writeln!(first, "[sync]\nlog_limit = 10\npoll_interval_secs = 7").expect("failed to write");
    let mut second = NamedTempFile::new().expect("failed to create temp file");
    writeln!(second, "[sync]\nlog_limit = 20").expect("failed to write");

    let config = ConfigLoader::new()
        .add_toml_file(first.path())
        .add_toml_file(second.path())
        .build()
        .unwrap();

    assert_eq!(config.sync.log_limit, 20);
    assert_eq!(config.sync.poll_interval_secs, 7);
}

#[test]
fn test_config_loader_missing_required_file() {
    let result = ConfigLoader::new()
        .add_toml_file("/nonexistent/lcsync.toml")
        .build();
    assert!(result.is_err());
}

#[test]
fn test_config_loader_invalid_toml() {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    writeln!(file, "this is not valid toml {{{{{{").expect("failed to write");

    let result = ConfigLoader::new().add_toml_file(file.path()).build();
    assert!(result.is_err(), "build should fail with invalid TOML");
}

#[test]
fn test_config_loader_with_env_prefix() {
    // SAFETY: the variable name is unique to this test
    unsafe {
        std::env::set_var("LCTESTENV_SYNC__POLL_INTERVAL_SECS", "9");
    }

    let config = ConfigLoader::new()
        .add_toml_str("[sync]\npoll_interval_secs = 3")
        .with_env_prefix("LCTESTENV")
        .build()
        .expect("build should succeed");

    // SAFETY: same as above
    unsafe {
        std::env::remove_var("LCTESTENV_SYNC__POLL_INTERVAL_SECS");
    }

    assert_eq!(config.sync.poll_interval_secs, 9);
}

#[test]
fn test_config_loader_set_override() {
    let config = ConfigLoader::new()
        .add_toml_str("[remote]\nname = \"origin\"")
        .set("remote.name", "mirror")
        .expect("set should succeed")
        .set("sync.network_timeout_secs", 12_i64)
        .expect("set should succeed")
        .build()
        .unwrap();

    assert_eq!(config.remote.name, "mirror");
    assert_eq!(config.network_timeout(), Duration::from_secs(12));
}
