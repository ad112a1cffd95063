// lcsync: Local Collaborate - git sync state tracker
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> ConfigLoader --> Logging --> Command Dispatch
//!   Init | Remote | Identity | Sync | Log | Files | Diverged | Branches | Watch
//! ```

use std::process::ExitCode;

use tracing::Instrument;

use lcsync::cli::global::GlobalOptions;
use lcsync::cli::{self, Command};
use lcsync::cmd::config::{run_inis_command, run_options_command};
use lcsync::cmd::inspect::{
    run_branches_command, run_diverged_command, run_files_command, run_log_command,
};
use lcsync::cmd::sync::{
    run_identity_command, run_init_command, run_remote_command, run_sync_command,
};
use lcsync::cmd::watch::run_watch_command;
use lcsync::config::Config;
use lcsync::config::loader::ConfigLoader;
use lcsync::error::exit_code;
use lcsync::logging::{LogConfig, init_logging, repo_span};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let loader = match build_config_loader(&cli.global) {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    if matches!(cli.command, Some(Command::Inis)) {
        run_inis_command(&loader);
        return ExitCode::SUCCESS;
    }

    let config = match loader.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&build_log_config(&config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let span = repo_span(&cli.global.repo);
    match dispatch_command(&cli, &config).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(config.log_file())
        .with_json_file(config.global.log_json)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: &Config) -> lcsync::error::Result<()> {
    let repo = cli.global.repo.as_path();
    match &cli.command {
        Some(Command::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        // Handled before the config is built.
        Some(Command::Inis) => Ok(()),
        Some(Command::Init(args)) => run_init_command(args, config, repo),
        Some(Command::Remote(args)) => run_remote_command(args, config, repo),
        Some(Command::Identity(args)) => run_identity_command(args, config, repo),
        Some(Command::Sync(args)) => run_sync_command(args, config, repo).await,
        Some(Command::Log(args)) => run_log_command(args, config, repo),
        Some(Command::Files) => run_files_command(config, repo),
        Some(Command::Diverged) => run_diverged_command(config, repo),
        Some(Command::Branches) => run_branches_command(config, repo),
        Some(Command::Watch(args)) => run_watch_command(args, config, repo).await,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    }
}

/// Sources in increasing precedence: `lcsync.toml`, `--config` files,
/// `LCSYNC_*` environment, CLI flags.
fn build_config_loader(global: &GlobalOptions) -> lcsync::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional("lcsync.toml");
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix("LCSYNC");
    for (key, value) in global.to_config_overrides() {
        loader = loader.set(key, value)?;
    }
    Ok(loader)
}
