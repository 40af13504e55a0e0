use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Command};
use crate::cli::commands::{backup, exit_for_error, mount};
use crate::types::RunMode;

const CONFIG_FILE: &str = "/etc/ink.yaml";
const STATE_FILE: &str = "/var/lib/ink/state.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod args;
pub mod commands;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    print_banner();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let state_path = cli.state.clone().unwrap_or_else(|| PathBuf::from(STATE_FILE));
    let run_mode = RunMode {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };

    let result = match cli.command.unwrap_or(Command::Backup) {
        Command::Backup => backup::run_backup_command(&backup::BackupOptions {
            config_path: &config_path,
            state_path: &state_path,
            selected_jobs: &cli.job,
            print_order: cli.print_order,
            due_only: cli.due_only,
            rsync_path: cli.rsync_path.as_deref(),
            run_mode,
        }),
        Command::Mount => mount::run_mount(&config_path, &cli.job, run_mode),
        Command::Umount => mount::run_umount(&config_path, &cli.job, run_mode),
    };
    if let Err(err) = result {
        exit_for_error(&err);
    }
    Ok(())
}

fn print_banner() {
    println!("Ink {}", VERSION);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
