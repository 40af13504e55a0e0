use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ink", version, about = "Scheduled rsync backups onto a (removable) backup volume")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, global = true)]
    pub dry_run: bool,
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,
    /// Run only the named job(s); repeatable.
    #[arg(long, global = true)]
    pub job: Vec<String>,

    /// Print the selected jobs in execution order and exit.
    #[arg(long)]
    pub print_order: bool,
    /// Skip jobs whose last backup is newer than their frequency.
    #[arg(long)]
    pub due_only: bool,
    /// rsync binary to run instead of the one on PATH.
    #[arg(long)]
    pub rsync_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Backup,
    /// Mount the backup volumes of the selected jobs.
    Mount,
    /// Unmount the backup volumes of the selected jobs.
    #[command(alias = "unmount")]
    Umount,
}
