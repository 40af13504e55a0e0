use std::path::Path;

use chrono::Local;
use tracing::{info, warn};

use crate::backup::{print_job_details, BackupRunner};
use crate::cli::commands::select_jobs;
use crate::config::load::load_config;
use crate::config::state::{load_state, save_state};
use crate::error::Result;
use crate::mount::SystemMounter;
use crate::types::RunMode;
use crate::util::command::ProcessExecutor;

pub struct BackupOptions<'a> {
    pub config_path: &'a Path,
    pub state_path: &'a Path,
    pub selected_jobs: &'a [String],
    pub print_order: bool,
    pub due_only: bool,
    pub rsync_path: Option<&'a Path>,
    pub run_mode: RunMode,
}

pub fn run_backup_command(opts: &BackupOptions<'_>) -> Result<()> {
    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));

    let mut jobs = select_jobs(load_config(opts.config_path)?, opts.selected_jobs)?;
    let mut state = load_state(opts.state_path)?;
    state.apply(&mut jobs);

    if opts.due_only {
        let now = Local::now();
        jobs.retain(|job| {
            let due = job.is_due(&now);
            if !due {
                info!(job = %job.display_name(), "not due yet");
            }
            due
        });
        if jobs.is_empty() {
            println!("no jobs due");
            return Ok(());
        }
    }

    if opts.print_order {
        for job in &jobs {
            print_job_details(job);
        }
        return Ok(());
    }
    if opts.run_mode.verbose {
        println!(
            "loaded config {} with {} job(s)",
            opts.config_path.display(),
            jobs.len()
        );
    }

    let executor = match opts.rsync_path {
        Some(path) => ProcessExecutor::with_program(path),
        None => ProcessExecutor::new(),
    };
    let result = BackupRunner::new(&SystemMounter, &executor, opts.run_mode).run_all(&mut jobs);

    if !opts.run_mode.dry_run {
        state.record(&jobs);
        if let Err(err) = save_state(opts.state_path, &state) {
            warn!(error = %err, "could not record last backup times");
        }
    }
    let report = result?;
    info!(jobs = report.completed.len(), "all backups finished");
    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));
    Ok(())
}
