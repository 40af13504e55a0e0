use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{error, info, warn};

use crate::backup::rsync::build_args;
use crate::backup::strategy::{resolve, ResolvedStrategy};
use crate::config::model::BackupJob;
use crate::error::{InkError, JobError, Result};
use crate::mount::guard::MountGuard;
use crate::mount::VolumeMounter;
use crate::types::RunMode;
use crate::util::command::{format_command, CommandExecutor};
use crate::util::paths::is_single_component;

pub mod rsync;
pub mod strategy;

pub fn print_job_details(job: &BackupJob) {
    let show = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    };
    println!("job: {}", job.display_name());
    println!("  mode: {}", job.mode.as_str());
    println!("  source: {}", job.source_path.display());
    println!("  backup folder: {}", job.backup_folder.display());
    println!("  folder name: {}{}", job.folder_prefix, job.date_format);
    println!("  link: {}", show(&job.link_name));
    println!("  excludes: {}", show(&job.exclude_file));
    println!("  mount: {}", show(&job.mount_point));
    println!("  every: {}s", job.frequency_seconds);
}

/// Completed jobs of a batch, in execution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: Vec<String>,
}

/// Runs jobs one after another, stopping at the first failure.
pub struct BackupRunner<'a, M: VolumeMounter + ?Sized, E: CommandExecutor + ?Sized> {
    mounter: &'a M,
    executor: &'a E,
    run_mode: RunMode,
    clock: fn() -> DateTime<Local>,
}

impl<'a, M: VolumeMounter + ?Sized, E: CommandExecutor + ?Sized> BackupRunner<'a, M, E> {
    pub fn new(mounter: &'a M, executor: &'a E, run_mode: RunMode) -> Self {
        Self {
            mounter,
            executor,
            run_mode,
            clock: Local::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Runs every job in order. The first failing job aborts the batch; jobs
    /// after it are never started. Successful jobs get `last_backup_time`
    /// set unless this is a dry run.
    pub fn run_all(&self, jobs: &mut [BackupJob]) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for job in jobs.iter_mut() {
            let name = job.display_name().to_string();
            match self.run_job(job) {
                Ok(started) => {
                    if !self.run_mode.dry_run {
                        job.last_backup_time = Some(started);
                    }
                    report.completed.push(name);
                }
                Err(err) => {
                    error!(job = %name, error = %err, "backup failed; skipping remaining jobs");
                    return Err(InkError::job(name, err));
                }
            }
        }
        Ok(report)
    }

    fn run_job(&self, job: &BackupJob) -> std::result::Result<DateTime<Local>, JobError> {
        info!(job = %job.display_name(), mode = job.mode.as_str(), "starting backup");
        let _mount = self.prepare_volume(job)?;

        let now = (self.clock)();
        let strategy = resolve(job, &now)?;
        let args = build_args(job, &strategy)?;
        let command = format_command(&args);

        if self.run_mode.dry_run {
            println!("dry-run: {}", command);
            return Ok(now);
        }
        if self.run_mode.verbose {
            println!("{}", command);
        }
        info!(job = %job.display_name(), command = %command, "running rsync");

        let termination = self
            .executor
            .execute(&args, job.err_file.as_deref())
            .map_err(|source| JobError::SpawnFailure {
                program: args.program().to_string(),
                source,
            })?;
        if !termination.success() {
            return Err(JobError::SubprocessFailure(termination));
        }

        if job.mode.is_incremental() {
            if let Some(link_name) = &job.link_name {
                update_reference_link(job, link_name, &strategy)?;
            }
        }
        info!(
            job = %job.display_name(),
            destination = %strategy.destination_path.display(),
            "backup finished"
        );
        Ok(now)
    }

    /// Mounts the job's volume when it is not mounted yet. The guard is
    /// only returned for volumes this call mounted and the job asked to
    /// unmount afterwards.
    fn prepare_volume(
        &self,
        job: &BackupJob,
    ) -> std::result::Result<Option<MountGuard<'a, M>>, JobError> {
        let Some(mountpoint) = &job.mount_point else {
            return Ok(None);
        };
        let mounted = self
            .mounter
            .is_mounted(mountpoint)
            .map_err(|e| JobError::MountUnavailable(e.to_string()))?;
        if mounted {
            return Ok(None);
        }
        if self.run_mode.dry_run {
            println!("dry-run: mount {}", mountpoint.display());
            return Ok(None);
        }
        info!(mountpoint = %mountpoint.display(), "mounting backup volume");
        self.mounter
            .mount(job.volume_id.as_deref(), mountpoint)
            .map_err(|e| JobError::MountUnavailable(e.to_string()))?;
        Ok(job
            .unmount_after
            .then(|| MountGuard::new(self.mounter, mountpoint.clone())))
    }
}

/// Points `backup_folder/link_name` at the backup just written. A real
/// directory in the way is left untouched.
fn update_reference_link(
    job: &BackupJob,
    link_name: &Path,
    strategy: &ResolvedStrategy,
) -> std::result::Result<(), JobError> {
    let link = job.backup_folder.join(link_name);
    let target = match strategy.destination_path.strip_prefix(&job.backup_folder) {
        Ok(relative) if is_single_component(link_name) => relative.to_path_buf(),
        _ => strategy.destination_path.clone(),
    };
    let link_error = |e: io::Error| JobError::LinkUpdate {
        path: link.clone(),
        reason: e.to_string(),
    };

    match fs::symlink_metadata(&link) {
        Ok(meta) if meta.is_dir() => {
            warn!(link = %link.display(), "skip updating link (directory exists)");
            return Ok(());
        }
        Ok(_) => fs::remove_file(&link).map_err(link_error)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(link_error(err)),
    }
    symlink(&target, &link).map_err(link_error)?;
    Ok(())
}
