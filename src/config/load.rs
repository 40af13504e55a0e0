use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::model::{BackupJob, Config, JobConfig, DEFAULT_DATE_FORMAT, DEFAULT_FREQUENCY_SECONDS};
use crate::error::{ConfigError, InkError, Result};
use crate::types::BackupMode;

pub fn load_config(path: &Path) -> Result<Vec<BackupJob>> {
    let mut contents = String::new();
    File::open(path)
        .map_err(|e| InkError::message(format!("open config {}: {}", path.display(), e)))?
        .read_to_string(&mut contents)
        .map_err(|e| InkError::message(format!("read config {}: {}", path.display(), e)))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Vec<BackupJob>> {
    let cfg: Config =
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    parse_jobs(cfg)
}

fn parse_jobs(cfg: Config) -> Result<Vec<BackupJob>> {
    if cfg.jobs.is_empty() {
        return Err(ConfigError::Invalid("no backup jobs configured".to_string()).into());
    }
    let mut names = HashSet::new();
    let mut jobs = Vec::with_capacity(cfg.jobs.len());
    for (index, job) in cfg.jobs.into_iter().enumerate() {
        let label = job
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1));
        if let Some(name) = &job.name {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("job {}: name is empty", label)).into());
            }
            if !names.insert(name.clone()) {
                return Err(ConfigError::Invalid(format!("duplicate job name {}", name)).into());
            }
        }
        jobs.push(
            parse_job(job).map_err(|e| ConfigError::Invalid(format!("job {}: {}", label, e)))?,
        );
    }
    Ok(jobs)
}

fn parse_job(job: JobConfig) -> std::result::Result<BackupJob, String> {
    if job.backup_folder.as_os_str().is_empty() {
        return Err("backupFolder is empty".to_string());
    }
    if job.source_path.as_os_str().is_empty() {
        return Err("sourcePath is empty".to_string());
    }
    let mode = BackupMode::parse(&job.mode)?;
    let date_format = match job.date_format {
        Some(format) if format.is_empty() => return Err("dateFormat is empty".to_string()),
        Some(format) => format,
        None => DEFAULT_DATE_FORMAT.to_string(),
    };
    if job.unmount_after && job.mount_point.is_none() {
        return Err("unmountAfter requires mountPoint".to_string());
    }
    Ok(BackupJob {
        name: job.name,
        mount_point: non_empty(job.mount_point),
        backup_folder: job.backup_folder,
        exclude_file: non_empty(job.exclude_file),
        log_file: non_empty(job.log_file),
        err_file: non_empty(job.err_file),
        source_path: job.source_path,
        link_name: non_empty(job.link_name),
        folder_prefix: job.folder_prefix.unwrap_or_default(),
        date_format,
        frequency_seconds: job.frequency_seconds.unwrap_or(DEFAULT_FREQUENCY_SECONDS),
        last_backup_time: None,
        volume_id: job.volume_id.filter(|id| !id.trim().is_empty()),
        mode,
        unmount_after: job.unmount_after,
    })
}

/// Empty strings in the file mean "unset".
fn non_empty(path: Option<std::path::PathBuf>) -> Option<std::path::PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}
