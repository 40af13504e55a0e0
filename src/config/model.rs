use std::path::PathBuf;

use chrono::{DateTime, Duration, Local, TimeZone};
use serde::Deserialize;

use crate::types::BackupMode;

pub const DEFAULT_DATE_FORMAT: &str = "%Y.%m.%d";
pub const DEFAULT_FREQUENCY_SECONDS: u64 = 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JobConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "mountPoint")]
    pub mount_point: Option<PathBuf>,
    #[serde(rename = "backupFolder")]
    pub backup_folder: PathBuf,
    #[serde(default, rename = "excludeFile")]
    pub exclude_file: Option<PathBuf>,
    #[serde(default, rename = "logFile")]
    pub log_file: Option<PathBuf>,
    #[serde(default, rename = "errFile")]
    pub err_file: Option<PathBuf>,
    #[serde(rename = "sourcePath")]
    pub source_path: PathBuf,
    #[serde(default, rename = "linkName")]
    pub link_name: Option<PathBuf>,
    #[serde(default, rename = "folderPrefix")]
    pub folder_prefix: Option<String>,
    #[serde(default, rename = "dateFormat")]
    pub date_format: Option<String>,
    #[serde(default, rename = "frequencySeconds")]
    pub frequency_seconds: Option<u64>,
    #[serde(default, rename = "volumeId")]
    pub volume_id: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default, rename = "unmountAfter")]
    pub unmount_after: bool,
}

/// One backup job. A batch is an ordered `Vec<BackupJob>`; order is
/// execution order.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupJob {
    pub name: Option<String>,
    pub mount_point: Option<PathBuf>,
    pub backup_folder: PathBuf,
    pub exclude_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub err_file: Option<PathBuf>,
    pub source_path: PathBuf,
    pub link_name: Option<PathBuf>,
    pub folder_prefix: String,
    pub date_format: String,
    pub frequency_seconds: u64,
    pub last_backup_time: Option<DateTime<Local>>,
    pub volume_id: Option<String>,
    pub mode: BackupMode,
    pub unmount_after: bool,
}

impl BackupJob {
    /// A FULL job with every optional field unset.
    pub fn new(backup_folder: impl Into<PathBuf>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            mount_point: None,
            backup_folder: backup_folder.into(),
            exclude_file: None,
            log_file: None,
            err_file: None,
            source_path: source_path.into(),
            link_name: None,
            folder_prefix: String::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            frequency_seconds: DEFAULT_FREQUENCY_SECONDS,
            last_backup_time: None,
            volume_id: None,
            mode: BackupMode::Full,
            unmount_after: false,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Advisory: true when no run is recorded or the last one is at least
    /// `frequency_seconds` old.
    pub fn is_due<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let Some(last) = &self.last_backup_time else {
            return true;
        };
        let interval = i64::try_from(self.frequency_seconds)
            .ok()
            .and_then(Duration::try_seconds);
        match interval {
            Some(interval) => now.with_timezone(&Local) - *last >= interval,
            None => false,
        }
    }
}

/// Fresh, independently owned default job: a dated full backup of `/` into
/// `/mnt/backups`.
pub fn default_job() -> BackupJob {
    let mut job = BackupJob::new("/mnt/backups", "/");
    job.name = Some("home".to_string());
    job.mount_point = Some(PathBuf::from("/mnt/backups"));
    job.folder_prefix = "back-".to_string();
    job.link_name = Some(PathBuf::from("current"));
    job
}

fn default_mode() -> String {
    BackupMode::Full.as_str().to_string()
}
