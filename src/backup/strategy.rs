use std::fmt::{self, Write};
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use tracing::warn;

use crate::config::model::BackupJob;
use crate::error::JobError;
use crate::types::BackupMode;
use crate::util::paths::concat;

/// Formatted dates must be strictly shorter than this.
pub const DATE_BUFFER_CAPACITY: usize = 40;

/// Where one run writes and what it links against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStrategy {
    pub folder_name: String,
    pub destination_path: PathBuf,
    pub reference_path: Option<PathBuf>,
}

pub fn resolve<Tz>(job: &BackupJob, now: &DateTime<Tz>) -> Result<ResolvedStrategy, JobError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let date = format_date(&job.date_format, now)?;
    let folder_name = concat(&[&job.folder_prefix, &date], "folder name")?;

    let destination_path = match job.mode {
        BackupMode::Snapshot => job.backup_folder.clone(),
        BackupMode::Full | BackupMode::Incremental | BackupMode::IncrementalNoLinks => {
            dated_destination(&job.backup_folder, &folder_name)?
        }
    };

    let reference_path = match (job.mode, &job.link_name) {
        (BackupMode::Incremental, Some(link)) => Some(job.backup_folder.join(link)),
        (BackupMode::IncrementalNoLinks, Some(link)) => {
            resolve_link_target(&job.backup_folder.join(link))
        }
        _ => None,
    };

    Ok(ResolvedStrategy {
        folder_name,
        destination_path,
        reference_path,
    })
}

/// `folder_name` below `backup_folder`. A leading separator in the name is
/// the one between the two, never a new root.
fn dated_destination(backup_folder: &Path, folder_name: &str) -> Result<PathBuf, JobError> {
    let relative = Path::new(folder_name.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(JobError::FolderOutsideBackup(folder_name.to_string()));
    }
    if !relative
        .components()
        .any(|c| matches!(c, Component::Normal(_)))
    {
        return Err(JobError::EmptyFolderName);
    }
    Ok(backup_folder.join(relative))
}

pub fn format_date<Tz>(format: &str, now: &DateTime<Tz>) -> Result<String, JobError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(JobError::InvalidDateFormat(format.to_string()));
    }
    let mut out = String::new();
    write!(out, "{}", now.format_with_items(items.iter()))
        .map_err(|_| JobError::InvalidDateFormat(format.to_string()))?;
    if out.len() >= DATE_BUFFER_CAPACITY {
        return Err(JobError::DateFormatOverflow {
            len: out.len(),
            capacity: DATE_BUFFER_CAPACITY,
        });
    }
    Ok(out)
}

/// Target of the link at `link`, relative targets taken from the link's
/// directory. None when the link cannot be read.
fn resolve_link_target(link: &Path) -> Option<PathBuf> {
    match fs::read_link(link) {
        Ok(target) if target.is_absolute() => Some(target),
        Ok(target) => Some(match link.parent() {
            Some(parent) => parent.join(target),
            None => target,
        }),
        Err(err) => {
            warn!(
                link = %link.display(),
                error = %err,
                "cannot resolve previous backup link; continuing without --backup-dir"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, Utc};
    use std::os::unix::fs::symlink;

    fn jan_15() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    fn home_job(mode: BackupMode) -> BackupJob {
        let mut job = BackupJob::new("/mnt/backups", "/");
        job.name = Some("home".to_string());
        job.folder_prefix = "back-".to_string();
        job.date_format = "%Y.%m.%d".to_string();
        job.mode = mode;
        job
    }

    #[test]
    fn full_uses_dated_folder_without_reference() {
        let mut job = home_job(BackupMode::Full);
        job.link_name = Some(PathBuf::from("current"));
        let strategy = resolve(&job, &jan_15()).unwrap();
        assert_eq!(strategy.folder_name, "back-2024.01.15");
        assert_eq!(
            strategy.destination_path,
            PathBuf::from("/mnt/backups/back-2024.01.15")
        );
        assert_eq!(strategy.reference_path, None);
    }

    #[test]
    fn snapshot_target_ignores_time() {
        let job = home_job(BackupMode::Snapshot);
        let first = resolve(&job, &jan_15()).unwrap();
        let later = resolve(&job, &Local.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()).unwrap();
        assert_eq!(first.destination_path, PathBuf::from("/mnt/backups"));
        assert_eq!(later.destination_path, first.destination_path);
        assert_eq!(later.reference_path, None);
    }

    #[test]
    fn incremental_links_against_link_path() {
        let mut job = home_job(BackupMode::Incremental);
        job.link_name = Some(PathBuf::from("current"));
        let strategy = resolve(&job, &jan_15()).unwrap();
        assert_eq!(
            strategy.destination_path,
            PathBuf::from("/mnt/backups/back-2024.01.15")
        );
        assert_eq!(
            strategy.reference_path,
            Some(PathBuf::from("/mnt/backups/current"))
        );
    }

    #[test]
    fn incremental_without_link_behaves_like_full() {
        let job = home_job(BackupMode::Incremental);
        let incremental = resolve(&job, &jan_15()).unwrap();
        let full = resolve(&home_job(BackupMode::Full), &jan_15()).unwrap();
        assert_eq!(incremental, full);
    }

    #[test]
    fn no_links_resolves_relative_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("back-2024.01.14")).unwrap();
        symlink("back-2024.01.14", dir.path().join("current")).unwrap();

        let mut job = home_job(BackupMode::IncrementalNoLinks);
        job.backup_folder = dir.path().to_path_buf();
        job.link_name = Some(PathBuf::from("current"));
        let strategy = resolve(&job, &jan_15()).unwrap();
        assert_eq!(
            strategy.reference_path,
            Some(dir.path().join("back-2024.01.14"))
        );
    }

    #[test]
    fn no_links_keeps_absolute_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let elsewhere = tempfile::tempdir().expect("tempdir");
        symlink(elsewhere.path(), dir.path().join("current")).unwrap();

        let mut job = home_job(BackupMode::IncrementalNoLinks);
        job.backup_folder = dir.path().to_path_buf();
        job.link_name = Some(PathBuf::from("current"));
        let strategy = resolve(&job, &jan_15()).unwrap();
        assert_eq!(strategy.reference_path, Some(elsewhere.path().to_path_buf()));
    }

    #[test]
    fn no_links_with_missing_link_has_no_reference() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut job = home_job(BackupMode::IncrementalNoLinks);
        job.backup_folder = dir.path().to_path_buf();
        job.link_name = Some(PathBuf::from("current"));
        let strategy = resolve(&job, &jan_15()).unwrap();
        assert_eq!(strategy.reference_path, None);
        assert_eq!(strategy.destination_path, dir.path().join("back-2024.01.15"));
    }

    #[test]
    fn overflowing_date_is_an_error() {
        let mut job = home_job(BackupMode::Full);
        // 10 x "%Y" renders 40 characters.
        job.date_format = "%Y".repeat(10);
        let err = resolve(&job, &jan_15()).unwrap_err();
        assert!(matches!(
            err,
            JobError::DateFormatOverflow { len: 40, capacity: DATE_BUFFER_CAPACITY }
        ));

        job.date_format = format!("{}%mx", "%Y".repeat(9));
        assert_eq!(resolve(&job, &jan_15()).unwrap().folder_name.len(), "back-".len() + 39);
    }

    #[test]
    fn unknown_specifier_is_rejected() {
        let mut job = home_job(BackupMode::Full);
        job.date_format = "%Y-%Q".to_string();
        assert!(matches!(
            resolve(&job, &jan_15()),
            Err(JobError::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn empty_folder_name_is_rejected_for_dated_modes() {
        let mut job = home_job(BackupMode::Full);
        job.folder_prefix.clear();
        job.date_format = String::new();
        assert!(matches!(
            resolve(&job, &jan_15()),
            Err(JobError::EmptyFolderName)
        ));
        job.mode = BackupMode::Snapshot;
        assert!(resolve(&job, &jan_15()).is_ok());
    }

    #[test]
    fn leading_separator_in_prefix_stays_under_backup_folder() {
        let mut job = home_job(BackupMode::Full);
        job.folder_prefix = "/back-".to_string();
        let strategy = resolve(&job, &jan_15()).unwrap();
        assert_eq!(strategy.folder_name, "/back-2024.01.15");
        assert_eq!(
            strategy.destination_path,
            PathBuf::from("/mnt/backups/back-2024.01.15")
        );

        job.mode = BackupMode::Incremental;
        job.link_name = Some(PathBuf::from("current"));
        let strategy = resolve(&job, &jan_15()).unwrap();
        assert!(strategy.destination_path.starts_with("/mnt/backups"));
    }

    #[test]
    fn folder_name_climbing_out_is_rejected() {
        let mut job = home_job(BackupMode::Full);
        job.folder_prefix = "../back-".to_string();
        assert!(matches!(
            resolve(&job, &jan_15()),
            Err(JobError::FolderOutsideBackup(_))
        ));

        job.folder_prefix = "old/".to_string();
        job.date_format = "../%Y".to_string();
        assert!(matches!(
            resolve(&job, &jan_15()),
            Err(JobError::FolderOutsideBackup(_))
        ));

        job.folder_prefix = "/".to_string();
        job.date_format = String::new();
        assert!(matches!(
            resolve(&job, &jan_15()),
            Err(JobError::EmptyFolderName)
        ));
    }

    #[test]
    fn offset_specifiers_format_with_timezone() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(format_date("%Y%m%d%z", &now).unwrap(), "20240115+0000");
    }
}
