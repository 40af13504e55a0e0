use std::ops::Deref;

use crate::backup::strategy::ResolvedStrategy;
use crate::config::model::BackupJob;
use crate::error::JobError;
use crate::types::BackupMode;
use crate::util::paths::{concat, owned_utf8, prefixed, utf8};

pub const RSYNC_PROGRAM: &str = "rsync";
const ARCHIVE_OPT: &str = "-a";
const PROGRESS_OPT: &str = "--info=progress2";
const EXCLUDE_PREFIX: &str = "--exclude-from=";
const LOG_FILE_PREFIX: &str = "--log-file=";
const LINK_DEST_PREFIX: &str = "--link-dest=";
const BACKUP_DIR_PREFIX: &str = "--backup-dir=";

/// Most arguments a single run can have.
const MAX_ARGS: usize = 8;

/// Ordered rsync argv, program name first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncArgs(Vec<String>);

impl SyncArgs {
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for SyncArgs {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

/// Builds the rsync argv for one resolved run. Pure: touches no files.
///
/// Order: program, `-a`, `--info=progress2`, `--exclude-from=`, `--log-file=`,
/// `--link-dest=`/`--backup-dir=`, source, destination. Absent options are
/// skipped without changing the order of the rest.
pub fn build_args(job: &BackupJob, strategy: &ResolvedStrategy) -> Result<SyncArgs, JobError> {
    let mut args: Vec<String> = Vec::new();
    args.try_reserve_exact(MAX_ARGS)
        .map_err(|_| JobError::ResourceExhausted("rsync arguments"))?;

    args.push(concat(&[RSYNC_PROGRAM], "program name")?);
    args.push(concat(&[ARCHIVE_OPT], "archive option")?);
    args.push(concat(&[PROGRESS_OPT], "progress option")?);

    if let Some(exclude) = &job.exclude_file {
        args.push(prefixed(EXCLUDE_PREFIX, utf8(exclude)?, "exclude option")?);
    }
    if let Some(log) = &job.log_file {
        args.push(prefixed(LOG_FILE_PREFIX, utf8(log)?, "log option")?);
    }
    if let Some(reference) = &strategy.reference_path {
        let flag = match job.mode {
            BackupMode::Incremental => Some(LINK_DEST_PREFIX),
            BackupMode::IncrementalNoLinks => Some(BACKUP_DIR_PREFIX),
            BackupMode::Snapshot | BackupMode::Full => None,
        };
        if let Some(flag) = flag {
            args.push(prefixed(flag, utf8(reference)?, "reference option")?);
        }
    }

    args.push(owned_utf8(&job.source_path, "source path")?);
    args.push(owned_utf8(&strategy.destination_path, "destination path")?);
    Ok(SyncArgs(args))
}
