//! Backup orchestration around rsync.
//!
//! A batch is an ordered list of [`BackupJob`]s. For each job the runner makes
//! sure the destination volume is mounted, resolves where the backup goes and
//! what it links against ([`backup::strategy`]), builds the rsync argv
//! ([`backup::rsync`]) and runs it as a child process. The first failing job
//! stops the batch.

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod mount;
pub mod types;
pub mod util;

pub use backup::rsync::{build_args, SyncArgs};
pub use backup::strategy::{resolve, ResolvedStrategy};
pub use backup::{BackupRunner, BatchReport};
pub use config::model::{default_job, BackupJob};
pub use error::{InkError, JobError, Result, Termination};
pub use types::{BackupMode, RunMode};
