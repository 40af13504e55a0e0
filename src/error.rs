use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InkError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Config(ConfigError),
    #[error("backup {job}: {source}")]
    Job {
        job: String,
        #[source]
        source: JobError,
    },
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}

/// Failures that end a single backup job. Any of them aborts the batch.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("formatted date is {len} bytes; it must stay below {capacity}")]
    DateFormatOverflow { len: usize, capacity: usize },
    #[error("invalid date format {0:?}")]
    InvalidDateFormat(String),
    #[error("folder prefix and date format produce an empty folder name")]
    EmptyFolderName,
    #[error("folder name {0:?} leaves the backup folder")]
    FolderOutsideBackup(String),
    #[error("out of memory building {0}")]
    ResourceExhausted(&'static str),
    #[error("path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),
    #[error("destination volume unavailable: {0}")]
    MountUnavailable(String),
    #[error("spawn {program}: {source}")]
    SpawnFailure {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("rsync {0}")]
    SubprocessFailure(Termination),
    #[error("update link {}: {reason}", .path.display())]
    LinkUpdate { path: PathBuf, reason: String },
}

/// How a finished child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    Abnormal,
}

impl Termination {
    pub fn success(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "failed with exit code {}", code),
            Termination::Signaled(signal) => write!(f, "killed by signal {}", signal),
            Termination::Abnormal => f.write_str("terminated abnormally"),
        }
    }
}

pub type Result<T> = std::result::Result<T, InkError>;

impl InkError {
    pub fn message(msg: impl Into<String>) -> Self {
        InkError::Message(msg.into())
    }

    pub fn job(job: impl Into<String>, source: JobError) -> Self {
        InkError::Job {
            job: job.into(),
            source,
        }
    }

    /// Process exit status for this error. A subprocess that exited non-zero
    /// passes its own code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            InkError::Config(_) => 2,
            InkError::Job {
                source: JobError::SubprocessFailure(Termination::Exited(code)),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl From<ConfigError> for InkError {
    fn from(err: ConfigError) -> Self {
        InkError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_passes_through_subprocess_status() {
        let err = InkError::job("home", JobError::SubprocessFailure(Termination::Exited(23)));
        assert_eq!(err.exit_code(), 23);
        let err = InkError::job("home", JobError::SubprocessFailure(Termination::Signaled(9)));
        assert_eq!(err.exit_code(), 1);
        let err: InkError = ConfigError::Invalid("bad".to_string()).into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn job_error_names_the_job() {
        let err = InkError::job("home", JobError::EmptyFolderName);
        assert!(err.to_string().starts_with("backup home: "));
    }
}
