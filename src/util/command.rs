use std::fs::OpenOptions;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::Termination;

/// Runs an argv to completion. The first element names the program. With
/// `err_file` set, the child's stderr is appended there.
pub trait CommandExecutor {
    fn execute(&self, argv: &[String], err_file: Option<&Path>) -> io::Result<Termination>;
}

/// Spawns the program as a child and blocks until it exits. stdin is
/// closed, stdout is inherited, stderr is inherited unless redirected.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    program: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `program` in place of `argv[0]`, e.g. a non-standard rsync location.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    fn command(&self, argv: &[String]) -> io::Result<Command> {
        let (first, rest) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector"))?;
        let mut cmd = match &self.program {
            Some(program) => Command::new(program),
            None => Command::new(first),
        };
        cmd.args(rest).stdin(Stdio::null());
        Ok(cmd)
    }
}

impl CommandExecutor for ProcessExecutor {
    fn execute(&self, argv: &[String], err_file: Option<&Path>) -> io::Result<Termination> {
        let mut cmd = self.command(argv)?;
        if let Some(path) = err_file {
            cmd.stderr(Stdio::from(open_append(path)?));
        }
        let status = cmd.status()?;
        Ok(classify(status))
    }
}

fn open_append(path: &Path) -> io::Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io::Error::new(e.kind(), format!("open {}: {}", path.display(), e)))
}

pub fn classify(status: ExitStatus) -> Termination {
    if let Some(code) = status.code() {
        return Termination::Exited(code);
    }
    match status.signal() {
        Some(signal) => Termination::Signaled(signal),
        None => Termination::Abnormal,
    }
}

pub fn format_command(argv: &[String]) -> String {
    argv.join(" ")
}
