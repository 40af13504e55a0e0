use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::model::BackupJob;
use crate::error::{InkError, Result};

/// Last successful run per named job, as unix seconds.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct State {
    #[serde(default, rename = "lastBackup")]
    pub last_backup: BTreeMap<String, i64>,
}

pub fn load_state(path: &Path) -> Result<State> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(State::default()),
        Err(err) => {
            return Err(InkError::message(format!(
                "read state {}: {}",
                path.display(),
                err
            )))
        }
    };
    serde_yaml::from_str(&contents)
        .map_err(|e| InkError::message(format!("parse state {}: {}", path.display(), e)))
}

pub fn save_state(path: &Path, state: &State) -> Result<()> {
    let data = serde_yaml::to_string(state)
        .map_err(|e| InkError::message(format!("encode state: {}", e)))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| InkError::message(format!("create {}: {}", parent.display(), e)))?;
        }
    }
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)
        .map_err(|e| InkError::message(format!("write state {}: {}", tmp.display(), e)))?;
    file.write_all(data.as_bytes())
        .map_err(|e| InkError::message(format!("write state {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| InkError::message(format!("write state {}: {}", path.display(), e)))?;
    Ok(())
}

impl State {
    /// Copies recorded times onto jobs with a matching name.
    pub fn apply(&self, jobs: &mut [BackupJob]) {
        for job in jobs.iter_mut() {
            let Some(name) = &job.name else { continue };
            if let Some(secs) = self.last_backup.get(name) {
                job.last_backup_time =
                    DateTime::from_timestamp(*secs, 0).map(|t| t.with_timezone(&Local));
            }
        }
    }

    /// Records the last backup time of every named job that has one.
    pub fn record(&mut self, jobs: &[BackupJob]) {
        for job in jobs {
            if let (Some(name), Some(at)) = (&job.name, &job.last_backup_time) {
                self.last_backup.insert(name.clone(), at.timestamp());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn missing_state_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = load_state(&dir.path().join("state.yaml")).expect("load");
        assert_eq!(state, State::default());
    }

    #[test]
    fn recorded_times_come_back_onto_jobs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("state.yaml");
        let at = Local.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap();

        let mut done = BackupJob::new("/mnt/b", "/");
        done.name = Some("home".to_string());
        done.last_backup_time = Some(at);
        let unnamed = BackupJob::new("/mnt/c", "/");

        let mut state = State::default();
        state.record(&[done, unnamed]);
        save_state(&path, &state).expect("save");

        let mut jobs = vec![BackupJob::new("/mnt/b", "/")];
        jobs[0].name = Some("home".to_string());
        load_state(&path).expect("load").apply(&mut jobs);
        assert_eq!(jobs[0].last_backup_time, Some(at));
    }
}
