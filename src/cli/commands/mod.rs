pub mod backup;
pub mod mount;

use crate::config::model::BackupJob;
use crate::error::{ConfigError, InkError, Result};

pub fn exit_for_error(err: &InkError) -> ! {
    println!("{}", err);
    std::process::exit(err.exit_code());
}

/// Keeps the named jobs in config order; no names keeps every job.
pub fn select_jobs(jobs: Vec<BackupJob>, names: &[String]) -> Result<Vec<BackupJob>> {
    if names.is_empty() {
        return Ok(jobs);
    }
    let missing: Vec<&str> = names
        .iter()
        .filter(|name| !jobs.iter().any(|job| job.name.as_ref() == Some(*name)))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::Invalid(format!("no such job(s): {}", missing.join(", "))).into());
    }
    Ok(jobs
        .into_iter()
        .filter(|job| job.name.as_ref().is_some_and(|name| names.contains(name)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> BackupJob {
        let mut job = BackupJob::new("/mnt/b", "/");
        job.name = Some(name.to_string());
        job
    }

    #[test]
    fn selection_keeps_config_order() {
        let jobs = vec![named("a"), named("b"), named("c"), BackupJob::new("/mnt/u", "/")];
        let picked = select_jobs(jobs, &["c".to_string(), "a".to_string()]).unwrap();
        let names: Vec<_> = picked.iter().map(|j| j.display_name()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn unknown_job_is_a_config_error() {
        let err = select_jobs(vec![named("a")], &["zz".to_string()]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("zz"));
    }
}
