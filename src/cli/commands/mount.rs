use std::path::{Path, PathBuf};

use crate::cli::commands::select_jobs;
use crate::config::load::load_config;
use crate::error::{InkError, Result};
use crate::mount::{SystemMounter, VolumeMounter};
use crate::types::RunMode;

/// Distinct volumes of the selected jobs, first one wins the volume id.
fn volumes(config_path: &Path, selected: &[String]) -> Result<Vec<(PathBuf, Option<String>)>> {
    let jobs = select_jobs(load_config(config_path)?, selected)?;
    let mut out: Vec<(PathBuf, Option<String>)> = Vec::new();
    for job in jobs {
        let Some(mountpoint) = job.mount_point else { continue };
        if !out.iter().any(|(seen, _)| *seen == mountpoint) {
            out.push((mountpoint, job.volume_id));
        }
    }
    if out.is_empty() {
        return Err(InkError::message("no mountPoint configured for the selected job(s)"));
    }
    Ok(out)
}

pub fn run_mount(config_path: &Path, selected: &[String], run_mode: RunMode) -> Result<()> {
    mount_all(&SystemMounter, &volumes(config_path, selected)?, run_mode)
}

pub fn run_umount(config_path: &Path, selected: &[String], run_mode: RunMode) -> Result<()> {
    umount_all(&SystemMounter, &volumes(config_path, selected)?, run_mode)
}

fn mount_all<M: VolumeMounter>(
    mounter: &M,
    volumes: &[(PathBuf, Option<String>)],
    run_mode: RunMode,
) -> Result<()> {
    for (mountpoint, volume_id) in volumes {
        if mounter.is_mounted(mountpoint)? {
            println!("already mounted: {}", mountpoint.display());
            continue;
        }
        if run_mode.dry_run {
            println!("dry-run: mount {}", mountpoint.display());
            continue;
        }
        mounter.mount(volume_id.as_deref(), mountpoint)?;
        println!("mounted: {}", mountpoint.display());
    }
    Ok(())
}

fn umount_all<M: VolumeMounter>(
    mounter: &M,
    volumes: &[(PathBuf, Option<String>)],
    run_mode: RunMode,
) -> Result<()> {
    for (mountpoint, _) in volumes {
        if !mounter.is_mounted(mountpoint)? {
            println!("not mounted: {}", mountpoint.display());
            continue;
        }
        if run_mode.dry_run {
            println!("dry-run: umount {}", mountpoint.display());
            continue;
        }
        mounter.unmount(mountpoint)?;
        println!("unmounted: {}", mountpoint.display());
    }
    Ok(())
}
