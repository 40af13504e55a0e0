use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{InkError, Result};

/// Device node for a filesystem UUID.
pub fn device_path_for_uuid(uuid: &str) -> PathBuf {
    Path::new("/dev/disk/by-uuid").join(uuid)
}

/// `mount(8)` invocation: by device UUID when one is given, otherwise by
/// mountpoint alone so the system fstab supplies the device.
pub fn mount_command(volume_id: Option<&str>, mountpoint: &Path) -> Command {
    let mut cmd = Command::new("mount");
    if let Some(uuid) = volume_id {
        cmd.arg(device_path_for_uuid(uuid));
    }
    cmd.arg(mountpoint);
    cmd
}

pub fn mount_volume(volume_id: Option<&str>, mountpoint: &Path) -> Result<()> {
    let mut cmd = mount_command(volume_id, mountpoint);
    run_checked(&mut cmd, "mount", mountpoint)
}

pub fn unmount_path(mountpoint: &Path) -> Result<()> {
    let mut cmd = Command::new("umount");
    cmd.arg(mountpoint);
    run_checked(&mut cmd, "umount", mountpoint)
}

fn run_checked(cmd: &mut Command, what: &str, mountpoint: &Path) -> Result<()> {
    let status = cmd
        .status()
        .map_err(|e| InkError::message(format!("{} {}: {}", what, mountpoint.display(), e)))?;
    if !status.success() {
        return Err(InkError::message(format!(
            "{} {} failed with exit code {}",
            what,
            mountpoint.display(),
            status.code().unwrap_or(1)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(cmd: &Command) -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn mount_by_uuid() {
        let cmd = mount_command(Some("0b5c-11aa"), Path::new("/mnt/backups"));
        assert_eq!(cmd.get_program(), "mount");
        assert_eq!(argv(&cmd), vec!["/dev/disk/by-uuid/0b5c-11aa", "/mnt/backups"]);
    }

    #[test]
    fn mount_from_fstab() {
        let cmd = mount_command(None, Path::new("/mnt/backups"));
        assert_eq!(argv(&cmd), vec!["/mnt/backups"]);
    }
}
