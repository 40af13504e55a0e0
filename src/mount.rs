use std::path::Path;

use crate::error::Result;

pub mod guard;
pub mod inspect;
pub mod ops;

/// Makes the destination volume available before a job runs.
pub trait VolumeMounter {
    fn is_mounted(&self, mountpoint: &Path) -> Result<bool>;
    fn mount(&self, volume_id: Option<&str>, mountpoint: &Path) -> Result<()>;
    fn unmount(&self, mountpoint: &Path) -> Result<()>;
}

/// Mount table from `/proc/self/mounts`, mounting through `mount(8)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMounter;

impl VolumeMounter for SystemMounter {
    fn is_mounted(&self, mountpoint: &Path) -> Result<bool> {
        inspect::mountpoint_is_mounted(mountpoint)
    }

    fn mount(&self, volume_id: Option<&str>, mountpoint: &Path) -> Result<()> {
        ops::mount_volume(volume_id, mountpoint)
    }

    fn unmount(&self, mountpoint: &Path) -> Result<()> {
        ops::unmount_path(mountpoint)
    }
}
