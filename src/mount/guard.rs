use std::path::PathBuf;

use tracing::warn;

use crate::mount::VolumeMounter;

/// Unmounts a volume this process mounted when dropped.
pub struct MountGuard<'a, M: VolumeMounter + ?Sized> {
    mounter: &'a M,
    mountpoint: PathBuf,
}

impl<'a, M: VolumeMounter + ?Sized> MountGuard<'a, M> {
    pub fn new(mounter: &'a M, mountpoint: PathBuf) -> Self {
        Self { mounter, mountpoint }
    }
}

impl<M: VolumeMounter + ?Sized> Drop for MountGuard<'_, M> {
    fn drop(&mut self) {
        if let Err(err) = self.mounter.unmount(&self.mountpoint) {
            warn!(mountpoint = %self.mountpoint.display(), error = %err, "unmount failed");
        }
    }
}
