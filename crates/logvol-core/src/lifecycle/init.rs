//! Driver initialization.

use logvol_common::error::Result;

use super::Driver;
use crate::filesystem::HostFs;
use crate::filesystem::mount::BindMounter;

impl<F: HostFs, M: BindMounter> Driver<F, M> {
    /// Creates the staging, config and log base directories.
    ///
    /// Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Directory`](logvol_common::error::LogvolError::Directory)
    /// for the first directory that cannot be created.
    pub fn init(&self) -> Result<()> {
        tracing::info!("initializing driver layout");
        self.ensure_layout()
    }
}
