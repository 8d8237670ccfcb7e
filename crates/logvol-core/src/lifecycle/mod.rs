//! Volume lifecycle: `init`, `mount` and `unmount`.
//!
//! The [`Driver`] ties the configured layout, the filesystem and the mount
//! service together. It keeps no state between calls: every call derives
//! its paths from the request or the container path, and the tree on disk
//! is the only record of what is mounted.
//!
//! Fatal failures come back as `Err`. Best-effort steps (config sync on
//! mount, artifact removal on unmount) never fail a call; their errors are
//! logged and collected in the report's `warnings`.

mod init;
mod mount;
mod unmount;

use std::path::PathBuf;

use logvol_common::config::DriverConfig;
use logvol_common::error::LogvolError;

use crate::filesystem::HostFs;
use crate::filesystem::mount::{BindMounter, UnbindOutcome};
use crate::filesystem::sync::SyncOutcome;
use crate::identity::{DirectoryIdentity, InstanceKey};
use crate::paths::PathResolver;

/// What a successful mount did.
#[derive(Debug)]
pub struct MountReport {
    /// Instance the mount belongs to.
    pub instance_key: InstanceKey,
    /// Workload directory identity.
    pub identity: DirectoryIdentity,
    /// Host directory bound into the container.
    pub host_dir: PathBuf,
    /// Config sync results, present only for custom formats that synced.
    pub config: Option<ConfigSyncSummary>,
    /// Non-fatal failures.
    pub warnings: Vec<LogvolError>,
}

/// Per-scope outcome of config synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSyncSummary {
    /// Cluster-scope config.
    pub cluster: SyncOutcome,
    /// Project-scope config.
    pub project: SyncOutcome,
}

/// What a successful unmount did.
#[derive(Debug)]
pub struct UnmountReport {
    /// Whether a mount was actually removed.
    pub unbind: UnbindOutcome,
    /// Instance recovered from the container path, if it could be.
    pub instance_key: Option<InstanceKey>,
    /// Artifacts that existed and were removed.
    pub removed: Vec<PathBuf>,
    /// Non-fatal failures.
    pub warnings: Vec<LogvolError>,
}

/// Host-side volume driver.
#[derive(Debug)]
pub struct Driver<F, M> {
    config: DriverConfig,
    resolver: PathResolver,
    fs: F,
    mounter: M,
}

impl<F: HostFs, M: BindMounter> Driver<F, M> {
    /// Creates a driver over a layout, a filesystem and a mount service.
    pub fn new(config: DriverConfig, fs: F, mounter: M) -> Self {
        Self {
            resolver: PathResolver::new(&config),
            config,
            fs,
            mounter,
        }
    }

    /// Configured layout.
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Mount service.
    pub const fn mounter(&self) -> &M {
        &self.mounter
    }

    /// Path resolver for the configured layout.
    pub const fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    fn ensure_dir(&self, path: &std::path::Path) -> logvol_common::error::Result<()> {
        self.fs
            .create_dir_all(path)
            .map_err(|source| LogvolError::Directory {
                path: path.to_path_buf(),
                source,
            })
    }

    fn ensure_layout(&self) -> logvol_common::error::Result<()> {
        for dir in self.config.required_dirs() {
            self.ensure_dir(&dir)?;
        }
        Ok(())
    }
}
