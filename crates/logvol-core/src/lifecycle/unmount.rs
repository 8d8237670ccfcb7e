//! Unmount: unbind the container path and remove the instance's artifacts.

use std::path::Path;

use logvol_common::error::{LogvolError, Result};

use super::{Driver, UnmountReport};
use crate::filesystem::HostFs;
use crate::filesystem::mount::{BindMounter, UnbindOutcome};
use crate::identity::ContainerPathInfo;

impl<F: HostFs, M: BindMounter> Driver<F, M> {
    /// Unbinds `container` and removes every artifact of its instance.
    ///
    /// A path that is not mounted counts as unbound, and artifacts that are
    /// already gone count as removed, so repeating an unmount succeeds.
    /// Removal failures, and a container path the instance cannot be read
    /// from, are recorded in [`UnmountReport::warnings`].
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Unbind`] if the unbind itself fails.
    pub fn unmount(&self, container: &Path) -> Result<UnmountReport> {
        let unbind = self.mounter.unbind(container)?;
        if unbind == UnbindOutcome::NotMounted {
            tracing::info!(container = %container.display(), "container path was not mounted");
        }

        let mut report = UnmountReport {
            unbind,
            instance_key: None,
            removed: Vec::new(),
            warnings: Vec::new(),
        };

        let info = match ContainerPathInfo::parse(container) {
            Ok(info) => info,
            Err(e) => {
                tracing::error!(error = %e, "cannot locate instance artifacts, skipping cleanup");
                report.warnings.push(e);
                return Ok(report);
            }
        };
        let key = info.instance_key();
        let paths = self.resolver.instance(&key);

        for file in [
            &paths.cluster_config,
            &paths.project_config,
            &paths.cluster_position,
            &paths.project_position,
        ] {
            self.remove(file, F::remove_file, &mut report);
        }
        self.remove(&paths.instance_root, F::remove_dir_all, &mut report);

        tracing::info!(
            instance = %key,
            removed = report.removed.len(),
            warnings = report.warnings.len(),
            "volume unmounted"
        );
        report.instance_key = Some(key);
        Ok(report)
    }

    fn remove(
        &self,
        path: &Path,
        op: fn(&F, &Path) -> std::io::Result<bool>,
        report: &mut UnmountReport,
    ) {
        match op(&self.fs, path) {
            Ok(true) => {
                tracing::debug!(path = %path.display(), "removed");
                report.removed.push(path.to_path_buf());
            }
            Ok(false) => {}
            Err(source) => {
                let err = LogvolError::Cleanup {
                    path: path.to_path_buf(),
                    source,
                };
                tracing::error!(error = %err, "cleanup failed");
                report.warnings.push(err);
            }
        }
    }
}
