//! Write-if-changed synchronization of rendered config files.
//!
//! Content is first written to a staging file, read back and compared
//! with the destination. The destination is only replaced when the bytes
//! differ, which keeps a running shipper from reloading a config that did
//! not change. Replacement goes through [`HostFs::write_atomic`], and the
//! staging file is removed whatever the outcome.

use std::path::{Path, PathBuf};

use logvol_common::error::{LogvolError, Result};

use super::HostFs;

/// What a synchronization did to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Destination already held the rendered bytes.
    Unchanged,
    /// Destination was created or replaced.
    Written,
}

/// Synchronizes rendered files through a staging area.
#[derive(Debug)]
pub struct FileSynchronizer<'a, F: HostFs> {
    fs: &'a F,
}

impl<'a, F: HostFs> FileSynchronizer<'a, F> {
    /// Creates a synchronizer over the given filesystem.
    pub const fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Makes `destination` hold exactly `content`.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Io`] if staging, comparison or replacement
    /// fails. The destination then still holds its previous contents.
    pub fn sync(&self, content: &[u8], staging: &Path, destination: &Path) -> Result<SyncOutcome> {
        let outcome = self.stage_and_compare(content, staging, destination);

        if let Err(e) = self.fs.remove_file(staging) {
            tracing::warn!(staging = %staging.display(), error = %e, "failed to remove staging file");
        }

        if let Ok(outcome) = &outcome {
            tracing::debug!(destination = %destination.display(), ?outcome, "config synchronized");
        }
        outcome
    }

    fn stage_and_compare(
        &self,
        content: &[u8],
        staging: &Path,
        destination: &Path,
    ) -> Result<SyncOutcome> {
        self.fs.write(staging, content).map_err(io_at(staging))?;
        let staged = self
            .fs
            .read(staging)
            .map_err(io_at(staging))?
            .ok_or_else(|| LogvolError::Io {
                path: staging.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "staging file vanished before comparison",
                ),
            })?;
        let current = self.fs.read(destination).map_err(io_at(destination))?;

        if current.as_deref() == Some(staged.as_slice()) {
            return Ok(SyncOutcome::Unchanged);
        }

        self.fs
            .write_atomic(destination, &staged)
            .map_err(io_at(destination))?;
        Ok(SyncOutcome::Written)
    }
}

fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> LogvolError {
    let path: PathBuf = path.to_path_buf();
    move |source| LogvolError::Io { path, source }
}
