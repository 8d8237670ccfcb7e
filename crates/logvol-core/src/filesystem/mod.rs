//! Host filesystem access for the lifecycle controllers.
//!
//! [`HostFs`] is the seam between the mount/unmount logic and the disk, so
//! the controllers can run against a temporary root or a faulty wrapper
//! in tests. [`LocalFs`] is the real implementation.

pub mod mount;
pub mod sync;

use std::io::{self, Write};
use std::path::Path;

/// Filesystem operations used by the driver.
///
/// Removal returns `Ok(false)` when the path was already absent so callers
/// can treat "nothing to remove" as success.
pub trait HostFs {
    /// Recursively creates a directory. Succeeds if it already exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Reads a whole file, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for anything but "not found".
    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>>;

    /// Creates or truncates a file with the given contents.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Replaces a file so readers see either the old or the new contents.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error. The destination is untouched.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Removes a file. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for anything but "not found".
    fn remove_file(&self, path: &Path) -> io::Result<bool>;

    /// Removes a directory tree. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for anything but "not found".
    fn remove_dir_all(&self, path: &Path) -> io::Result<bool>;
}

/// [`HostFs`] over the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl HostFs for LocalFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        // Same directory as the destination, so the rename cannot cross filesystems.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }
        let _ = tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<bool> {
        absent_is_ok(std::fs::remove_file(path))
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<bool> {
        absent_is_ok(std::fs::remove_dir_all(path))
    }
}

fn absent_is_ok(result: io::Result<()>) -> io::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
