//! Bind and unbind of host log directories into container paths.
//!
//! Two implementations sit behind [`BindMounter`]: [`CommandMounter`]
//! runs the host's `mount`/`umount` tools and keeps their output for the
//! error message, [`SyscallMounter`] calls `mount(2)`/`umount(2)` through
//! `nix`. Neither applies a timeout.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use logvol_common::config::MountBackend;
use logvol_common::error::{LogvolError, Result};

/// Result of a successful unbind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbindOutcome {
    /// A mount was removed.
    Unmounted,
    /// Nothing was mounted at the path.
    NotMounted,
}

/// Privileged mount service.
pub trait BindMounter {
    /// Recursively bind-mounts `host` onto `container`, read-write.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Bind`] with the service's diagnostics.
    fn bind(&self, host: &Path, container: &Path) -> Result<()>;

    /// Removes the mount at `container`.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Unbind`] for any failure except "not mounted".
    fn unbind(&self, container: &Path) -> Result<UnbindOutcome>;
}

impl<M: BindMounter + ?Sized> BindMounter for Box<M> {
    fn bind(&self, host: &Path, container: &Path) -> Result<()> {
        (**self).bind(host, container)
    }

    fn unbind(&self, container: &Path) -> Result<UnbindOutcome> {
        (**self).unbind(container)
    }
}

/// Creates the mounter selected by configuration.
pub fn mounter_for(backend: MountBackend) -> Box<dyn BindMounter> {
    match backend {
        MountBackend::Command => Box::new(CommandMounter::new()),
        MountBackend::Syscall => Box::new(SyscallMounter),
    }
}

/// Phrases `umount` prints when there is nothing to unmount.
const NOT_MOUNTED_MARKERS: [&str; 4] = [
    "not mounted",
    "no mount point specified",
    "not found",
    "no such file or directory",
];

/// Mounter that shells out to `mount -o rbind,rw` and `umount`.
#[derive(Debug, Clone)]
pub struct CommandMounter {
    mount_bin: PathBuf,
    umount_bin: PathBuf,
}

impl CommandMounter {
    /// Resolves `mount` and `umount` on `PATH`, falling back to bare names.
    pub fn new() -> Self {
        Self {
            mount_bin: which::which("mount").unwrap_or_else(|_| PathBuf::from("mount")),
            umount_bin: which::which("umount").unwrap_or_else(|_| PathBuf::from("umount")),
        }
    }

    /// Uses explicit binaries.
    pub fn with_binaries(mount_bin: impl Into<PathBuf>, umount_bin: impl Into<PathBuf>) -> Self {
        Self {
            mount_bin: mount_bin.into(),
            umount_bin: umount_bin.into(),
        }
    }
}

impl Default for CommandMounter {
    fn default() -> Self {
        Self::new()
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text.trim().to_owned()
}

impl BindMounter for CommandMounter {
    fn bind(&self, host: &Path, container: &Path) -> Result<()> {
        tracing::debug!(
            bin = %self.mount_bin.display(),
            host = %host.display(),
            container = %container.display(),
            "running bind mount"
        );
        let fail = |detail: String| LogvolError::Bind {
            host: host.to_path_buf(),
            container: container.to_path_buf(),
            detail,
        };

        let output = Command::new(&self.mount_bin)
            .args(["-o", "rbind,rw"])
            .arg(host)
            .arg(container)
            .output()
            .map_err(|e| fail(format!("spawn {}: {e}", self.mount_bin.display())))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(fail(format!("{}, output: {}", output.status, combined_output(&output))))
        }
    }

    fn unbind(&self, container: &Path) -> Result<UnbindOutcome> {
        tracing::debug!(bin = %self.umount_bin.display(), container = %container.display(), "running unmount");
        let output = Command::new(&self.umount_bin)
            .arg(container)
            .output()
            .map_err(|e| LogvolError::Unbind {
                container: container.to_path_buf(),
                detail: format!("spawn {}: {e}", self.umount_bin.display()),
            })?;

        if output.status.success() {
            return Ok(UnbindOutcome::Unmounted);
        }
        let text = combined_output(&output);
        let lower = text.to_lowercase();
        if NOT_MOUNTED_MARKERS.iter().any(|m| lower.contains(m)) {
            tracing::debug!(container = %container.display(), output = %text, "path was not mounted");
            return Ok(UnbindOutcome::NotMounted);
        }
        Err(LogvolError::Unbind {
            container: container.to_path_buf(),
            detail: format!("{}, output: {text}", output.status),
        })
    }
}

/// Mounter calling `mount(2)` with `MS_BIND | MS_REC` and `umount(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyscallMounter;

#[cfg(target_os = "linux")]
impl BindMounter for SyscallMounter {
    fn bind(&self, host: &Path, container: &Path) -> Result<()> {
        use nix::mount::{MsFlags, mount};

        tracing::debug!(host = %host.display(), container = %container.display(), "bind mount syscall");
        mount(
            Some(host),
            container,
            None::<&str>,
            MsFlags::MS_BIND | MsFlags::MS_REC,
            None::<&str>,
        )
        .map_err(|e| LogvolError::Bind {
            host: host.to_path_buf(),
            container: container.to_path_buf(),
            detail: e.to_string(),
        })
    }

    fn unbind(&self, container: &Path) -> Result<UnbindOutcome> {
        use nix::errno::Errno;

        match nix::mount::umount(container) {
            Ok(()) => Ok(UnbindOutcome::Unmounted),
            Err(Errno::EINVAL | Errno::ENOENT) => Ok(UnbindOutcome::NotMounted),
            Err(e) => Err(LogvolError::Unbind {
                container: container.to_path_buf(),
                detail: e.to_string(),
            }),
        }
    }
}

/// Stub for non-Linux platforms.
#[cfg(not(target_os = "linux"))]
impl BindMounter for SyscallMounter {
    fn bind(&self, host: &Path, container: &Path) -> Result<()> {
        Err(LogvolError::Bind {
            host: host.to_path_buf(),
            container: container.to_path_buf(),
            detail: "bind mount syscalls require Linux".into(),
        })
    }

    fn unbind(&self, container: &Path) -> Result<UnbindOutcome> {
        Err(LogvolError::Unbind {
            container: container.to_path_buf(),
            detail: "unmount syscalls require Linux".into(),
        })
    }
}
