//! # logvol-core
//!
//! Host-side logic of the logvol volume driver.
//!
//! This crate provides:
//! - **Identity**: stable directory identities and instance keys derived
//!   from workload metadata, and their recovery from container paths.
//! - **Paths**: the pure mapping from identities to the host layout.
//! - **Templates**: shipper ingestion configs for custom log formats.
//! - **Filesystem**: the host filesystem seam, write-if-changed config
//!   sync, and the bind/unbind mount service.
//! - **Lifecycle**: the `init`, `mount` and `unmount` controllers.

pub mod filesystem;
pub mod identity;
pub mod lifecycle;
pub mod paths;
pub mod template;

pub use filesystem::LocalFs;
pub use filesystem::mount::{BindMounter, CommandMounter, SyscallMounter, UnbindOutcome, mounter_for};
pub use lifecycle::{ConfigSyncSummary, Driver, MountReport, UnmountReport};
