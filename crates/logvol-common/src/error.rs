//! Unified error types for the logvol workspace.
//!
//! The variants follow the driver's failure taxonomy. Whether an error is
//! fatal to a call is decided by the lifecycle controllers, not here:
//! [`LogvolError::ConfigSync`] and [`LogvolError::Cleanup`] are normally
//! downgraded to warnings, everything else ends the call with a failure
//! response.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum LogvolError {
    /// A mount request is missing fields or is malformed.
    #[error("invalid mount request: {message}")]
    Validation {
        /// Description of the rejected input.
        message: String,
    },

    /// Rendering or synchronizing an ingestion config failed.
    #[error("sync {scope} config failed: {source}")]
    ConfigSync {
        /// Config scope (`cluster` or `project`).
        scope: &'static str,
        /// Underlying failure.
        source: Box<LogvolError>,
    },

    /// A config template is malformed or a placeholder has no value.
    #[error("render template {template} failed: {message}")]
    Template {
        /// Template name.
        template: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// A required directory could not be created.
    #[error("create dir {path} failed: {source}")]
    Directory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The bind operation failed.
    #[error("bind mount failed, hostPath: {host}, containerPath: {container}, error: {detail}")]
    Bind {
        /// Host directory being exposed.
        host: PathBuf,
        /// Container path receiving the bind mount.
        container: PathBuf,
        /// Error and captured output of the mount service.
        detail: String,
    },

    /// The unbind operation failed for a reason other than "not mounted".
    #[error("unmount container path {container} failed: {detail}")]
    Unbind {
        /// Container path being unmounted.
        container: PathBuf,
        /// Error and captured output of the mount service.
        detail: String,
    },

    /// Removing a per-instance artifact during unmount failed.
    #[error("remove {path} failed: {source}")]
    Cleanup {
        /// Artifact that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A container path does not have the expected orchestrator shape.
    #[error("cannot derive instance from container path {path}: {reason}")]
    PathParse {
        /// Offending container path.
        path: PathBuf,
        /// What was missing.
        reason: &'static str,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl LogvolError {
    /// Builds a [`LogvolError::Validation`] from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wraps a render or write failure as a [`LogvolError::ConfigSync`].
    pub fn config_sync(scope: &'static str, source: Self) -> Self {
        Self::ConfigSync {
            scope,
            source: Box::new(source),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, LogvolError>;
