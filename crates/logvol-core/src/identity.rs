//! Stable identities for mount requests.
//!
//! Two keys are derived per request:
//! - a [`DirectoryIdentity`] naming the workload's host log directory, and
//! - an [`InstanceKey`] (pod UID + volume name) naming every per-instance
//!   artifact, so a remount of the same volume on the same pod lands on the
//!   same files while different pods or volumes never share any.
//!
//! Nothing here touches the filesystem.

use std::fmt;
use std::path::{Component, Path};

use logvol_common::constants::{IDENTITY_DELIMITER, IDENTITY_SUBSTITUTE, POD_MARKER_SEGMENT};
use logvol_common::error::{LogvolError, Result};
use logvol_common::types::MountRequest;

/// Key naming a workload's log directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryIdentity(String);

impl DirectoryIdentity {
    /// Joins the identity components of a normalized request.
    ///
    /// Order: cluster ID, cluster name, namespace, project ID, project
    /// name, workload name, pod name (when present), container name.
    pub fn derive(request: &MountRequest) -> Self {
        let mut parts = vec![
            request.cluster_id.as_str(),
            request.cluster_name.as_str(),
            request.namespace.as_str(),
            request.project_id.as_str(),
            request.project_name.as_str(),
            request.workload_name.as_str(),
        ];
        if let Some(pod) = request.pod_name.as_deref() {
            parts.push(pod);
        }
        parts.push(request.container_name.as_str());
        Self(parts.join(&IDENTITY_DELIMITER.to_string()))
    }

    /// Splits the identity back into its components.
    pub fn components(&self) -> Vec<&str> {
        self.0.split(IDENTITY_DELIMITER).collect()
    }

    /// Returns the inner string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DirectoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key naming per-instance artifacts: `<pod uid>_<volume name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceKey(String);

impl InstanceKey {
    /// Builds the key from a pod UID and a volume name.
    pub fn new(pod_uid: &str, volume_name: &str) -> Self {
        Self(format!("{pod_uid}{IDENTITY_DELIMITER}{volume_name}"))
    }

    /// Builds the key from request-supplied values, which become path
    /// segments under the configured roots.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Validation`] if either value is empty, `.` or
    /// `..`, or contains a path separator or a control character.
    pub fn checked(pod_uid: &str, volume_name: &str) -> Result<Self> {
        for (field, value) in [("pod UID", pod_uid), ("volume name", volume_name)] {
            if !is_plain_segment(value) {
                return Err(LogvolError::validation(format!(
                    "{field} {value:?} is not a single path segment"
                )));
            }
        }
        Ok(Self::new(pod_uid, volume_name))
    }

    /// Returns the inner string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_plain_segment(value: &str) -> bool {
    !matches!(value, "" | "." | "..")
        && !value.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

/// Replaces characters that would break identity splitting or escape the
/// log directory: the identity delimiter and path separators.
pub fn escape_component(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            IDENTITY_DELIMITER | '/' | '\\' => IDENTITY_SUBSTITUTE,
            c if c.is_control() => IDENTITY_SUBSTITUTE,
            c => c,
        })
        .collect()
}

/// Applies [`escape_component`] to every directory identity component.
///
/// Pod UID, volume name and format are left alone: the instance key is
/// rebuilt from the container path on unmount, never split.
pub fn normalize(mut request: MountRequest) -> MountRequest {
    for field in [
        &mut request.cluster_id,
        &mut request.cluster_name,
        &mut request.namespace,
        &mut request.project_id,
        &mut request.project_name,
        &mut request.workload_name,
        &mut request.container_name,
    ] {
        *field = escape_component(field);
    }
    request.pod_name = request.pod_name.as_deref().map(escape_component);
    request
}

/// Pod UID and volume name recovered from an orchestrator container path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPathInfo {
    /// Segment following the last `pods` marker.
    pub pod_uid: String,
    /// Final path segment.
    pub volume_name: String,
}

impl ContainerPathInfo {
    /// Parses `.../pods/<uid>/.../<volume>`.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::PathParse`] when the marker segment is absent
    /// or is not followed by a UID and a separate volume segment, and when
    /// a segment is `..` or not valid UTF-8.
    pub fn parse(path: &Path) -> Result<Self> {
        let err = |reason| LogvolError::PathParse {
            path: path.to_path_buf(),
            reason,
        };

        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(s) => {
                    segments.push(s.to_str().ok_or_else(|| err("segment is not valid UTF-8"))?);
                }
                Component::ParentDir => return Err(err("path contains \"..\"")),
                _ => {}
            }
        }

        let Some((volume_idx, volume_name)) = segments.iter().enumerate().next_back() else {
            return Err(err("path has no segments"));
        };
        let marker = segments[..volume_idx]
            .iter()
            .rposition(|s| *s == POD_MARKER_SEGMENT)
            .ok_or_else(|| err("no \"pods\" segment"))?;
        let uid_idx = marker + 1;
        if uid_idx >= volume_idx {
            return Err(err("no pod UID between \"pods\" and the volume segment"));
        }

        Ok(Self {
            pod_uid: segments[uid_idx].to_owned(),
            volume_name: (*volume_name).to_owned(),
        })
    }

    /// Instance key of the parsed path.
    pub fn instance_key(&self) -> InstanceKey {
        InstanceKey::new(&self.pod_uid, &self.volume_name)
    }
}
