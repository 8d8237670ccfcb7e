//! Domain primitive types used across the logvol workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CUSTOM_FORMAT_DIR, SUCCESS_MESSAGE};
use crate::error::{LogvolError, Result};

/// Workload attributes exactly as the orchestrator passes them.
///
/// Every field is optional here so that a missing attribute surfaces as a
/// validation error naming the field instead of a JSON decoding error.
/// Unknown keys (the orchestrator adds several of its own) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMountRequest {
    /// Human-readable cluster name.
    #[serde(rename = "clusterName", default)]
    pub cluster_name: Option<String>,
    /// Cluster identifier.
    #[serde(rename = "clusterID", alias = "clusterId", default)]
    pub cluster_id: Option<String>,
    /// Human-readable project name.
    #[serde(rename = "projectName", default)]
    pub project_name: Option<String>,
    /// Project identifier.
    #[serde(rename = "projectID", alias = "projectId", default)]
    pub project_id: Option<String>,
    /// Workload namespace.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Workload name.
    #[serde(rename = "workloadName", default)]
    pub workload_name: Option<String>,
    /// Container name inside the workload.
    #[serde(rename = "containerName", default)]
    pub container_name: Option<String>,
    /// Volume name as declared by the workload.
    #[serde(rename = "volumeName", default)]
    pub volume_name: Option<String>,
    /// Log format tag.
    #[serde(default)]
    pub format: Option<String>,
    /// Pod name, when the orchestrator supplies it.
    #[serde(rename = "podName", alias = "kubernetes.io/pod.name", default)]
    pub pod_name: Option<String>,
    /// Pod UID, when the orchestrator supplies it.
    #[serde(rename = "podUID", alias = "kubernetes.io/pod.uid", default)]
    pub pod_uid: Option<String>,
}

impl RawMountRequest {
    /// Parses the orchestrator's JSON options object.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Validation`] if the text is not a JSON object.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| LogvolError::validation(format!("decode mount options: {e}")))
    }

    /// Checks that every required attribute is present and non-empty.
    ///
    /// Optional pod attributes that are present but blank are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Validation`] listing every missing field.
    pub fn validate(self) -> Result<MountRequest> {
        let mut missing = Vec::new();
        let mut take = |value: Option<String>, name: &'static str| {
            match value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let request = MountRequest {
            cluster_name: take(self.cluster_name, "clusterName"),
            cluster_id: take(self.cluster_id, "clusterID"),
            project_name: take(self.project_name, "projectName"),
            project_id: take(self.project_id, "projectID"),
            namespace: take(self.namespace, "namespace"),
            workload_name: take(self.workload_name, "workloadName"),
            container_name: take(self.container_name, "containerName"),
            volume_name: take(self.volume_name, "volumeName"),
            format: take(self.format, "format"),
            pod_name: non_blank(self.pod_name),
            pod_uid: non_blank(self.pod_uid),
        };

        if missing.is_empty() {
            Ok(request)
        } else {
            Err(LogvolError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// A validated mount request. All required fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRequest {
    /// Human-readable cluster name.
    pub cluster_name: String,
    /// Cluster identifier.
    pub cluster_id: String,
    /// Human-readable project name.
    pub project_name: String,
    /// Project identifier.
    pub project_id: String,
    /// Workload namespace.
    pub namespace: String,
    /// Workload name.
    pub workload_name: String,
    /// Container name inside the workload.
    pub container_name: String,
    /// Volume name as declared by the workload.
    pub volume_name: String,
    /// Log format tag.
    pub format: String,
    /// Pod name, if supplied.
    pub pod_name: Option<String>,
    /// Pod UID, if supplied.
    pub pod_uid: Option<String>,
}

/// How the shipper ingests a volume's logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    /// A format the shipper parses natively; no config is generated.
    Predefined(String),
    /// Any other format; ingestion config is rendered per instance.
    Custom(String),
}

impl Format {
    /// Classifies a format tag against the predefined allowlist.
    pub fn classify(tag: &str, predefined: &[String]) -> Self {
        if predefined.iter().any(|p| p == tag) {
            Self::Predefined(tag.to_owned())
        } else {
            Self::Custom(tag.to_owned())
        }
    }

    /// Returns the format tag handed to the shipper.
    pub fn tag(&self) -> &str {
        match self {
            Self::Predefined(tag) | Self::Custom(tag) => tag,
        }
    }

    /// Returns the host directory segment for this format.
    pub fn dir_segment(&self) -> &str {
        match self {
            Self::Predefined(tag) => tag,
            Self::Custom(_) => CUSTOM_FORMAT_DIR,
        }
    }

    /// Returns `true` when ingestion config must be generated.
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Outcome reported to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The command completed.
    Success,
    /// The command failed; see the message.
    Failure,
    /// The driver does not implement the command.
    #[serde(rename = "Not Supported")]
    NotSupported,
}

/// Capabilities advertised by `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Whether the driver implements attach/detach.
    pub attach: bool,
}

/// The single JSON object printed for every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverResponse {
    /// Command outcome.
    pub status: Status,
    /// Human-readable detail.
    pub message: String,
    /// Present only on `init`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub capabilities: Option<Capabilities>,
}

impl DriverResponse {
    /// A plain success response.
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            message: SUCCESS_MESSAGE.to_owned(),
            capabilities: None,
        }
    }

    /// A failure response carrying the error's message.
    pub fn failure(err: &impl fmt::Display) -> Self {
        Self {
            status: Status::Failure,
            message: err.to_string(),
            capabilities: None,
        }
    }

    /// Response for commands this driver does not implement.
    pub fn not_supported(command: &str) -> Self {
        Self {
            status: Status::NotSupported,
            message: format!("{command} is not supported"),
            capabilities: None,
        }
    }

    /// Success response for `init`, advertising no attach support.
    pub fn initialized() -> Self {
        Self {
            capabilities: Some(Capabilities { attach: false }),
            ..Self::success()
        }
    }
}
