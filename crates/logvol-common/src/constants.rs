//! System-wide constants and default host paths.
//!
//! These are only defaults: every directory is carried by
//! [`DriverConfig`](crate::config::DriverConfig) so tests and alternative
//! hosts can point the driver at another root.

/// Base directory holding the per-instance workload log directories.
pub const DEFAULT_LOG_BASE_DIR: &str = "/var/log/rancher-log-volumes";

/// Directory the shipper reads cluster-scope ingestion configs from.
pub const DEFAULT_CLUSTER_CONFIG_DIR: &str = "/var/lib/fluentd/etc/config/customer/cluster";

/// Directory the shipper reads project-scope ingestion configs from.
pub const DEFAULT_PROJECT_CONFIG_DIR: &str = "/var/lib/fluentd/etc/config/customer/project";

/// Directory holding the shipper's read-position bookkeeping files.
pub const DEFAULT_POSITION_DIR: &str = "/fluentd/etc/log";

/// Scratch tree where configs are rendered before comparison.
pub const DEFAULT_STAGING_DIR: &str = "/tmp/fluentd/etc/config/customer";

/// Default driver log file. Stdout is reserved for the JSON response.
pub const DEFAULT_LOG_FILE: &str = "/var/log/logvol-flexvolume.log";

/// Formats the shipper parses natively.
pub const DEFAULT_PREDEFINED_FORMATS: [&str; 5] = ["json", "apache2", "nginx", "rfc3164", "rfc5424"];

/// Directory segment used for every format outside the predefined set.
pub const CUSTOM_FORMAT_DIR: &str = "custom";

/// Name of the cluster-scope subtree under the staging directory.
pub const STAGING_CLUSTER_SUBDIR: &str = "cluster";

/// Name of the project-scope subtree under the staging directory.
pub const STAGING_PROJECT_SUBDIR: &str = "project";

/// Prefix of the cluster-scope position file name.
pub const CLUSTER_POSITION_PREFIX: &str = "custom_cluster_userformat_";

/// Prefix of the project-scope position file name.
pub const PROJECT_POSITION_PREFIX: &str = "custom_project_userformat_";

/// Extension of generated ingestion config files.
pub const CONFIG_EXTENSION: &str = ".conf";

/// Extension of position files.
pub const POSITION_EXTENSION: &str = ".pos";

/// Delimiter joining the components of a directory identity and an instance key.
pub const IDENTITY_DELIMITER: char = '_';

/// Replacement for characters that would break identity splitting or paths.
pub const IDENTITY_SUBSTITUTE: char = '-';

/// Path segment preceding the pod UID in orchestrator-supplied container paths.
pub const POD_MARKER_SEGMENT: &str = "pods";

/// Message carried by every successful response.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Application name used in log lines and CLI output.
pub const APP_NAME: &str = "logvol";

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "LOGVOL_CONFIG";

/// Environment variable overriding the driver log file.
pub const LOG_FILE_ENV: &str = "LOGVOL_LOG_FILE";
