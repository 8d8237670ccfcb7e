//! Host path layout for a mount instance.
//!
//! ```text
//! <log_base_dir>/<instance>/<format|custom>/<identity>   host log directory
//! <cluster_config_dir>/<instance>.conf                  cluster-scope config
//! <project_config_dir>/<instance>.conf                  project-scope config
//! <position_dir>/custom_{cluster,project}_userformat_<instance>.pos
//! ```
//!
//! Every function is pure. The filesystem tree built from these paths is
//! the only record of a mount, so the same inputs must always give the
//! same paths.

use std::path::PathBuf;

use logvol_common::config::DriverConfig;
use logvol_common::constants::{
    CLUSTER_POSITION_PREFIX, CONFIG_EXTENSION, POSITION_EXTENSION, PROJECT_POSITION_PREFIX,
};
use logvol_common::types::Format;

use crate::identity::{DirectoryIdentity, InstanceKey};

/// Per-instance artifacts that unmount removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePaths {
    /// Root of the instance's log directories (`<log_base_dir>/<instance>`).
    pub instance_root: PathBuf,
    /// Cluster-scope config file.
    pub cluster_config: PathBuf,
    /// Project-scope config file.
    pub project_config: PathBuf,
    /// Cluster-scope position file.
    pub cluster_position: PathBuf,
    /// Project-scope position file.
    pub project_position: PathBuf,
    /// Cluster-scope staging file.
    pub staging_cluster: PathBuf,
    /// Project-scope staging file.
    pub staging_project: PathBuf,
}

/// Maps identities onto the configured host layout.
#[derive(Debug, Clone)]
pub struct PathResolver {
    log_base_dir: PathBuf,
    cluster_config_dir: PathBuf,
    project_config_dir: PathBuf,
    position_dir: PathBuf,
    staging_cluster_dir: PathBuf,
    staging_project_dir: PathBuf,
}

impl PathResolver {
    /// Creates a resolver over the configured directories.
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            log_base_dir: config.log_base_dir.clone(),
            cluster_config_dir: config.cluster_config_dir.clone(),
            project_config_dir: config.project_config_dir.clone(),
            position_dir: config.position_dir.clone(),
            staging_cluster_dir: config.staging_cluster_dir(),
            staging_project_dir: config.staging_project_dir(),
        }
    }

    /// Host directory that gets bind-mounted into the container.
    pub fn host_log_dir(
        &self,
        identity: &DirectoryIdentity,
        key: &InstanceKey,
        format: &Format,
    ) -> PathBuf {
        self.log_base_dir
            .join(key.as_str())
            .join(format.dir_segment())
            .join(identity.as_str())
    }

    /// All per-instance artifact paths for `key`.
    pub fn instance(&self, key: &InstanceKey) -> InstancePaths {
        let config_name = format!("{key}{CONFIG_EXTENSION}");
        InstancePaths {
            instance_root: self.log_base_dir.join(key.as_str()),
            cluster_config: self.cluster_config_dir.join(&config_name),
            project_config: self.project_config_dir.join(&config_name),
            cluster_position: self
                .position_dir
                .join(format!("{CLUSTER_POSITION_PREFIX}{key}{POSITION_EXTENSION}")),
            project_position: self
                .position_dir
                .join(format!("{PROJECT_POSITION_PREFIX}{key}{POSITION_EXTENSION}")),
            staging_cluster: self.staging_cluster_dir.join(&config_name),
            staging_project: self.staging_project_dir.join(&config_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new(&DriverConfig::default())
    }

    fn identity() -> DirectoryIdentity {
        let req = logvol_common::types::RawMountRequest {
            cluster_name: Some("c1".into()),
            cluster_id: Some("c1".into()),
            project_name: Some("p1".into()),
            project_id: Some("p1".into()),
            namespace: Some("ns1".into()),
            workload_name: Some("w1".into()),
            container_name: Some("ctr1".into()),
            volume_name: Some("v1".into()),
            format: Some("json".into()),
            pod_name: None,
            pod_uid: Some("u1".into()),
        }
        .validate()
        .expect("valid");
        DirectoryIdentity::derive(&req)
    }

    #[test]
    fn predefined_format_dir() {
        let key = InstanceKey::new("u1", "v1");
        let predefined = ["json".to_owned()];
        let dir = resolver().host_log_dir(&identity(), &key, &Format::classify("json", &predefined));
        assert_eq!(
            dir,
            Path::new("/var/log/rancher-log-volumes/u1_v1/json/c1_c1_ns1_p1_p1_w1_ctr1")
        );
    }

    #[test]
    fn custom_format_dir() {
        let key = InstanceKey::new("u1", "v1");
        let dir = resolver().host_log_dir(&identity(), &key, &Format::Custom("/^x$/".into()));
        assert!(dir.starts_with("/var/log/rancher-log-volumes/u1_v1/custom"));
    }

    #[test]
    fn instance_artifacts() {
        let paths = resolver().instance(&InstanceKey::new("u1", "v1"));
        assert_eq!(
            paths.cluster_config,
            Path::new("/var/lib/fluentd/etc/config/customer/cluster/u1_v1.conf")
        );
        assert_eq!(
            paths.project_config,
            Path::new("/var/lib/fluentd/etc/config/customer/project/u1_v1.conf")
        );
        assert_eq!(
            paths.cluster_position,
            Path::new("/fluentd/etc/log/custom_cluster_userformat_u1_v1.pos")
        );
        assert_eq!(
            paths.project_position,
            Path::new("/fluentd/etc/log/custom_project_userformat_u1_v1.pos")
        );
        assert_eq!(
            paths.staging_cluster,
            Path::new("/tmp/fluentd/etc/config/customer/cluster/u1_v1.conf")
        );
        assert_eq!(paths.instance_root, Path::new("/var/log/rancher-log-volumes/u1_v1"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let key = InstanceKey::new("u1", "v1");
        let format = Format::Custom("csv".into());
        let r = resolver();
        assert_eq!(
            r.host_log_dir(&identity(), &key, &format),
            r.host_log_dir(&identity(), &key, &format)
        );
        assert_eq!(r.instance(&key), r.instance(&key));
    }

    #[test]
    fn different_instances_never_share_artifacts() {
        let r = resolver();
        let a = r.instance(&InstanceKey::new("u1", "v1"));
        let b = r.instance(&InstanceKey::new("u2", "v1"));
        let c = r.instance(&InstanceKey::new("u1", "v2"));
        assert_ne!(a.cluster_config, b.cluster_config);
        assert_ne!(a.cluster_config, c.cluster_config);
        assert_ne!(a.instance_root, b.instance_root);
    }
}
