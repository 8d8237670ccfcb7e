//! Driver configuration injected at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{LogvolError, Result};

/// How bind and unbind are carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountBackend {
    /// Shell out to `mount -o bind` and `umount`.
    #[default]
    Command,
    /// Call `mount(2)` / `umount(2)` directly.
    Syscall,
}

/// Host layout and behavior of the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Base directory of the per-instance log directories.
    pub log_base_dir: PathBuf,
    /// Cluster-scope ingestion config directory.
    pub cluster_config_dir: PathBuf,
    /// Project-scope ingestion config directory.
    pub project_config_dir: PathBuf,
    /// Directory of the shipper's position files.
    pub position_dir: PathBuf,
    /// Scratch tree where configs are rendered before comparison.
    pub staging_dir: PathBuf,
    /// Formats the shipper parses natively.
    pub predefined_formats: Vec<String>,
    /// Bind/unbind implementation.
    pub mount_backend: MountBackend,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            log_base_dir: PathBuf::from(constants::DEFAULT_LOG_BASE_DIR),
            cluster_config_dir: PathBuf::from(constants::DEFAULT_CLUSTER_CONFIG_DIR),
            project_config_dir: PathBuf::from(constants::DEFAULT_PROJECT_CONFIG_DIR),
            position_dir: PathBuf::from(constants::DEFAULT_POSITION_DIR),
            staging_dir: PathBuf::from(constants::DEFAULT_STAGING_DIR),
            predefined_formats: constants::DEFAULT_PREDEFINED_FORMATS
                .iter()
                .map(|f| (*f).to_owned())
                .collect(),
            mount_backend: MountBackend::default(),
        }
    }
}

impl DriverConfig {
    /// Lays every directory out under a single root, keeping the default
    /// relative structure. Used by tests and sandboxed hosts.
    pub fn rooted_at(root: &Path) -> Self {
        let reroot = |p: &str| root.join(p.trim_start_matches('/'));
        Self {
            log_base_dir: reroot(constants::DEFAULT_LOG_BASE_DIR),
            cluster_config_dir: reroot(constants::DEFAULT_CLUSTER_CONFIG_DIR),
            project_config_dir: reroot(constants::DEFAULT_PROJECT_CONFIG_DIR),
            position_dir: reroot(constants::DEFAULT_POSITION_DIR),
            staging_dir: reroot(constants::DEFAULT_STAGING_DIR),
            ..Self::default()
        }
    }

    /// Loads a JSON config file. Absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| LogvolError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the driver cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        for (name, dir) in self.directories() {
            if dir.as_os_str().is_empty() {
                return Err(LogvolError::Config {
                    message: format!("{name} must not be empty"),
                });
            }
        }
        if self.predefined_formats.is_empty() {
            return Err(LogvolError::Config {
                message: "predefined_formats must not be empty".into(),
            });
        }
        if let Some(bad) = self
            .predefined_formats
            .iter()
            .find(|f| f.is_empty() || f.as_str() == constants::CUSTOM_FORMAT_DIR)
        {
            return Err(LogvolError::Config {
                message: format!("predefined format {bad:?} is reserved"),
            });
        }
        Ok(())
    }

    /// Cluster-scope staging subtree.
    pub fn staging_cluster_dir(&self) -> PathBuf {
        self.staging_dir.join(constants::STAGING_CLUSTER_SUBDIR)
    }

    /// Project-scope staging subtree.
    pub fn staging_project_dir(&self) -> PathBuf {
        self.staging_dir.join(constants::STAGING_PROJECT_SUBDIR)
    }

    /// Every directory the driver expects to exist before a mount.
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.staging_cluster_dir(),
            self.staging_project_dir(),
            self.project_config_dir.clone(),
            self.cluster_config_dir.clone(),
            self.log_base_dir.clone(),
        ]
    }

    fn directories(&self) -> [(&'static str, &Path); 5] {
        [
            ("log_base_dir", self.log_base_dir.as_path()),
            ("cluster_config_dir", self.cluster_config_dir.as_path()),
            ("project_config_dir", self.project_config_dir.as_path()),
            ("position_dir", self.position_dir.as_path()),
            ("staging_dir", self.staging_dir.as_path()),
        ]
    }
}
