//! Mount: materialize a workload log directory and bind it into the container.

use std::collections::BTreeMap;
use std::path::Path;

use logvol_common::error::{LogvolError, Result};
use logvol_common::types::{Format, MountRequest, RawMountRequest};

use super::{ConfigSyncSummary, Driver, MountReport};
use crate::filesystem::HostFs;
use crate::filesystem::mount::BindMounter;
use crate::filesystem::sync::{FileSynchronizer, SyncOutcome};
use crate::identity::{self, ContainerPathInfo, DirectoryIdentity, InstanceKey};
use crate::template::{self, ConfigFields, TemplateKind};

impl<F: HostFs, M: BindMounter> Driver<F, M> {
    /// Mounts a workload log directory at `container`.
    ///
    /// Config generation for custom formats is best-effort: its failure is
    /// recorded in [`MountReport::warnings`] and the bind still happens.
    ///
    /// # Errors
    ///
    /// Returns [`LogvolError::Validation`] for an incomplete request or an
    /// unresolvable instance, before anything is created on disk;
    /// [`LogvolError::Directory`] if the layout or the
    /// host directory cannot be created, and [`LogvolError::Bind`] if the
    /// bind fails.
    pub fn mount(&self, container: &Path, raw: RawMountRequest) -> Result<MountReport> {
        let request = identity::normalize(raw.validate()?);
        tracing::debug!(container = %container.display(), ?request, "mount request");

        let instance_key = resolve_instance_key(container, &request)?;
        self.ensure_layout()?;

        let identity = DirectoryIdentity::derive(&request);
        let format = Format::classify(&request.format, &self.config.predefined_formats);
        let host_dir = self
            .resolver
            .host_log_dir(&identity, &instance_key, &format);

        let mut warnings = Vec::new();
        let config = if format.is_custom() {
            match self.sync_configs(&request, &instance_key, &host_dir) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::error!(instance = %instance_key, error = %e, "config sync failed, mounting anyway");
                    warnings.push(e);
                    None
                }
            }
        } else {
            None
        };

        self.ensure_dir(&host_dir)?;
        self.mounter.bind(&host_dir, container)?;

        tracing::info!(
            instance = %instance_key,
            host_dir = %host_dir.display(),
            container = %container.display(),
            format = %format,
            "volume mounted"
        );
        Ok(MountReport {
            instance_key,
            identity,
            host_dir,
            config,
            warnings,
        })
    }

    fn sync_configs(
        &self,
        request: &MountRequest,
        key: &InstanceKey,
        host_dir: &Path,
    ) -> Result<ConfigSyncSummary> {
        let paths = self.resolver.instance(key);
        let fields = ConfigFields::new(
            host_dir,
            &request.format,
            &request.cluster_id,
            &request.project_id,
            &paths.cluster_position,
            &paths.project_position,
        );
        let map = fields.to_map();

        let cluster = self.sync_scope(
            TemplateKind::Cluster,
            &map,
            &paths.staging_cluster,
            &paths.cluster_config,
        )?;
        let project = self.sync_scope(
            TemplateKind::Project,
            &map,
            &paths.staging_project,
            &paths.project_config,
        )?;
        Ok(ConfigSyncSummary { cluster, project })
    }

    fn sync_scope(
        &self,
        kind: TemplateKind,
        fields: &BTreeMap<&str, &str>,
        staging: &Path,
        destination: &Path,
    ) -> Result<SyncOutcome> {
        let text = template::render(kind, fields)
            .map_err(|e| LogvolError::config_sync(kind.name(), e))?;
        FileSynchronizer::new(&self.fs)
            .sync(text.as_bytes(), staging, destination)
            .map_err(|e| LogvolError::config_sync(kind.name(), e))
    }
}

/// Picks the instance key the matching unmount will reconstruct.
///
/// The container path wins because unmount only sees the path. A request
/// pod UID is used when the path carries none, and only if it and the
/// volume name are single path segments.
fn resolve_instance_key(container: &Path, request: &MountRequest) -> Result<InstanceKey> {
    match ContainerPathInfo::parse(container) {
        Ok(info) => {
            if request.pod_uid.as_deref().is_some_and(|uid| uid != info.pod_uid) {
                tracing::warn!(
                    path_uid = %info.pod_uid,
                    request_uid = ?request.pod_uid,
                    "pod UID in request differs from container path, using the path"
                );
            }
            if request.volume_name != info.volume_name {
                tracing::warn!(
                    path_volume = %info.volume_name,
                    request_volume = %request.volume_name,
                    "volume name in request differs from container path, using the path"
                );
            }
            Ok(info.instance_key())
        }
        Err(parse_err) => match request.pod_uid.as_deref() {
            Some(uid) => {
                tracing::warn!(error = %parse_err, "falling back to request pod UID; unmount cannot clean up this instance");
                InstanceKey::checked(uid, &request.volume_name)
            }
            None => Err(LogvolError::validation(format!(
                "no pod UID in request and {parse_err}"
            ))),
        },
    }
}
