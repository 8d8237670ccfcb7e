//! End-to-end lifecycle tests for the logvol driver.
//!
//! Every test runs the real controllers against a temporary root with a
//! recording mount service, covering:
//! 1. Mount with predefined and custom formats
//! 2. Request validation
//! 3. Write-if-changed config regeneration
//! 4. Mount/unmount symmetry and repeated unmounts
//! 5. Best-effort config sync and cleanup

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use logvol_common::config::DriverConfig;
use logvol_common::error::LogvolError;
use logvol_common::types::RawMountRequest;
use logvol_core::filesystem::HostFs;
use logvol_core::filesystem::sync::SyncOutcome;
use logvol_core::{BindMounter, Driver, LocalFs, UnbindOutcome};

const CONTAINER: &str = "/var/lib/kubelet/pods/u1/volumes/rancher.io~log-aggregator/v1";

// ── Fakes ────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingMounter {
    binds: RefCell<Vec<(PathBuf, PathBuf)>>,
    mounted: RefCell<HashSet<PathBuf>>,
    fail_bind: bool,
    fail_unbind: bool,
}

impl BindMounter for RecordingMounter {
    fn bind(&self, host: &Path, container: &Path) -> logvol_common::error::Result<()> {
        if self.fail_bind {
            return Err(LogvolError::Bind {
                host: host.to_path_buf(),
                container: container.to_path_buf(),
                detail: "exit status: 32, output: mount: permission denied".into(),
            });
        }
        assert!(host.is_dir(), "host dir must exist before bind");
        self.binds
            .borrow_mut()
            .push((host.to_path_buf(), container.to_path_buf()));
        let _ = self.mounted.borrow_mut().insert(container.to_path_buf());
        Ok(())
    }

    fn unbind(&self, container: &Path) -> logvol_common::error::Result<UnbindOutcome> {
        if self.fail_unbind {
            return Err(LogvolError::Unbind {
                container: container.to_path_buf(),
                detail: "exit status: 32, output: umount: target is busy".into(),
            });
        }
        if self.mounted.borrow_mut().remove(container) {
            Ok(UnbindOutcome::Unmounted)
        } else {
            Ok(UnbindOutcome::NotMounted)
        }
    }
}

/// Local filesystem that fails selected operations.
#[derive(Default)]
struct FaultyFs {
    fail_atomic_writes: bool,
    fail_remove: Option<PathBuf>,
}

impl HostFs for FaultyFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        LocalFs.create_dir_all(path)
    }

    fn read(&self, path: &Path) -> io::Result<Option<Vec<u8>>> {
        LocalFs.read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        LocalFs.write(path, contents)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.fail_atomic_writes {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only config dir"));
        }
        LocalFs.write_atomic(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<bool> {
        if self.fail_remove.as_deref() == Some(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "busy"));
        }
        LocalFs.remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<bool> {
        LocalFs.remove_dir_all(path)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn request(format: &str) -> RawMountRequest {
    RawMountRequest::from_json(&format!(
        r#"{{
            "clusterName": "c1", "clusterID": "c1", "projectName": "p1",
            "projectID": "p1", "namespace": "ns1", "workloadName": "w1",
            "containerName": "ctr1", "volumeName": "v1", "format": "{format}",
            "kubernetes.io/pod.uid": "u1"
        }}"#
    ))
    .expect("request json")
}

fn driver_with<F: HostFs>(
    root: &Path,
    fs: F,
    mounter: RecordingMounter,
) -> Driver<F, RecordingMounter> {
    Driver::new(DriverConfig::rooted_at(root), fs, mounter)
}

fn driver(root: &Path) -> Driver<LocalFs, RecordingMounter> {
    driver_with(root, LocalFs, RecordingMounter::default())
}

fn container() -> &'static Path {
    Path::new(CONTAINER)
}

// ── Mount ────────────────────────────────────────────────────────────

#[test]
fn mount_predefined_format_binds_host_dir() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());

    let report = driver.mount(container(), request("json")).expect("mount");

    let expected = driver
        .config()
        .log_base_dir
        .join("u1_v1/json/c1_c1_ns1_p1_p1_w1_ctr1");
    assert_eq!(report.host_dir, expected);
    assert!(expected.is_dir());
    assert_eq!(report.instance_key.as_str(), "u1_v1");
    assert!(report.config.is_none());
    assert!(report.warnings.is_empty());
    assert_eq!(
        *driver.mounter().binds.borrow(),
        vec![(expected.clone(), container().to_path_buf())]
    );

    let paths = driver.resolver().instance(&report.instance_key);
    assert!(!paths.cluster_config.exists());
    assert!(!paths.project_config.exists());
}

#[test]
fn mount_custom_format_writes_both_configs() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());

    let report = driver.mount(container(), request("custom")).expect("mount");
    let paths = driver.resolver().instance(&report.instance_key);

    assert!(report.host_dir.starts_with(driver.config().log_base_dir.join("u1_v1/custom")));
    let glob = format!("path {}/*.*\n", report.host_dir.display());

    let cluster = std::fs::read_to_string(&paths.cluster_config).expect("cluster config");
    assert!(cluster.contains(&glob), "{cluster}");
    assert!(cluster.contains("format custom\n"));
    assert!(cluster.contains(&format!("pos_file {}\n", paths.cluster_position.display())));

    let project = std::fs::read_to_string(&paths.project_config).expect("project config");
    assert!(project.contains(&glob));
    assert!(project.contains("tag project-custom.c1:p1.*\n"));

    assert!(!paths.staging_cluster.exists());
    assert!(!paths.staging_project.exists());
}

#[test]
fn configs_exist_even_when_bind_fails() {
    let root = tempfile::tempdir().expect("tempdir");
    let mounter = RecordingMounter {
        fail_bind: true,
        ..RecordingMounter::default()
    };
    let driver = driver_with(root.path(), LocalFs, mounter);

    let err = driver.mount(container(), request("custom")).expect_err("bind fails");
    assert!(matches!(err, LogvolError::Bind { .. }));
    assert!(err.to_string().contains("permission denied"));

    let paths = driver
        .resolver()
        .instance(&logvol_core::identity::InstanceKey::new("u1", "v1"));
    assert!(paths.cluster_config.is_file());
    assert!(paths.project_config.is_file());
}

#[test]
fn missing_workload_name_creates_nothing() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());
    let mut raw = request("json");
    raw.workload_name = None;

    let err = driver.mount(container(), raw).expect_err("must fail");

    assert!(matches!(err, LogvolError::Validation { .. }));
    assert!(err.to_string().contains("workloadName"));
    assert_eq!(std::fs::read_dir(root.path()).expect("ls").count(), 0);
}

#[test]
fn remount_leaves_configs_untouched() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());

    let first = driver.mount(container(), request("custom")).expect("first");
    let second = driver.mount(container(), request("custom")).expect("second");

    let first = first.config.expect("synced");
    let second = second.config.expect("synced");
    assert_eq!(first.cluster, SyncOutcome::Written);
    assert_eq!(first.project, SyncOutcome::Written);
    assert_eq!(second.cluster, SyncOutcome::Unchanged);
    assert_eq!(second.project, SyncOutcome::Unchanged);
}

#[test]
fn delimiter_in_project_name_is_escaped() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());
    let mut raw = request("json");
    raw.project_name = Some("team_a".into());

    let report = driver.mount(container(), raw).expect("mount");

    assert_eq!(report.identity.components().len(), 7);
    assert_eq!(report.identity.components()[4], "team-a");
    assert_eq!(
        report.host_dir.file_name().and_then(|n| n.to_str()),
        Some("c1_c1_ns1_p1_team-a_w1_ctr1")
    );
}

#[test]
fn config_sync_failure_still_mounts() {
    let root = tempfile::tempdir().expect("tempdir");
    let fs = FaultyFs {
        fail_atomic_writes: true,
        ..FaultyFs::default()
    };
    let driver = driver_with(root.path(), fs, RecordingMounter::default());

    let report = driver.mount(container(), request("custom")).expect("mount");

    assert!(report.config.is_none());
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        LogvolError::ConfigSync { scope: "cluster", .. }
    ));
    assert!(report.host_dir.is_dir());
}

// ── Unmount ──────────────────────────────────────────────────────────

#[test]
fn unmount_removes_every_artifact() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());
    let report = driver.mount(container(), request("custom")).expect("mount");
    let paths = driver.resolver().instance(&report.instance_key);

    std::fs::create_dir_all(&driver.config().position_dir).expect("pos dir");
    std::fs::write(&paths.cluster_position, b"pos").expect("cluster pos");
    std::fs::write(&paths.project_position, b"pos").expect("project pos");
    std::fs::write(report.host_dir.join("app.log"), b"line\n").expect("log");

    let unmounted = driver.unmount(container()).expect("unmount");

    assert_eq!(unmounted.unbind, UnbindOutcome::Unmounted);
    assert_eq!(unmounted.instance_key, Some(report.instance_key));
    assert!(unmounted.warnings.is_empty());
    assert_eq!(unmounted.removed.len(), 5);
    for gone in [
        &paths.cluster_config,
        &paths.project_config,
        &paths.cluster_position,
        &paths.project_position,
        &paths.instance_root,
    ] {
        assert!(!gone.exists(), "{} left behind", gone.display());
    }
    assert!(driver.config().log_base_dir.is_dir());
}

#[test]
fn unmount_twice_succeeds() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());
    let _ = driver.mount(container(), request("json")).expect("mount");

    let first = driver.unmount(container()).expect("first");
    let second = driver.unmount(container()).expect("second");

    assert_eq!(first.unbind, UnbindOutcome::Unmounted);
    assert_eq!(second.unbind, UnbindOutcome::NotMounted);
    assert!(second.removed.is_empty());
    assert!(second.warnings.is_empty());
}

#[test]
fn unmount_without_pod_marker_warns() {
    let root = tempfile::tempdir().expect("tempdir");
    let driver = driver(root.path());

    let report = driver.unmount(Path::new("/mnt/v1")).expect("unmount");

    assert!(report.instance_key.is_none());
    assert!(matches!(report.warnings[..], [LogvolError::PathParse { .. }]));
}

#[test]
fn unbind_failure_keeps_artifacts() {
    let root = tempfile::tempdir().expect("tempdir");
    let mounter = RecordingMounter {
        fail_unbind: true,
        ..RecordingMounter::default()
    };
    let driver = driver_with(root.path(), LocalFs, mounter);
    let report = driver.mount(container(), request("custom")).expect("mount");

    let err = driver.unmount(container()).expect_err("unbind fails");

    assert!(matches!(err, LogvolError::Unbind { .. }));
    assert!(err.to_string().contains("target is busy"));
    assert!(report.host_dir.is_dir());
    assert!(driver.resolver().instance(&report.instance_key).cluster_config.is_file());
}

#[test]
fn cleanup_failure_is_a_warning() {
    let root = tempfile::tempdir().expect("tempdir");
    let config = DriverConfig::rooted_at(root.path());
    let blocked = config.cluster_config_dir.join("u1_v1.conf");
    let fs = FaultyFs {
        fail_remove: Some(blocked.clone()),
        ..FaultyFs::default()
    };
    let driver = Driver::new(config, fs, RecordingMounter::default());
    let report = driver.mount(container(), request("custom")).expect("mount");

    let unmounted = driver.unmount(container()).expect("unmount");

    assert_eq!(unmounted.warnings.len(), 1);
    assert!(matches!(
        &unmounted.warnings[0],
        LogvolError::Cleanup { path, .. } if *path == blocked
    ));
    assert!(blocked.exists());
    let paths = driver.resolver().instance(&report.instance_key);
    assert!(!paths.project_config.exists());
    assert!(!paths.instance_root.exists());
}
