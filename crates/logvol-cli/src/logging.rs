//! Tracing setup.
//!
//! Logs go to a file because stdout carries the protocol response. If the
//! file cannot be opened the driver logs to stderr instead of failing.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "debug";

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(log_file: &Path) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    match open_appender(log_file) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        Err(reason) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
            tracing::warn!(log_file = %log_file.display(), %reason, "logging to stderr");
            None
        }
    }
}

fn open_appender(log_file: &Path) -> Result<RollingFileAppender, String> {
    let dir = log_file
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = log_file
        .file_name()
        .ok_or_else(|| "log file path has no file name".to_owned())?
        .to_string_lossy()
        .into_owned();

    std::fs::create_dir_all(dir).map_err(|e| format!("create {}: {e}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appender_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("var/log/logvol.log");
        let _appender = open_appender(&file).expect("appender");
        assert!(file.parent().expect("parent").is_dir());
    }

    #[test]
    fn directory_path_is_rejected() {
        assert!(open_appender(Path::new("/")).is_err());
    }
}
