//! Orchestrator command definitions and dispatch.

pub mod init;
pub mod mount;
pub mod unmount;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use logvol_common::config::DriverConfig;
use logvol_common::constants::{CONFIG_ENV, DEFAULT_LOG_FILE, LOG_FILE_ENV};
use logvol_common::error::Result;
use logvol_common::types::DriverResponse;
use logvol_core::filesystem::HostFs;
use logvol_core::{BindMounter, Driver, LocalFs, mounter_for};

/// logvol — binds per-workload log directories into containers and keeps
/// the log shipper's ingestion configs in sync.
#[derive(Parser, Debug)]
#[command(name = "logvol", version, about, long_about = None)]
pub struct Cli {
    /// Command issued by the orchestrator.
    #[command(subcommand)]
    pub command: Command,

    /// JSON file overriding the default host layout.
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Driver log file.
    #[arg(long, global = true, env = LOG_FILE_ENV, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
}

/// Commands of the volume driver protocol.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prepare the host layout and report capabilities.
    Init,
    /// Mount a workload log directory at a container path.
    Mount(mount::MountArgs),
    /// Unmount a container path and remove its artifacts.
    Unmount(unmount::UnmountArgs),
    /// Any other protocol command.
    #[command(external_subcommand)]
    Unsupported(Vec<String>),
}

/// Runs the parsed command and returns its response.
pub fn execute(cli: Cli) -> DriverResponse {
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "cannot load driver configuration");
            return DriverResponse::failure(&e);
        }
    };
    let mounter = mounter_for(config.mount_backend);
    let driver = Driver::new(config, LocalFs, mounter);
    dispatch(cli.command, &driver)
}

/// Dispatches a command to its handler.
pub fn dispatch<F: HostFs, M: BindMounter>(command: Command, driver: &Driver<F, M>) -> DriverResponse {
    match command {
        Command::Init => init::execute(driver),
        Command::Mount(args) => mount::execute(&args, driver),
        Command::Unmount(args) => unmount::execute(&args, driver),
        Command::Unsupported(argv) => {
            let name = argv.first().map_or("command", String::as_str);
            tracing::info!(command = name, "unsupported command");
            DriverResponse::not_supported(name)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DriverConfig> {
    path.map_or_else(|| Ok(DriverConfig::default()), DriverConfig::load)
}
