//! `logvol unmount` — unbind a container path and clean up.

use std::path::Path;

use clap::Args;
use logvol_common::error::{LogvolError, Result};
use logvol_common::types::DriverResponse;
use logvol_core::filesystem::HostFs;
use logvol_core::{BindMounter, Driver};

/// Arguments for the `unmount` command.
#[derive(Args, Debug)]
pub struct UnmountArgs {
    /// Container path to unmount.
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Executes the `unmount` command.
pub fn execute<F: HostFs, M: BindMounter>(args: &UnmountArgs, driver: &Driver<F, M>) -> DriverResponse {
    tracing::debug!(args = ?args.args, "unmount args");
    match run(args, driver) {
        Ok(()) => DriverResponse::success(),
        Err(e) => {
            tracing::error!(error = %e, "unmount failed");
            DriverResponse::failure(&e)
        }
    }
}

fn run<F: HostFs, M: BindMounter>(args: &UnmountArgs, driver: &Driver<F, M>) -> Result<()> {
    let container = args
        .args
        .first()
        .map(Path::new)
        .ok_or_else(|| LogvolError::validation("unmount: invalid args num, []"))?;
    let report = driver.unmount(container)?;
    for warning in &report.warnings {
        tracing::warn!(error = %warning, "unmounted with leftover artifacts");
    }
    Ok(())
}
