//! `logvol mount` — bind a workload log directory into a container.

use std::path::Path;

use clap::Args;
use logvol_common::error::{LogvolError, Result};
use logvol_common::types::{DriverResponse, RawMountRequest};
use logvol_core::filesystem::HostFs;
use logvol_core::{BindMounter, Driver};

/// Arguments for the `mount` command.
#[derive(Args, Debug)]
pub struct MountArgs {
    /// Container path, then the JSON options object as the last argument.
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Executes the `mount` command.
pub fn execute<F: HostFs, M: BindMounter>(args: &MountArgs, driver: &Driver<F, M>) -> DriverResponse {
    tracing::debug!(args = ?args.args, "mount args");
    match run(args, driver) {
        Ok(()) => DriverResponse::success(),
        Err(e) => {
            tracing::error!(error = %e, "mount failed");
            DriverResponse::failure(&e)
        }
    }
}

fn run<F: HostFs, M: BindMounter>(args: &MountArgs, driver: &Driver<F, M>) -> Result<()> {
    let (container, options) = split_args(&args.args)?;
    let request = RawMountRequest::from_json(options)?;
    let report = driver.mount(container, request)?;
    for warning in &report.warnings {
        tracing::warn!(error = %warning, "mounted with degraded log shipping");
    }
    Ok(())
}

/// Container path is the first argument, options the last; anything in
/// between is ignored.
fn split_args(args: &[String]) -> Result<(&Path, &str)> {
    match args {
        [container, .., options] => Ok((Path::new(container), options.as_str())),
        _ => Err(LogvolError::validation(format!("mount: invalid args num, {args:?}"))),
    }
}
