//! `logvol init` — prepare the host layout.

use logvol_common::types::DriverResponse;
use logvol_core::filesystem::HostFs;
use logvol_core::{BindMounter, Driver};

/// Executes the `init` command.
pub fn execute<F: HostFs, M: BindMounter>(driver: &Driver<F, M>) -> DriverResponse {
    match driver.init() {
        Ok(()) => DriverResponse::initialized(),
        Err(e) => {
            tracing::error!(error = %e, "init failed");
            DriverResponse::failure(&e)
        }
    }
}
