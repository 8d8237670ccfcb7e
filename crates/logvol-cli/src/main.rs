//! # logvol — log volume driver
//!
//! Invoked by the orchestrator once per operation (`init`, `mount`,
//! `unmount`). Prints exactly one JSON response on stdout and exits zero;
//! failures are reported in the response, diagnostics go to the log file.

mod commands;
mod logging;
mod output;

use clap::Parser;
use clap::error::ErrorKind;
use logvol_common::types::DriverResponse;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let message = format!("invalid arguments: {}", e.kind());
            return output::print_response(&DriverResponse::failure(&message));
        }
    };

    let _guard = logging::init(&cli.log_file);
    let response = commands::execute(cli);
    output::print_response(&response)
}
