//! Response printing.
//!
//! The orchestrator reads a single JSON object from stdout, so nothing else
//! may be written there.

use std::io::Write;

use logvol_common::types::DriverResponse;

/// Serializes a response to its one-line wire form.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(response: &DriverResponse) -> serde_json::Result<String> {
    serde_json::to_string(response)
}

/// Prints a response as the only line on stdout.
///
/// # Errors
///
/// Returns an error if the response cannot be serialized or written.
pub fn print_response(response: &DriverResponse) -> anyhow::Result<()> {
    let line = render(response)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}
