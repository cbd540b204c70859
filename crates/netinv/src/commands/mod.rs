//! Command dispatch: bridges CLI args -> inventory calls -> output formatting.

pub mod config_cmd;
pub mod macs;
pub mod nams;
pub mod vlans;

use netinv_api::DriverLauncher;
use netinv_core::{Extraction, Inventory};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a portal-bound command to the appropriate handler.
pub async fn dispatch<L: DriverLauncher>(
    cmd: Command,
    inventory: &Inventory<L>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Vlans => vlans::handle(inventory, global).await,
        Command::Macs(args) => macs::handle(inventory, args, global).await,
        Command::Nams(args) => nams::handle(inventory, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Tell the user on stderr when some rows or fields did not parse. Each
/// issue was already logged at WARN.
fn note_issues<T>(out: &Extraction<T>, what: &str, global: &GlobalOpts) {
    if global.quiet || out.is_complete() {
        return;
    }
    eprintln!(
        "{} {what} with parse issues ({} issue(s)); affected fields were left empty or rows skipped",
        out.records.len(),
        out.issues.len()
    );
}
