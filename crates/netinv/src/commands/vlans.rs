//! `netinv vlans`

use netinv_api::DriverLauncher;
use netinv_core::{Inventory, VlanRecord};
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "VLAN")]
    name: String,
    #[tabled(rename = "Tag")]
    tag: String,
    #[tabled(rename = "Subnet")]
    subnet: String,
}

impl From<&VlanRecord> for VlanRow {
    fn from(v: &VlanRecord) -> Self {
        Self {
            name: v.name.clone(),
            tag: v.tag.clone(),
            subnet: v.subnet.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<L: DriverLauncher>(
    inventory: &Inventory<L>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = inventory.vlans().await?;
    super::note_issues(&out, "VLANs", global);

    let rendered = output::render_list(
        &global.output,
        &out.records,
        |v| VlanRow::from(v),
        |v| v.name.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
