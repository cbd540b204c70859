//! `netinv macs <VLAN>`

use netinv_api::DriverLauncher;
use netinv_core::{Inventory, MacRecord};
use tabled::Tabled;

use crate::cli::{GlobalOpts, VlanArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct MacRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "NAM")]
    nam: String,
    #[tabled(rename = "Building")]
    building: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Switch")]
    switch: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&MacRecord> for MacRow {
    fn from(m: &MacRecord) -> Self {
        Self {
            mac: m.mac.clone(),
            nam: m.nam.clone(),
            building: m.building.clone(),
            room: m.room.clone(),
            switch: m.switch.clone(),
            port: m.port.clone(),
            last_seen: m.last_seen.clone(),
        }
    }
}

pub async fn handle<L: DriverLauncher>(
    inventory: &Inventory<L>,
    args: VlanArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = inventory.active_macs(&args.vlan).await?;
    super::note_issues(&out, "MAC rows", global);

    let rendered = output::render_list(
        &global.output,
        &out.records,
        |m| MacRow::from(m),
        |m| m.mac.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
