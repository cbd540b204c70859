//! `netinv nams <VLAN>`

use netinv_api::DriverLauncher;
use netinv_core::{Inventory, NamRecord};
use tabled::Tabled;

use crate::cli::{GlobalOpts, VlanArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NamRow {
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
    #[tabled(rename = "State")]
    port_state: String,
    #[tabled(rename = "Speed (cfg)")]
    configured_speed: String,
    #[tabled(rename = "Speed (actual)")]
    actual_speed: String,
}

impl From<&NamRecord> for NamRow {
    fn from(n: &NamRecord) -> Self {
        Self {
            nam: n.nam.clone(),
            building: n.building.clone(),
            room: n.room.clone(),
            switch: n.switch.clone(),
            port: n.port.clone(),
            port_state: n.port_state.clone(),
            configured_speed: n.configured_speed.clone(),
            actual_speed: n.actual_speed.clone(),
        }
    }
}

pub async fn handle<L: DriverLauncher>(
    inventory: &Inventory<L>,
    args: VlanArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = inventory.nams(&args.vlan).await?;
    super::note_issues(&out, "NAM rows", global);

    let rendered = output::render_list(
        &global.output,
        &out.records,
        |n| NamRow::from(n),
        |n| n.nam.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
