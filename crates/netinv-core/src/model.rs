// ── Inventory record types ──
//
// Every field is a plain string: the portal renders free text and an empty
// source cell stays an empty string, never an absent value.

use serde::{Deserialize, Serialize};

/// One VLAN definition from the portal's summary page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanRecord {
    pub name: String,
    /// Empty when the block did not carry exactly a name and a tag.
    pub tag: String,
    /// CIDR notation (`10.0.0.0/24`), or empty when the subnet line did
    /// not parse.
    pub subnet: String,
}

/// One MAC address seen on a VLAN in the last reporting period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacRecord {
    pub nam: String,
    /// Resolved building name, or the raw facility code when unknown.
    pub building: String,
    pub room: String,
    pub switch: String,
    pub port: String,
    pub mac: String,
    pub last_seen: String,
}

/// One network access module (wall jack) on a VLAN span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamRecord {
    pub nam: String,
    /// Resolved building name, or the raw facility code when unknown.
    pub building: String,
    pub room: String,
    pub switch: String,
    pub port: String,
    pub port_state: String,
    pub configured_speed: String,
    pub actual_speed: String,
}
