// netinv-core: portal session control and inventory extraction.
//
// Sits between the WebDriver surface in `netinv-api` and the CLI. Owns the
// login state machine, the secondary-factor flow, liveness checks and the
// parsers that turn portal pages into typed records.

pub mod buildings;
pub mod config;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod model;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use buildings::{BuildingEntry, BuildingNameMap};
pub use config::{BuildingSources, DriverConfig, PortalConfig, PortalSelectors, Timings};
pub use error::{AuthenticationError, CoreError};
pub use extract::{Extraction, ParseIssue};
pub use inventory::Inventory;
pub use model::{MacRecord, NamRecord, VlanRecord};
pub use session::{SessionController, SessionState};
