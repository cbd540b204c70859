// Portal session: state machine, login flow, liveness.

pub mod controller;
pub mod liveness;
pub mod secondary_factor;
pub mod state;
mod wait;

pub use controller::SessionController;
pub use liveness::{LIVENESS_MARKER, is_live};
pub use secondary_factor::SecondaryFactorHandler;
pub use state::{Effect, InvalidTransition, SessionEvent, SessionState, Transition, transition};
