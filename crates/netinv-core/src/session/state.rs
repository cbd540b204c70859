// ── Session state machine ──
//
// A pure transition function: given the current state, an event and the
// portal environment, return the next state plus the side effects the
// controller must perform. Nothing here touches the browser.

use netinv_api::Environment;
use strum::Display;
use thiserror::Error;

/// Lifecycle of one portal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticating,
    /// Production only: the out-of-band challenge is in progress.
    SecondaryFactorPending,
    Live,
    /// A fetched page failed the liveness check.
    Stale,
    /// Terminal. The browser session has been released, after a fault or
    /// an explicit close.
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed)
    }

    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionEvent {
    /// Start the first login.
    Begin,
    /// The login form was filled and submitted.
    CredentialsSubmitted,
    /// The manual push was requested inside the challenge frame.
    PushRequested,
    /// The post-login liveness marker was observed.
    MarkerConfirmed,
    /// A fetched page failed the liveness check.
    LivenessLost,
    /// Re-run the login flow after going stale.
    Relogin,
    /// Any unrecoverable failure.
    Fault,
    /// The caller is done with the session.
    Close,
}

/// Side effects requested by a transition, executed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Effect {
    LaunchDriver,
    SubmitCredentials,
    RunSecondaryFactor,
    AwaitMarker,
    Release,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: SessionState, effects: &[Effect]) -> Self {
        Self {
            next,
            effects: effects.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid session transition: {event} while {from}")]
pub struct InvalidTransition {
    pub from: SessionState,
    pub event: SessionEvent,
}

/// Compute the next state for `event`.
///
/// The only backward edge is `Stale --Relogin--> Authenticating`.
/// `Fault` and `Close` move any non-terminal state to `Failed` and request
/// release.
pub fn transition(
    state: SessionState,
    event: SessionEvent,
    environment: Environment,
) -> Result<Transition, InvalidTransition> {
    use Effect::{AwaitMarker, LaunchDriver, Release, RunSecondaryFactor, SubmitCredentials};
    use SessionEvent as E;
    use SessionState as S;

    let next = match (state, event) {
        (S::Unauthenticated, E::Begin) => {
            Transition::to(S::Authenticating, &[LaunchDriver, SubmitCredentials])
        }
        (S::Stale, E::Relogin) => Transition::to(S::Authenticating, &[SubmitCredentials]),

        (S::Authenticating, E::CredentialsSubmitted) => {
            if environment.requires_secondary_factor() {
                Transition::to(S::SecondaryFactorPending, &[RunSecondaryFactor])
            } else {
                Transition::to(S::Authenticating, &[AwaitMarker])
            }
        }
        (S::SecondaryFactorPending, E::PushRequested) => {
            Transition::to(S::SecondaryFactorPending, &[AwaitMarker])
        }
        (S::Authenticating | S::SecondaryFactorPending, E::MarkerConfirmed) => {
            Transition::to(S::Live, &[])
        }

        (S::Live, E::LivenessLost) => Transition::to(S::Stale, &[]),

        (from, E::Fault | E::Close) if !from.is_terminal() => {
            Transition::to(S::Failed, &[Release])
        }

        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}
