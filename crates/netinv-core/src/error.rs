// ── Core error types ──
//
// Session- and extraction-level errors. Callers never see raw WebDriver
// payloads unless a driver failure is the actual cause; authentication
// failures are classified, and liveness failures carry the last observed
// page title plus the URL that was requested.

use std::time::Duration;

use thiserror::Error;

use crate::session::state::{InvalidTransition, SessionState};

/// Why a login (or re-login) did not reach a live session.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The liveness marker never showed up after submitting credentials.
    #[error("Credentials rejected: page title was {title:?} after login")]
    CredentialRejected { title: String },

    /// A secondary-factor control did not appear within its budget.
    #[error("Secondary-factor challenge did not present {control} within {waited:?}")]
    SecondaryFactorTimeout { control: String, waited: Duration },

    /// The one-shot refresh after a stale page failed.
    #[error("Re-login failed: {source}")]
    ReloginFailed {
        #[source]
        source: Box<AuthenticationError>,
    },

    /// The browser driver failed underneath the login flow.
    #[error("Browser driver error during login: {0}")]
    Driver(#[from] netinv_api::Error),

    #[error(transparent)]
    InvalidState(#[from] InvalidTransition),
}

impl AuthenticationError {
    /// The innermost cause, looking through `ReloginFailed`.
    pub fn root(&self) -> &AuthenticationError {
        match self {
            Self::ReloginFailed { source } => source.root(),
            other => other,
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// The session was confirmed live (or just refreshed) but the page
    /// still lacks the expected content: the portal layout likely changed.
    #[error("Expected data missing at {url} (page title {title:?})")]
    MissingData { title: String, url: String },

    #[error("Session is {state}; no page can be fetched")]
    SessionUnavailable { state: SessionState },

    #[error(transparent)]
    InvalidState(#[from] InvalidTransition),

    #[error("Browser driver error: {0}")]
    Driver(#[from] netinv_api::Error),

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Failed to load building names from {origin}: {source}")]
    BuildingTable {
        origin: String,
        #[source]
        source: csv::Error,
    },
}
