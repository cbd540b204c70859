use thiserror::Error;

/// Top-level error type for the `netinv-api` crate.
///
/// Covers every failure mode of the browser-driver surface: HTTP transport
/// to the WebDriver server, protocol-level WebDriver errors, and response
/// decoding. `netinv-core` maps these into session-level diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration error for the WebDriver endpoint.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── WebDriver ───────────────────────────────────────────────────
    /// The WebDriver server refused to start a browser session.
    #[error("WebDriver session could not be created: {message}")]
    SessionNotCreated { message: String },

    /// No element matched the locator in the current browsing context.
    #[error("No element matches {locator}")]
    NoSuchElement { locator: String },

    /// Structured error from the WebDriver server
    /// (`{"value": {"error": ..., "message": ...}}`).
    #[error("WebDriver error '{error}' (HTTP {status}): {message}")]
    WebDriver {
        error: String,
        message: String,
        status: u16,
    },

    /// The browser session was already released.
    #[error("Browser session already closed")]
    SessionClosed,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if no element matched a locator.
    pub fn is_no_such_element(&self) -> bool {
        match self {
            Self::NoSuchElement { .. } => true,
            Self::WebDriver { error, .. } => error == "no such element",
            _ => false,
        }
    }

    /// Returns `true` if the browser session no longer exists server-side.
    pub fn is_session_gone(&self) -> bool {
        match self {
            Self::SessionClosed => true,
            Self::WebDriver { error, .. } => error == "invalid session id",
            _ => false,
        }
    }

    /// Returns `true` if this is a transient transport error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::WebDriver { error, .. } => error == "timeout",
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_such_element_is_recognized_in_both_shapes() {
        let wire = Error::WebDriver {
            error: "no such element".into(),
            message: "Unable to locate element: .btn-cancel".into(),
            status: 404,
        };
        let mapped = Error::NoSuchElement {
            locator: "class=btn-cancel".into(),
        };
        assert!(wire.is_no_such_element());
        assert!(mapped.is_no_such_element());
        assert!(!Error::SessionClosed.is_no_such_element());
    }

    #[test]
    fn invalid_session_id_means_session_gone() {
        let err = Error::WebDriver {
            error: "invalid session id".into(),
            message: "Tried to run command without establishing a connection".into(),
            status: 404,
        };
        assert!(err.is_session_gone());
        assert!(Error::SessionClosed.is_session_gone());
    }
}
