// WebDriver HTTP client
//
// Wraps `reqwest::Client` with W3C WebDriver URL construction and
// `{"value": ...}` envelope unwrapping. Session-scoped commands live in
// `session.rs`; this module only knows transport mechanics.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Every WebDriver response body is `{"value": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    value: T,
}

/// Error payload carried inside the envelope on non-2xx responses.
#[derive(Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

/// Raw HTTP client for a WebDriver server.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl WebDriverClient {
    /// Create a client for the WebDriver server at `endpoint`
    /// (e.g. `http://localhost:4444` for geckodriver, or
    /// `http://grid:4444/wd/hub` for a Selenium grid).
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, endpoint })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{endpoint}/{path}`, preserving any path prefix on the endpoint.
    pub(crate) fn command_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let full = format!("{base}/{}", path.trim_start_matches('/'));
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_envelope(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(&self, url: Url, body: &Value) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_envelope(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await.map_err(Error::Transport)?;
        Self::parse_envelope(resp).await
    }

    /// Unwrap `{"value": T}` on success, or turn the
    /// `{"value": {"error", "message"}}` payload into [`Error::WebDriver`].
    async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(%status, bytes = body.len(), "webdriver response");

        if !status.is_success() {
            return Err(match serde_json::from_str::<Envelope<WireError>>(&body) {
                Ok(envelope) => Error::WebDriver {
                    error: envelope.value.error,
                    message: envelope.value.message,
                    status: status.as_u16(),
                },
                Err(_) => Error::WebDriver {
                    error: "unknown error".into(),
                    message: body.chars().take(200).collect(),
                    status: status.as_u16(),
                },
            });
        }

        serde_json::from_str::<Envelope<T>>(&body)
            .map(|envelope| envelope.value)
            .map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.clone(),
                }
            })
    }
}
