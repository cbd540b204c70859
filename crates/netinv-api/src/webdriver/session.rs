// WebDriver browser sessions
//
// `WebDriverLauncher` creates sessions (`POST /session`); each
// `WebDriverSession` implements `PortalDriver` with session-scoped
// commands under `/session/{id}/...`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use strum::Display;
use tracing::{debug, info};
use url::Url;

use super::client::WebDriverClient;
use crate::driver::{DriverLauncher, ElementRef, Locator, PortalDriver};
use crate::error::Error;

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Browser {
    #[default]
    Firefox,
    Chrome,
}

impl Browser {
    /// Parse a browser name as written in config files. Unknown names
    /// yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "firefox" | "gecko" => Some(Self::Firefox),
            "chrome" | "chromium" => Some(Self::Chrome),
            _ => None,
        }
    }
}

/// Capabilities requested when a session is created.
#[derive(Debug, Clone, Default)]
pub struct BrowserOptions {
    pub browser: Browser,
    /// Run without a visible window.
    pub headless: bool,
    /// Let the browser accept the portal's self-signed certificate.
    pub accept_insecure_certs: bool,
}

impl BrowserOptions {
    pub fn capabilities(&self) -> Value {
        let mut always_match = json!({
            "browserName": self.browser.to_string(),
            "acceptInsecureCerts": self.accept_insecure_certs,
        });

        if self.headless {
            let (key, arg) = match self.browser {
                Browser::Firefox => ("moz:firefoxOptions", "-headless"),
                Browser::Chrome => ("goog:chromeOptions", "--headless=new"),
            };
            if let Some(map) = always_match.as_object_mut() {
                map.insert(key.into(), json!({ "args": [arg] }));
            }
        }

        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

#[derive(Deserialize)]
struct WireElement {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    id: String,
}

impl From<WireElement> for ElementRef {
    fn from(wire: WireElement) -> Self {
        ElementRef::new(wire.id)
    }
}

fn element_json(element: &ElementRef) -> Value {
    json!({ ELEMENT_KEY: element.id() })
}

// ── Launcher ─────────────────────────────────────────────────────────

/// Starts browser sessions on a WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    client: WebDriverClient,
    options: BrowserOptions,
}

impl WebDriverLauncher {
    pub fn new(client: WebDriverClient, options: BrowserOptions) -> Self {
        Self { client, options }
    }
}

#[async_trait]
impl DriverLauncher for WebDriverLauncher {
    type Driver = WebDriverSession;

    async fn launch(&self) -> Result<WebDriverSession, Error> {
        let url = self.client.command_url("session")?;
        info!(browser = %self.options.browser, headless = self.options.headless, "starting browser session");

        let created: NewSession = self
            .client
            .post(url, &self.options.capabilities())
            .await
            .map_err(|e| match e {
                Error::WebDriver { message, .. } => Error::SessionNotCreated { message },
                other => other,
            })?;

        debug!(session_id = %created.session_id, "browser session created");
        Ok(WebDriverSession {
            client: self.client.clone(),
            session_id: created.session_id,
            closed: false,
        })
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// One live browser session on a WebDriver server.
#[derive(Debug)]
pub struct WebDriverSession {
    client: WebDriverClient,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn session_url(&self, suffix: &str) -> Result<Url, Error> {
        if self.closed {
            return Err(Error::SessionClosed);
        }
        if suffix.is_empty() {
            self.client.command_url(&format!("session/{}", self.session_id))
        } else {
            self.client
                .command_url(&format!("session/{}/{suffix}", self.session_id))
        }
    }
}

#[async_trait]
impl PortalDriver for WebDriverSession {
    async fn navigate(&mut self, url: &Url) -> Result<(), Error> {
        let endpoint = self.session_url("url")?;
        self.client
            .post::<Value>(endpoint, &json!({ "url": url.as_str() }))
            .await?;
        Ok(())
    }

    async fn title(&mut self) -> Result<String, Error> {
        let endpoint = self.session_url("title")?;
        self.client.get(endpoint).await
    }

    async fn page_source(&mut self) -> Result<String, Error> {
        let endpoint = self.session_url("source")?;
        self.client.get(endpoint).await
    }

    async fn find(&mut self, locator: &Locator) -> Result<ElementRef, Error> {
        let endpoint = self.session_url("element")?;
        let body = json!({ "using": "css selector", "value": locator.to_css() });
        match self.client.post::<WireElement>(endpoint, &body).await {
            Ok(element) => Ok(element.into()),
            Err(e) if e.is_no_such_element() => Err(Error::NoSuchElement {
                locator: locator.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, Error> {
        let endpoint = self.session_url("elements")?;
        let body = json!({ "using": "css selector", "value": locator.to_css() });
        let elements: Vec<WireElement> = self.client.post(endpoint, &body).await?;
        Ok(elements.into_iter().map(ElementRef::from).collect())
    }

    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), Error> {
        let endpoint = self.session_url(&format!("element/{}/value", element.id()))?;
        self.client
            .post::<Value>(endpoint, &json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn click(&mut self, element: &ElementRef) -> Result<(), Error> {
        let endpoint = self.session_url(&format!("element/{}/click", element.id()))?;
        self.client.post::<Value>(endpoint, &json!({})).await?;
        Ok(())
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String, Error> {
        let endpoint = self.session_url(&format!("element/{}/text", element.id()))?;
        self.client.get(endpoint).await
    }

    async fn enter_frame(&mut self, frame: &ElementRef) -> Result<(), Error> {
        let endpoint = self.session_url("frame")?;
        self.client
            .post::<Value>(endpoint, &json!({ "id": element_json(frame) }))
            .await?;
        Ok(())
    }

    async fn leave_frame(&mut self) -> Result<(), Error> {
        let endpoint = self.session_url("frame/parent")?;
        self.client.post::<Value>(endpoint, &json!({})).await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        let endpoint = self.session_url("")?;
        // Mark closed before the request: a failed DELETE still means the
        // session must not be driven again.
        self.closed = true;
        self.client.delete::<Value>(endpoint).await?;
        info!(session_id = %self.session_id, "browser session released");
        Ok(())
    }
}
