// ── Runtime portal configuration ──
//
// These types describe *how* to reach and log into the portal. They carry
// timing budgets, selectors and driver settings but never touch disk.
// The CLI (via `netinv-config`) constructs them and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use netinv_api::{
    BrowserOptions, Environment, Locator, TransportConfig, WebDriverClient, WebDriverLauncher,
};
use tracing::warn;
use url::Url;

use crate::error::CoreError;

// ── Timing budgets ───────────────────────────────────────────────────

/// Pause after credential submission before looking for the
/// secondary-factor frame.
pub const SECONDARY_FACTOR_SETTLE: Duration = Duration::from_secs(5);

/// How long the cancel control may take to appear inside the frame.
pub const CANCEL_CONTROL_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between cancelling the automatic push and requesting a manual
/// one. The factor provider flags back-to-back pushes as anomalous; this
/// delay is required by that provider.
pub const ANOMALY_DETECTION_COOLDOWN: Duration = Duration::from_secs(60);

/// How long the post-login page may take to show the liveness marker.
pub const LOGIN_MARKER_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval for every bounded wait.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Every suspension point of the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub factor_settle: Duration,
    pub cancel_control_timeout: Duration,
    pub anomaly_cooldown: Duration,
    pub marker_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            factor_settle: SECONDARY_FACTOR_SETTLE,
            cancel_control_timeout: CANCEL_CONTROL_TIMEOUT,
            anomaly_cooldown: ANOMALY_DETECTION_COOLDOWN,
            marker_timeout: LOGIN_MARKER_TIMEOUT,
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl Timings {
    /// Log a warning for every budget configured below its default.
    /// Returns `true` if any was shortened.
    pub fn warn_if_shortened(&self) -> bool {
        let defaults = Self::default();
        let checks = [
            ("factor_settle", self.factor_settle, defaults.factor_settle),
            (
                "cancel_control_timeout",
                self.cancel_control_timeout,
                defaults.cancel_control_timeout,
            ),
            ("anomaly_cooldown", self.anomaly_cooldown, defaults.anomaly_cooldown),
            ("marker_timeout", self.marker_timeout, defaults.marker_timeout),
        ];

        let mut shortened = false;
        for (name, configured, default) in checks {
            if configured < default {
                warn!(
                    timing = name,
                    configured_secs = configured.as_secs_f64(),
                    default_secs = default.as_secs_f64(),
                    "timing budget shortened below its default"
                );
                shortened = true;
            }
        }
        shortened
    }
}

// ── Selectors ────────────────────────────────────────────────────────

/// Where the login form and secondary-factor controls live in the DOM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSelectors {
    pub username: Locator,
    pub password: Locator,
    pub submit: Locator,
    pub factor_frame: Locator,
    pub cancel_control: Locator,
    pub alternate_factor: Locator,
    pub confirm_buttons: Locator,
    /// Label fragment identifying the manual-push confirm button.
    pub push_label: String,
}

impl Default for PortalSelectors {
    fn default() -> Self {
        Self {
            username: Locator::id("username"),
            password: Locator::id("password"),
            submit: Locator::name("submit"),
            factor_frame: Locator::id("duo_iframe"),
            cancel_control: Locator::class_name("btn-cancel"),
            alternate_factor: Locator::name("dampen_choice"),
            confirm_buttons: Locator::css("button.auth-button.positive"),
            push_label: "Push".into(),
        }
    }
}

// ── Portal ───────────────────────────────────────────────────────────

/// Configuration for one portal session.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// The portal CGI entry point; also the liveness page.
    pub base_url: Url,
    pub environment: Environment,
    pub timings: Timings,
    pub selectors: PortalSelectors,
}

impl PortalConfig {
    pub fn new(base_url: Url, environment: Environment) -> Self {
        Self {
            base_url,
            environment,
            timings: Timings::default(),
            selectors: PortalSelectors::default(),
        }
    }
}

// ── Browser driver ───────────────────────────────────────────────────

/// Where the WebDriver server lives and what browser to ask it for.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub endpoint: Url,
    pub browser: BrowserOptions,
    pub transport: TransportConfig,
}

impl DriverConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:4444";

    pub fn launcher(&self) -> Result<WebDriverLauncher, CoreError> {
        let client = WebDriverClient::new(self.endpoint.clone(), &self.transport)?;
        Ok(WebDriverLauncher::new(client, self.browser.clone()))
    }
}

// ── Building-name sources ────────────────────────────────────────────

/// The two facility-code tables, in load order. `primary` wins on
/// colliding codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingSources {
    pub primary: PathBuf,
    pub custom: PathBuf,
}

impl Default for BuildingSources {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("Buildings.csv"),
            custom: PathBuf::from("CustomBuildings.csv"),
        }
    }
}
