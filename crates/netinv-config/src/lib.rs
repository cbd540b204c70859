//! Shared configuration for netinv.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to the runtime types in `netinv_core`. The CLI layers its
//! flag overrides on top of these.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use netinv_api::{Browser, BrowserOptions, Credential, Environment, TlsMode, TransportConfig};
use netinv_core::{BuildingSources, DriverConfig, PortalConfig, Timings};

/// Keyring service name for stored portal passwords.
pub const KEYRING_SERVICE: &str = "netinv";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named portal profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit choice, else the configured
    /// default, else `"default"`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// WebDriver server URL.
    #[serde(default = "default_webdriver")]
    pub webdriver: String,

    /// Browser requested from the WebDriver server.
    #[serde(default = "default_browser")]
    pub browser: String,

    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default)]
    pub insecure: bool,

    /// Per-command WebDriver timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            webdriver: default_webdriver(),
            browser: default_browser(),
            headless: default_headless(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_webdriver() -> String {
    DriverConfig::DEFAULT_ENDPOINT.into()
}
fn default_browser() -> String {
    Browser::default().to_string()
}
fn default_headless() -> bool {
    true
}
fn default_timeout() -> u64 {
    90
}

/// A named portal profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Portal CGI entry point
    /// (e.g., "https://mynetwork.example.edu/cgi-bin/netadmin.pl").
    pub portal: String,

    /// Login username.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or `NETINV_PASSWORD`).
    pub password: Option<String>,

    /// `"production"` runs the secondary-factor challenge; anything else
    /// skips it.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Override the WebDriver server URL.
    pub webdriver: Option<String>,

    /// Override the browser.
    pub browser: Option<String>,

    /// Override headless mode.
    pub headless: Option<bool>,

    /// Let the browser accept the portal's self-signed certificate.
    pub insecure: Option<bool>,

    /// Path to a custom CA certificate for the WebDriver endpoint.
    pub ca_cert: Option<PathBuf>,

    /// Primary facility-code table.
    pub buildings: Option<PathBuf>,

    /// Supplementary facility-code table, consulted after `buildings`.
    pub custom_buildings: Option<PathBuf>,

    /// Login-flow timing overrides.
    #[serde(default)]
    pub timings: TimingOverrides,
}

fn default_environment() -> String {
    Environment::PRODUCTION_FLAG.into()
}

impl Profile {
    pub fn new(portal: impl Into<String>) -> Self {
        Self {
            portal: portal.into(),
            username: None,
            password: None,
            environment: default_environment(),
            webdriver: None,
            browser: None,
            headless: None,
            insecure: None,
            ca_cert: None,
            buildings: None,
            custom_buildings: None,
            timings: TimingOverrides::default(),
        }
    }
}

/// Optional replacements for the login-flow timing budgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimingOverrides {
    pub factor_settle_secs: Option<u64>,
    pub cancel_control_timeout_secs: Option<u64>,
    pub anomaly_cooldown_secs: Option<u64>,
    pub marker_timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

impl TimingOverrides {
    /// Apply overrides on top of the defaults. Shortened budgets are
    /// logged at WARN.
    pub fn apply(&self) -> Result<Timings, ConfigError> {
        let defaults = Timings::default();
        let secs = |value: Option<u64>, default: Duration| value.map_or(default, Duration::from_secs);

        if self.poll_interval_ms == Some(0) {
            return Err(ConfigError::Validation {
                field: "timings.poll_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let timings = Timings {
            factor_settle: secs(self.factor_settle_secs, defaults.factor_settle),
            cancel_control_timeout: secs(
                self.cancel_control_timeout_secs,
                defaults.cancel_control_timeout,
            ),
            anomaly_cooldown: secs(self.anomaly_cooldown_secs, defaults.anomaly_cooldown),
            marker_timeout: secs(self.marker_timeout_secs, defaults.marker_timeout),
            poll_interval: self
                .poll_interval_ms
                .map_or(defaults.poll_interval, Duration::from_millis),
        };
        timings.warn_if_shortened();
        Ok(timings)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("edu", "netinv", "netinv").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netinv");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + `NETINV_`-prefixed environment variables
/// (`NETINV_DEFAULTS__WEBDRIVER=...`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETINV_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Username from the profile, else `NETINV_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("NETINV_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Password from `NETINV_PASSWORD`, the system keyring, or the profile,
/// in that order.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var("NETINV_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

pub fn resolve_credential(profile: &Profile, profile_name: &str) -> Result<Credential, ConfigError> {
    let username = resolve_username(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;
    Ok(Credential::new(username, password))
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

// ── Translation to runtime types ────────────────────────────────────

fn parse_url(field: &str, value: &str) -> Result<url::Url, ConfigError> {
    value.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {value}"),
    })
}

/// Build a `PortalConfig` from a profile.
pub fn profile_to_portal_config(profile: &Profile) -> Result<PortalConfig, ConfigError> {
    let base_url = parse_url("portal", &profile.portal)?;
    let mut config = PortalConfig::new(base_url, Environment::from_flag(&profile.environment));
    config.timings = profile.timings.apply()?;
    Ok(config)
}

/// Build a `DriverConfig` from a profile, falling back to global defaults.
pub fn profile_to_driver_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DriverConfig, ConfigError> {
    let endpoint_str = profile.webdriver.as_deref().unwrap_or(&defaults.webdriver);
    let endpoint = parse_url("webdriver", endpoint_str)?;

    let browser_name = profile.browser.as_deref().unwrap_or(&defaults.browser);
    let browser = Browser::from_name(browser_name).ok_or_else(|| ConfigError::Validation {
        field: "browser".into(),
        reason: format!("expected 'firefox' or 'chrome', got '{browser_name}'"),
    })?;

    let tls = match profile.ca_cert {
        Some(ref ca_path) => TlsMode::CustomCa(ca_path.clone()),
        None => TlsMode::System,
    };

    Ok(DriverConfig {
        endpoint,
        browser: BrowserOptions {
            browser,
            headless: profile.headless.unwrap_or(defaults.headless),
            accept_insecure_certs: profile.insecure.unwrap_or(defaults.insecure),
        },
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(defaults.timeout),
        },
    })
}

/// Facility-code tables for a profile (defaults: `Buildings.csv` and
/// `CustomBuildings.csv` in the working directory).
pub fn building_sources(profile: &Profile) -> BuildingSources {
    let defaults = BuildingSources::default();
    BuildingSources {
        primary: profile.buildings.clone().unwrap_or(defaults.primary),
        custom: profile.custom_buildings.clone().unwrap_or(defaults.custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "campus"

[defaults]
webdriver = "http://grid.local:4444/wd/hub"

[profiles.campus]
portal = "https://mynetwork.example.edu/cgi-bin/netadmin.pl"
username = "netops"
password = "plaintext"
environment = "production"
browser = "chrome"
buildings = "/srv/netinv/Buildings.csv"

[profiles.campus.timings]
anomaly_cooldown_secs = 90

[profiles.lab]
portal = "https://lab.example.edu/cgi-bin/netadmin.pl"
environment = "lab"
insecure = true
"#;

    fn sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn profiles_load_with_defaults_filled() {
        let config = sample();
        assert_eq!(config.profile_name(None), "campus");
        assert_eq!(config.profile_name(Some("lab")), "lab");

        let lab = config.profile("lab").unwrap();
        assert_eq!(lab.environment, "lab");
        assert_eq!(lab.timings, TimingOverrides::default());
        assert_eq!(config.defaults.browser, "firefox");
        assert!(config.defaults.headless);

        assert!(matches!(
            config.profile("missing"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn portal_config_honours_environment_and_timings() {
        let config = sample();

        let campus = profile_to_portal_config(config.profile("campus").unwrap()).unwrap();
        assert_eq!(campus.environment, Environment::Production);
        assert_eq!(campus.timings.anomaly_cooldown, Duration::from_secs(90));
        assert_eq!(campus.timings.cancel_control_timeout, Duration::from_secs(30));

        let lab = profile_to_portal_config(config.profile("lab").unwrap()).unwrap();
        assert_eq!(lab.environment, Environment::Bypass);
    }

    #[test]
    fn driver_config_merges_profile_over_defaults() {
        let config = sample();

        let campus =
            profile_to_driver_config(config.profile("campus").unwrap(), &config.defaults).unwrap();
        assert_eq!(campus.endpoint.as_str(), "http://grid.local:4444/wd/hub");
        assert_eq!(campus.browser.browser, Browser::Chrome);
        assert!(!campus.browser.accept_insecure_certs);

        let lab = profile_to_driver_config(config.profile("lab").unwrap(), &config.defaults).unwrap();
        assert!(lab.browser.accept_insecure_certs);
    }

    #[test]
    fn invalid_values_are_validation_errors() {
        let mut profile = Profile::new("not a url");
        assert!(matches!(
            profile_to_portal_config(&profile),
            Err(ConfigError::Validation { ref field, .. }) if field == "portal"
        ));

        profile.portal = "https://portal.example.edu/".into();
        profile.browser = Some("lynx".into());
        assert!(matches!(
            profile_to_driver_config(&profile, &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "browser"
        ));

        profile.timings.poll_interval_ms = Some(0);
        assert!(profile_to_portal_config(&profile).is_err());
    }

    #[test]
    fn building_paths_fall_back_to_working_directory() {
        let config = sample();
        let campus = building_sources(config.profile("campus").unwrap());
        assert_eq!(campus.primary, PathBuf::from("/srv/netinv/Buildings.csv"));
        assert_eq!(campus.custom, PathBuf::from("CustomBuildings.csv"));
    }

    #[test]
    fn saved_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config
            .profiles
            .insert("default".into(), Profile::new("https://portal.example.edu/"));

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profile("default").unwrap().portal, "https://portal.example.edu/");
    }
}
