//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;
use url::Url;

use netinv_config::ConfigError;
use netinv_core::{AuthenticationError, CoreError, SessionState};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the WebDriver server at {url}")]
    #[diagnostic(
        code(netinv::connection_failed),
        help(
            "Start geckodriver, chromedriver or a Selenium server first.\n\
             URL: {url}\n\
             Override with --webdriver or the profile's `webdriver` key."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: netinv_api::Error,
    },

    #[error("Browser driver failed: {0}")]
    #[diagnostic(code(netinv::driver), help("Re-run with -vv to see the WebDriver exchange."))]
    Driver(#[source] netinv_api::Error),

    // ── Authentication ───────────────────────────────────────────────
    #[error("Login failed: {reason}")]
    #[diagnostic(
        code(netinv::auth_failed),
        help(
            "Verify your portal username and password.\n\
             Run: netinv config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, reason: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(netinv::no_credentials),
        help(
            "Configure credentials with: netinv config init\n\
             Or set NETINV_USERNAME and NETINV_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("Secondary-factor challenge did not show {control} within {seconds}s")]
    #[diagnostic(
        code(netinv::factor_timeout),
        help(
            "The push challenge frame or its controls never appeared.\n\
             If the portal is slow, raise `timings.cancel_control_timeout_secs`."
        )
    )]
    FactorTimeout { control: String, seconds: u64 },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Expected data missing at {url} (page title {title:?})")]
    #[diagnostic(
        code(netinv::missing_data),
        help(
            "The session was live but the page lacked the expected content.\n\
             Check the VLAN name with: netinv vlans"
        )
    )]
    MissingData { url: String, title: String },

    #[error("Portal session is {state}")]
    #[diagnostic(code(netinv::session))]
    SessionUnavailable { state: SessionState },

    #[error("{message}")]
    #[diagnostic(
        code(netinv::buildings),
        help("Point `buildings` and `custom_buildings` in your profile at the facility-code CSVs.")
    )]
    BuildingTable { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netinv::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netinv::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: netinv config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(netinv::no_config),
        help(
            "Create one with: netinv config init\n\
             Or pass --portal.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(netinv::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(code(netinv::keyring))]
    Keyring { message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(netinv::internal))]
    Internal(String),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Driver(e) if e.is_transient() => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::FactorTimeout { .. } => exit_code::TIMEOUT,
            Self::MissingData { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Like `From<CoreError>`, but a transport failure talking to the
    /// WebDriver server names the endpoint that was tried.
    pub fn from_core_at(err: CoreError, endpoint: &Url, profile: &str) -> Self {
        match err {
            CoreError::Driver(source)
            | CoreError::Authentication(AuthenticationError::Driver(source))
                if source.is_transient() =>
            {
                Self::ConnectionFailed {
                    url: endpoint.to_string(),
                    source,
                }
            }
            CoreError::Authentication(auth) => from_auth(auth, profile),
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn from_auth(err: AuthenticationError, profile: &str) -> CliError {
    match err {
        AuthenticationError::CredentialRejected { title } => CliError::AuthFailed {
            profile: profile.into(),
            reason: format!("portal showed {title:?} instead of the VLAN summary"),
        },
        AuthenticationError::SecondaryFactorTimeout { control, waited } => {
            CliError::FactorTimeout {
                control,
                seconds: waited.as_secs(),
            }
        }
        AuthenticationError::ReloginFailed { source } => from_auth(*source, profile),
        AuthenticationError::Driver(source) => CliError::Driver(source),
        AuthenticationError::InvalidState(e) => CliError::Internal(e.to_string()),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Authentication(auth) => from_auth(auth, "current"),
            CoreError::MissingData { title, url } => CliError::MissingData { url, title },
            CoreError::SessionUnavailable { state } => CliError::SessionUnavailable { state },
            CoreError::InvalidState(e) => CliError::Internal(e.to_string()),
            CoreError::Driver(source) => CliError::Driver(source),
            e @ CoreError::BuildingTable { .. } => CliError::BuildingTable {
                message: e.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
