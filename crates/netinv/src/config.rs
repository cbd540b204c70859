//! CLI configuration: thin layer over `netinv_config` that applies
//! `GlobalOpts` flag overrides (--portal, --username, --webdriver, ...).

use std::io::IsTerminal;

use secrecy::SecretString;
use tracing::debug;

use netinv_api::Credential;
use netinv_config::{ConfigError, Defaults};
use netinv_core::{BuildingSources, DriverConfig, PortalConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use netinv_config::{Config, Profile, config_path, load_config, save_config};

/// Everything needed to open an inventory session.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub portal: PortalConfig,
    pub driver: DriverConfig,
    pub credential: Credential,
    pub buildings: BuildingSources,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Pick the active profile and layer flag overrides on it. Without a
/// matching profile, `--portal` alone is enough to build one.
pub fn effective_profile(global: &GlobalOpts, config: &Config) -> Result<Profile, CliError> {
    let name = active_profile_name(global, config);

    let mut profile = match (config.profiles.get(&name), global.portal.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(portal)) => Profile::new(portal),
        (None, None) if config.profiles.is_empty() => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        (None, None) => {
            let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: available.join(", "),
            });
        }
    };

    if let Some(ref portal) = global.portal {
        profile.portal.clone_from(portal);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref environment) = global.environment {
        profile.environment.clone_from(environment);
    }
    if let Some(ref webdriver) = global.webdriver {
        profile.webdriver = Some(webdriver.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    Ok(profile)
}

/// Build the runtime configuration for a portal session.
///
/// Falls back to an interactive password prompt when nothing else supplies
/// one and stdin is a terminal.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let config = load_config()?;
    let profile_name = active_profile_name(global, &config);
    let profile = effective_profile(global, &config)?;

    let mut defaults: Defaults = config.defaults;
    if let Some(timeout) = global.timeout {
        defaults.timeout = timeout;
    }

    let username = netinv_config::resolve_username(&profile, &profile_name)?;
    let password = match netinv_config::resolve_password(&profile, &profile_name) {
        Ok(password) => password,
        Err(ConfigError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
            prompt_password(&username)?
        }
        Err(e) => return Err(e.into()),
    };

    let portal = netinv_config::profile_to_portal_config(&profile)?;
    let driver = netinv_config::profile_to_driver_config(&profile, &defaults)?;
    debug!(
        profile = %profile_name,
        portal = %portal.base_url,
        environment = %portal.environment,
        webdriver = %driver.endpoint,
        "resolved session configuration"
    );

    Ok(Resolved {
        buildings: netinv_config::building_sources(&profile),
        profile_name,
        portal,
        driver,
        credential: Credential::new(username, password),
    })
}

fn prompt_password(username: &str) -> Result<SecretString, CliError> {
    let password = rpassword::prompt_password(format!("Portal password for {username}: "))?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}
