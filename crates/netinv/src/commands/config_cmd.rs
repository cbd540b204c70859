//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("********".into());
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(),

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config()?;
            redact(&mut cfg);
            let out = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(&cfg).map_err(|e| {
                    CliError::Internal(format!("failed to render config: {e}"))
                })?,
                OutputFormat::JsonCompact => serde_json::to_string(&cfg).map_err(|e| {
                    CliError::Internal(format!("failed to render config: {e}"))
                })?,
                OutputFormat::Yaml => output::render_yaml(&cfg),
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Internal(format!("failed to render config: {e}")))?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: netinv config init");
                return Ok(());
            }
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort_unstable();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config()?;
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let password = rpassword::prompt_password(format!("Password for '{profile_name}': "))?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            netinv_config::store_password(&profile_name, &password)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("netinv configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config()?;

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let portal: String = Input::new()
        .with_prompt("Portal URL")
        .default("https://mynetwork.example.edu/cgi-bin/netadmin.pl".into())
        .validate_with(|input: &String| -> Result<(), String> {
            url::Url::parse(input)
                .map(|_| ())
                .map_err(|e| format!("not a URL: {e}"))
        })
        .interact_text()
        .map_err(prompt_err)?;

    let environments = &["production (push challenge)", "other (no secondary factor)"];
    let environment = match Select::new()
        .with_prompt("Environment")
        .items(environments)
        .default(0)
        .interact()
        .map_err(prompt_err)?
    {
        0 => "production".to_string(),
        _ => Input::new()
            .with_prompt("Environment name")
            .default("development".into())
            .interact_text()
            .map_err(prompt_err)?,
    };

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)?;

    let webdriver: String = Input::new()
        .with_prompt("WebDriver server URL")
        .default(cfg.defaults.webdriver.clone())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile::new(portal);
    profile.environment = environment;
    profile.username = Some(username);
    if webdriver != cfg.defaults.webdriver {
        profile.webdriver = Some(webdriver);
    }

    let store_password = Confirm::new()
        .with_prompt("Store the portal password in the system keyring now?")
        .default(true)
        .interact()
        .map_err(prompt_err)?;
    if store_password {
        let password = rpassword::prompt_password("Password: ")?;
        if !password.is_empty() {
            netinv_config::store_password(&profile_name, &password)?;
            eprintln!("   ✓ Password stored in system keyring");
        }
    }

    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: netinv vlans");
    Ok(())
}
