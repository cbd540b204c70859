mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use netinv_core::{BuildingNameMap, Inventory};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);
    init_diagnostics(output::should_color(&cli.global.color));

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init_diagnostics(color: bool) {
    let _ = miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().color(color).build())
    }));
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a portal session
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "netinv", &mut std::io::stdout());
            Ok(())
        }

        // Everything else drives the portal through a browser
        cmd => {
            let resolved = config::resolve(&cli.global)?;

            // The VLAN summary never names a building.
            let buildings = match cmd {
                Command::Vlans => BuildingNameMap::default(),
                _ => BuildingNameMap::load_sources(&resolved.buildings)?,
            };

            let endpoint = resolved.driver.endpoint.clone();
            let launcher = resolved.driver.launcher()?;
            let inventory =
                Inventory::connect(launcher, resolved.portal, resolved.credential, buildings)
                    .await
                    .map_err(|e| CliError::from_core_at(e, &endpoint, &resolved.profile_name))?;

            debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &inventory, &cli.global).await;

            if let Err(e) = inventory.close().await {
                warn!(error = %e, "failed to release browser session");
            }
            result
        }
    }
}
