//! Clap derive structures for the `netinv` CLI.
//!
//! Defines the command tree, global flags, and shared types. Only depends
//! on clap and clap_complete so `build.rs` can include it for man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netinv -- pull VLAN, MAC and NAM inventory out of the netadmin portal
#[derive(Debug, Parser)]
#[command(
    name = "netinv",
    version,
    about = "Extract network inventory from the netadmin web portal",
    long_about = "Drives a browser through the netadmin portal login (including the\n\
        secondary-factor push challenge in production) and turns the portal's\n\
        VLAN summary, active-MAC and NAM pages into tables or structured data.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Portal profile to use
    #[arg(long, short = 'p', env = "NETINV_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Portal entry point URL (overrides profile)
    #[arg(long, env = "NETINV_PORTAL", global = true)]
    pub portal: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, short = 'u', env = "NETINV_USERNAME", global = true)]
    pub username: Option<String>,

    /// Deployment environment; only "production" runs the push challenge
    #[arg(long, short = 'e', env = "NETINV_ENVIRONMENT", global = true)]
    pub environment: Option<String>,

    /// WebDriver server URL (overrides profile)
    #[arg(long, env = "NETINV_WEBDRIVER", global = true)]
    pub webdriver: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETINV_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Let the browser accept the portal's self-signed certificate
    #[arg(long, short = 'k', env = "NETINV_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-command WebDriver timeout in seconds (overrides profile defaults)
    #[arg(long, env = "NETINV_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List VLANs with their tag and subnet
    #[command(alias = "vl")]
    Vlans,

    /// List MAC addresses seen on a VLAN over the last month
    #[command(alias = "mac")]
    Macs(VlanArgs),

    /// List network access modules (wall ports) spanning a VLAN
    #[command(alias = "nam")]
    Nams(VlanArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct VlanArgs {
    /// VLAN name exactly as the portal lists it (e.g. "ENG-CIVL&ENV-1")
    pub vlan: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the configuration file location
    Path,

    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (passwords redacted)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a portal password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
