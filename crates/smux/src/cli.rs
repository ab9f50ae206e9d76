//! Clap derive structures for the `smux` CLI.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// smux -- query and control a streammux server
#[derive(Debug, Parser)]
#[command(
    name = "smux",
    version,
    about = "Query and control a streammux server from the command line",
    long_about = "One-shot client for the streammux web API.\n\n\
        Reads the version banner, prints the latest status snapshot of all\n\
        streams and muxes, and enables or disables their endpoints.\n\
        For the live dashboard, run smux-tui.",
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
    /// Server base URL (overrides config)
    #[arg(long, short = 'u', env = "SMUX_URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long, env = "SMUX_REQUEST_TIMEOUT_MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
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
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one name per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Show the server version banner
    Version,

    /// Show the latest status snapshot
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Enable or disable an endpoint of a stream or mux
    Ctrl(CtrlArgs),

    /// Show or initialize the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Which part of the snapshot to show
    #[arg(value_enum, default_value = "all")]
    pub section: StatusSection,

    /// Include per-protocol counters (table output)
    #[arg(long, short = 's')]
    pub stats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusSection {
    /// Streams, muxes and the server process
    All,
    /// Streams only
    Streams,
    /// Muxes only
    Muxes,
    /// Server process resources only
    Proc,
}

// ── Ctrl ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("endpoint").required(true).multiple(true).args(["a", "b"])))]
pub struct CtrlArgs {
    /// Stream or mux name
    pub name: String,

    /// New state of endpoint A (stream read / mux forward)
    #[arg(long, short = 'a', value_enum)]
    pub a: Option<Switch>,

    /// New state of endpoint B (stream write / mux reverse)
    #[arg(long, short = 'b', value_enum)]
    pub b: Option<Switch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn as_bool(self) -> bool {
        self == Self::On
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write the effective configuration to the config file
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
