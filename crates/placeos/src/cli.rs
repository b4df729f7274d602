//! Clap derive structures for the `placeos` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use placeos_core::Kind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// placeos -- declarative management of PlaceOS engine entities
#[derive(Debug, Parser)]
#[command(
    name = "placeos",
    version,
    about = "Manage PlaceOS engine entities from the command line",
    long_about = "Reads, lists, deletes and reconciles repositories, drivers, modules,\n\
        zones, systems and settings on a PlaceOS engine.\n\n\
        `apply` converges one entity to a desired-fields file with the fewest\n\
        API calls: create when no id is given, otherwise read, diff and update.",
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
    /// Engine profile to use
    #[arg(long, short = 'p', env = "PLACEOS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Engine URL (overrides profile)
    #[arg(long, env = "PLACEOS_HOST", global = true)]
    pub host: Option<String>,

    /// Username for the password grant (overrides profile)
    #[arg(long, short = 'u', env = "PLACEOS_USERNAME", global = true)]
    pub username: Option<String>,

    /// OAuth application id (overrides profile)
    #[arg(long, env = "PLACEOS_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PLACEOS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "PLACEOS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PLACEOS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Identifiers only, one per line
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize and show the token's type and expiry
    Token,

    /// Show one entity
    Get {
        /// Entity kind (repository, driver, module, zone, system, setting)
        kind: Kind,
        id: String,
    },

    /// List all entities of a kind
    #[command(alias = "ls")]
    List { kind: Kind },

    /// Reconcile one entity against a desired-fields file
    Apply(ApplyArgs),

    /// Delete an entity
    #[command(alias = "rm")]
    Delete { kind: Kind, id: String },

    /// Show the commit history of a driver file in a repository
    Commits(CommitsArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    pub kind: Kind,

    /// Desired fields as JSON, YAML or TOML (by extension)
    pub file: PathBuf,

    /// Id of the existing entity. Without it the entity is created.
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Args)]
pub struct CommitsArgs {
    /// Repository id
    pub repo: String,

    /// Driver file path inside the repository
    pub driver_file: String,

    /// Print only the newest commit hash
    #[arg(long)]
    pub last: bool,
}
