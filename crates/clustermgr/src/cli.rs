//! Clap derive structures for the `cmctl` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cmctl -- command-line client for the Cluster Manager REST API
#[derive(Debug, Parser)]
#[command(
    name = "cmctl",
    version,
    about = "Inspect and drive a Cluster Manager server from the command line",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "CMCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server host (overrides profile)
    #[arg(long, short = 'H', env = "CMCTL_HOST", global = true)]
    pub host: Option<String>,

    /// Server port [default: 7180, or 7183 with --tls]
    #[arg(long, env = "CMCTL_PORT", global = true)]
    pub port: Option<u16>,

    /// Username (overrides profile)
    #[arg(long, short = 'u', env = "CMCTL_USER", global = true)]
    pub user: Option<String>,

    /// Connect over HTTPS
    #[arg(long, env = "CMCTL_TLS", global = true)]
    pub tls: bool,

    /// API version to speak (overrides profile)
    #[arg(long, env = "CMCTL_API_VERSION", global = true)]
    pub api_version: Option<u32>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CMCTL_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CMCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Plain text, one value per line (scripting)
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
    /// Round-trip a message through the server
    Echo {
        /// Message to send
        #[arg(default_value = "Hello")]
        message: String,
    },

    /// Show the server's build information
    Version,

    /// Manage clusters
    #[command(alias = "cl")]
    Clusters(ClustersArgs),

    /// Inspect hosts
    Hosts(HostsArgs),

    /// Inspect services of a cluster
    #[command(alias = "svc")]
    Services(ServicesArgs),

    /// Inspect and control server commands
    #[command(alias = "cmd")]
    Command(CommandArgs),

    /// Cluster Manager settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Clusters ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClustersArgs {
    #[command(subcommand)]
    pub command: ClustersCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClustersCommand {
    /// List all clusters
    #[command(alias = "ls")]
    List,

    /// Show one cluster
    Show { name: String },

    /// Start every service of a cluster
    Start {
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Stop every service of a cluster
    Stop {
        name: String,
        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Shared arguments for commands that start a server command.
#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Block until the server command finishes
    #[arg(long, short = 'w')]
    pub wait: bool,

    /// Give up waiting after this many seconds
    #[arg(long, requires = "wait")]
    pub wait_timeout: Option<u64>,
}

// ── Hosts ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HostsArgs {
    #[command(subcommand)]
    pub command: HostsCommand,
}

#[derive(Debug, Subcommand)]
pub enum HostsCommand {
    /// List all hosts
    #[command(alias = "ls")]
    List,

    /// Show one host by id
    Show { host_id: String },
}

// ── Services ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    /// List the services of a cluster
    #[command(alias = "ls")]
    List { cluster: String },
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CommandArgs {
    #[command(subcommand)]
    pub command: CommandCommand,
}

#[derive(Debug, Subcommand)]
pub enum CommandCommand {
    /// Show a command by id
    Show { id: i64 },

    /// Wait for a command to finish
    Wait {
        id: i64,
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Abort a running command
    Abort { id: i64 },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show Cluster Manager configuration
    Show {
        /// Include defaults and descriptions
        #[arg(long)]
        full: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["cmctl", "clusters", "start", "c1", "--wait", "-o", "json"])
                .unwrap();
        assert_eq!(cli.global.output, OutputFormat::Json);
        match cli.command {
            Command::Clusters(ClustersArgs {
                command: ClustersCommand::Start { name, wait },
            }) => {
                assert_eq!(name, "c1");
                assert!(wait.wait);
                assert_eq!(wait.wait_timeout, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn wait_timeout_requires_wait() {
        let res = Cli::try_parse_from(["cmctl", "clusters", "stop", "c1", "--wait-timeout", "5"]);
        assert!(res.is_err());
    }
}
