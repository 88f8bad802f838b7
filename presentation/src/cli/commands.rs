//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for kowalski
#[derive(Parser, Debug)]
#[command(name = "kowalski")]
#[command(author, version, about = "Tool-orchestrating chat gateway")]
#[command(long_about = r#"
Kowalski is a chat gateway that hands conversations to a reasoning model,
which may call tools served by independent backends over JSON-RPC.

Each server runs as its own subcommand; `all` starts every server in one
process.

Configuration files are loaded from (in priority order):
1. KOWALSKI_* environment variables (e.g. KOWALSKI_GATEWAY__BIND)
2. --config <path>     Explicit config file
3. ./kowalski.toml     Project-level config
4. ~/.config/kowalski/config.toml   Global config

Secrets are read from GOOGLE_API_KEY, OPENWEATHER_API_KEY and MONGO_URL.

Example:
  kowalski all
  kowalski -vv gateway --config ./deploy.toml
  kowalski scripts
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Which server (or utility) to run
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Chat gateway: /register, /login, /logout, /chat
    Gateway,
    /// Script sandbox tool server
    Scripts,
    /// Web search and weather tool server
    Search,
    /// Document database tool server
    Data,
    /// Every tool server plus the gateway, in one process
    All,
    /// Print configuration sources and the resolved configuration
    Config,
}
