//! CLI module for Vigil
//!
//! Command-line interface definitions and handlers for the endpoint monitor.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `check` - Run one probe cycle and print the results
//! - `endpoints` - List configured endpoints
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! vigil serve
//!
//! # One-off check as JSON
//! vigil check --json
//!
//! # Generate shell completions
//! vigil completions bash > ~/.bash_completion.d/vigil
//! ```

pub mod check;
pub mod completions;
pub mod config;
pub mod endpoints;
pub mod output;
pub mod serve;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config_init;
pub use endpoints::handle_endpoints;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Vigil - Synthetic endpoint health monitor
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about = "Synthetic endpoint health monitor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Probe every endpoint once and print the results
    Check(CheckArgs),
    /// List configured endpoints
    Endpoints(EndpointsArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "vigil.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "VIGIL_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "VIGIL_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "VIGIL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Also run probe cycles on a timer
    #[arg(long)]
    pub background: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "vigil.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct EndpointsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "vigil.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "vigil.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
