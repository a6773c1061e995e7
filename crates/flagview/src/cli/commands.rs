//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind to (overrides `server.address`)
    #[arg(short, long)]
    pub address: Option<IpAddr>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the flag documents (overrides `data.dir`)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show flags whose name or project contains this text
    pub query: Option<String>,

    /// Directory holding the flag documents (overrides `data.dir`)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Exact flag name
    pub name: String,

    /// Directory holding the flag documents (overrides `data.dir`)
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
