//! Command-line interface for flagview.
//!
//! This module provides the CLI structure for the `flagview` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ListCommand, OutputFormat, ServeCommand, ShowCommand};

use crate::logging::Verbosity;

/// flagview - Browse the feature flags of a codebase
///
/// Reads the flag documents generated by the flag extractor, merges them by
/// flag name, and serves them as browsable pages or prints them.
#[derive(Debug, Parser)]
#[command(name = "flagview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the list and detail pages over HTTP
    Serve(ServeCommand),

    /// List feature flags, optionally filtered
    List(ListCommand),

    /// Show one feature flag grouped by project
    Show(ShowCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
