//! Command-line interface for wayfinder.
//!
//! This module provides the CLI structure and command definitions for the
//! `wayctl` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wayfinder::logging::Verbosity;

pub use commands::{ConfigCommand, NavigateCommand, PoisCommand, PolicyCommand, PrefsCommand};

/// wayctl - Indoor navigation from the terminal
///
/// Drives the wayfinder navigation pipeline against a simulated positioning
/// engine: search the venue's points of interest, manage routing
/// preferences, and walk guided trips turn by turn.
#[derive(Debug, Parser)]
#[command(name = "wayctl")]
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
    /// Guide to a point of interest
    Navigate(NavigateCommand),

    /// List and search points of interest
    Pois(PoisCommand),

    /// View or modify stored preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),

    /// Manage privacy policy acceptance
    #[command(subcommand)]
    Policy(PolicyCommand),

    /// View or validate configuration
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
