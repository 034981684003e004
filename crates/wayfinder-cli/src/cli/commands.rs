//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Navigate command arguments.
#[derive(Debug, Args)]
pub struct NavigateCommand {
    /// Destination point-of-interest identifier (see `wayctl pois`)
    pub destination: String,

    /// Route around stairs (persists as a stored preference)
    #[arg(long, conflicts_with = "avoid_elevators")]
    pub avoid_stairs: bool,

    /// Route around elevators (persists as a stored preference)
    #[arg(long)]
    pub avoid_elevators: bool,

    /// Print the full step list before guidance starts
    #[arg(short, long)]
    pub steps: bool,

    /// Compute and show the route without starting guidance
    #[arg(short, long)]
    pub preview: bool,

    /// Cancel the trip after this many seconds
    #[arg(long, value_name = "SECS")]
    pub cancel_after: Option<u64>,

    /// Milliseconds between simulated position updates
    #[arg(long, default_value_t = 250, value_name = "MS")]
    pub tick_ms: u64,

    /// Meters walked per position update
    #[arg(long, default_value_t = 1.0, value_name = "METERS")]
    pub stride_m: f64,
}

/// Pois command arguments.
#[derive(Debug, Args)]
pub struct PoisCommand {
    /// Match titles and descriptions against this text
    pub query: Option<String>,

    /// Filter by amenity category identifier
    #[arg(short = 'C', long, value_name = "ID")]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Preference commands.
#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Show stored preferences
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Set one preference
    Set {
        /// Preference key, e.g. AVOID_STAIRS or DISTANCE_UNIT
        key: String,

        /// New value, e.g. "true" or "steps"
        value: String,
    },

    /// Reset all preferences to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Privacy policy commands.
#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Show acceptance state
    Show,

    /// Record acceptance of the privacy policy
    Accept,

    /// Withdraw acceptance
    Revoke,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_command_debug() {
        let cmd = NavigateCommand {
            destination: "poi-cafe".to_string(),
            avoid_stairs: true,
            avoid_elevators: false,
            steps: false,
            preview: false,
            cancel_after: None,
            tick_ms: 250,
            stride_m: 1.0,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("poi-cafe"));
        assert!(debug_str.contains("avoid_stairs"));
    }

    #[test]
    fn test_pois_command_debug() {
        let cmd = PoisCommand {
            query: Some("cafe".to_string()),
            category: None,
            json: false,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("query"));
        assert!(debug_str.contains("cafe"));
    }

    #[test]
    fn test_prefs_command_debug() {
        let cmd = PrefsCommand::Set {
            key: "AVOID_STAIRS".to_string(),
            value: "true".to_string(),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Set"));
        assert!(debug_str.contains("AVOID_STAIRS"));
    }

    #[test]
    fn test_policy_command_debug() {
        let cmd = PolicyCommand::Accept;
        let debug_str = format!("{cmd:?}");
        assert_eq!(debug_str, "Accept");
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
