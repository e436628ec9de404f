//! Command-line argument parsing for IncidentBuddy
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// IncidentBuddy - Reuse solved IT incidents, generate answers for new ones
#[derive(Parser, Debug)]
#[command(name = "incidentbuddy")]
#[command(version)]
#[command(about = "Deduplicate IT support incidents and resolve new ones with an LLM", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the incident database path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Verbosity level: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the incident database schema and a default config file
    Init,

    /// Resolve one incident and store it
    Submit {
        /// Incident number
        #[arg(long)]
        number: String,

        /// Short description
        #[arg(long)]
        description: String,

        /// Detailed description
        #[arg(long, default_value = "")]
        detail: String,

        #[arg(long, default_value = "")]
        customer: String,

        #[arg(long, default_value = "")]
        organization: String,

        #[arg(long, default_value = "")]
        department: String,

        #[arg(long, default_value = "")]
        reported_date: String,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve and store every incident in a JSON file
    Import {
        /// JSON array of incidents
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show stored incidents, newest first
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Print the priority the classifier assigns
    Priority {
        description: String,

        #[arg(default_value = "")]
        detail: String,
    },

    /// Display current configuration
    Config,
}

impl Args {
    /// Log level implied by -v flags, if any
    pub fn log_level_override(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
