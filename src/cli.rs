//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Wayfinder - AI road-trip planner
#[derive(Parser)]
#[command(name = "wf", about = "AI road-trip planner for the terminal", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (interactive planner when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip once and print the itinerary
    Plan {
        /// Starting point of the trip
        #[arg(long = "from", value_name = "PLACE")]
        source: String,

        /// Trip destination
        #[arg(long = "to", value_name = "PLACE")]
        destination: String,

        /// What you're interested in along the way
        #[arg(short, long)]
        interests: String,

        /// Caller location hint as LAT,LNG (skips the geolocation lookup)
        #[arg(long, value_name = "LAT,LNG")]
        location: Option<String>,

        /// Skip the geolocation lookup entirely
        #[arg(long)]
        no_geo: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Launch the interactive planner
    Tui,
}

/// Output format for the one-shot plan command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}
