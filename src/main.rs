//! Wayfinder - AI road-trip planner
//!
//! CLI entry point for one-shot planning and the interactive TUI.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use wayfinder::cli::{Cli, Command, OutputFormat};
use wayfinder::config::Config;
use wayfinder::genai;
use wayfinder::geo;
use wayfinder::markdown::{self, Segment};
use wayfinder::planner::{ImageState, PlanSession, Planner, TripQuery};
use wayfinder::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // The TUI owns the terminal, so logs always go to a file
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wayfinder")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = match level_str.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            other => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("wayfinder.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Plan {
            source,
            destination,
            interests,
            location,
            no_geo,
            format,
        }) => cmd_plan(&config, source, destination, interests, location, no_geo, format).await,
        Some(Command::Tui) | None => tui::run(&config).await,
    }
}

/// One-shot planning: print the itinerary, then drain image enrichment
async fn cmd_plan(
    config: &Config,
    source: String,
    destination: String,
    interests: String,
    location: Option<String>,
    no_geo: bool,
    format: OutputFormat,
) -> Result<()> {
    debug!(%source, %destination, %no_geo, "cmd_plan: called");

    let location = if no_geo {
        None
    } else if let Some(raw) = location {
        Some(geo::parse_latlng(&raw)?)
    } else {
        geo::lookup(&config.geo).await
    };

    let query = TripQuery::new(source, destination, interests).with_location(location);

    let client = genai::create_client(&config.genai)?;
    let session = PlanSession::spawn();
    let planner = Planner::new(client, session.clone());

    let plan = planner.plan(query).await?;

    match format {
        OutputFormat::Text => {
            println!();
            for segment in markdown::segments(&plan.narrative) {
                match segment {
                    Segment::Heading(heading) => println!("{}", heading.cyan().bold()),
                    Segment::Body(body) => print!("{}", body),
                }
            }
            println!();

            if plan.stops.is_empty() {
                println!("{}", "No grounded stops were suggested for this trip.".dimmed());
            } else {
                println!(
                    "{} {}",
                    "Suggested stops:".bold(),
                    format!("(generating {} images...)", plan.stops.len()).dimmed()
                );
                planner.enrich(&plan).await;
                planner.drain().await;

                let snapshot = session.snapshot().await?;
                if let Some(settled_plan) = snapshot.plan {
                    for stop in &settled_plan.stops {
                        let marker = match &stop.image {
                            ImageState::Ready { .. } => "✓".green(),
                            ImageState::Unavailable => "✗".red(),
                            _ => "○".dimmed(),
                        };
                        println!("  {} {}  {}", marker, stop.place.title.bold(), stop.place.uri.dimmed());
                        if let Some(data_uri) = stop.image.data_uri() {
                            println!("      {}", format!("image: {} byte data URI", data_uri.len()).dimmed());
                        }
                    }
                }
            }
        }
        OutputFormat::Json => {
            planner.enrich(&plan).await;
            planner.drain().await;
            let snapshot = session.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    session.shutdown().await?;
    Ok(())
}
