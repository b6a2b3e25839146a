//! Terminal user interface for Wayfinder
//!
//! A form with the three trip fields, a live status line, and a results
//! pane that updates as the itinerary resolves and each stop's image
//! settles independently.

mod app;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::{Action, App, VALIDATION_MESSAGE};
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::config::Config;
use crate::genai;
use crate::geo;
use crate::planner::{PlanSession, Planner};

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the interactive planner
pub async fn run(config: &Config) -> Result<()> {
    let client = genai::create_client(&config.genai)?;
    let session = PlanSession::spawn();
    let planner = Arc::new(Planner::new(client, session.clone()));

    // One location read at startup, warning-only on failure
    let location = geo::lookup(&config.geo).await;

    let terminal = init()?;

    // Ensure the terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    let mut runner = TuiRunner::new(terminal, planner, session, location, tick_rate);
    runner.run().await
}
