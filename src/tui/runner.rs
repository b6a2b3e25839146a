//! TUI Runner - main loop that owns the terminal
//!
//! The TuiRunner draws the UI, dispatches key events to App, runs planning
//! submissions on background tasks, and refreshes its snapshot whenever the
//! plan session broadcasts a change.

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::genai::LatLng;
use crate::planner::{PlanSession, Planner, TripQuery};

use super::Tui;
use super::app::{Action, App};
use super::events::{Event, EventHandler};
use super::views;

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    /// Application state and key handling
    app: App,
    /// Terminal handle
    terminal: Tui,
    /// Planning orchestrator, shared with background submission tasks
    planner: Arc<Planner>,
    /// Session handle for snapshots
    session: PlanSession,
    /// Terminal event pump
    event_handler: EventHandler,
    /// Session change notifications
    session_rx: broadcast::Receiver<crate::planner::SessionEvent>,
}

impl TuiRunner {
    /// Create a runner over an already-initialized terminal
    pub fn new(
        terminal: Tui,
        planner: Arc<Planner>,
        session: PlanSession,
        location: Option<LatLng>,
        tick_rate: Duration,
    ) -> Self {
        debug!(?tick_rate, "TuiRunner::new: called");
        let session_rx = session.subscribe();
        Self {
            app: App::new(location),
            terminal,
            planner,
            session,
            event_handler: EventHandler::new(tick_rate),
            session_rx,
        }
    }

    /// Run the main loop until the user quits
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        self.refresh_snapshot().await;

        loop {
            self.terminal.draw(|frame| views::render(self.app.state_mut(), frame))?;

            tokio::select! {
                event = self.event_handler.next() => {
                    match event? {
                        Event::Tick => {
                            self.app.state_mut().tick();
                        }
                        Event::Key(key) => match self.app.handle_key(key) {
                            Action::Quit => {
                                debug!("TuiRunner::run: quit requested");
                                break;
                            }
                            Action::Submit(query) => self.submit(query),
                            Action::None => {}
                        },
                        Event::Resize(_, _) => {
                            // Next draw picks up the new size
                        }
                    }
                }
                event = self.session_rx.recv() => {
                    match event {
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            self.refresh_snapshot().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            warn!("TuiRunner::run: session event channel closed");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one planning attempt on a background task
    ///
    /// Planning failures are already recorded in the session (phase Failed),
    /// so the task has nothing to report back here.
    fn submit(&mut self, query: TripQuery) {
        debug!(source = %query.source, destination = %query.destination, "TuiRunner::submit: called");
        let planner = Arc::clone(&self.planner);
        tokio::spawn(async move {
            match planner.plan(query).await {
                Ok(plan) => {
                    planner.enrich(&plan).await;
                }
                Err(error) => {
                    debug!(error = %error, "submit task: planning failed");
                }
            }
        });
    }

    /// Pull the latest session state into the app
    async fn refresh_snapshot(&mut self) {
        if let Ok(snapshot) = self.session.snapshot().await {
            self.app.state_mut().snapshot = snapshot;
        }
    }
}
