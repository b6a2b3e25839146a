//! TUI application - event handling and state management
//!
//! The App struct owns the AppState and handles all keyboard events.
//! It does not do any rendering - that's delegated to the views module.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::genai::LatLng;
use crate::planner::TripQuery;

use super::state::AppState;

/// Validation message shown when a form field is empty
pub const VALIDATION_MESSAGE: &str = "Please fill in all fields.";

/// What the runner should do after a key event
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Nothing beyond the state change already applied
    None,
    /// Exit the TUI
    Quit,
    /// Run a planning attempt for this query
    Submit(TripQuery),
}

/// TUI application
#[derive(Debug)]
pub struct App {
    /// Application state
    state: AppState,
}

impl App {
    /// Create a new application instance
    pub fn new(location: Option<LatLng>) -> Self {
        debug!("App::new: called");
        Self {
            state: AppState::new(location),
        }
    }

    /// Get reference to state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get mutable reference to state
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        debug!(?key, "App::handle_key: called");

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                debug!("App::handle_key: Ctrl+C force quit");
                Action::Quit
            }

            (KeyCode::Esc, _) => {
                // Esc clears a validation message first; a second Esc quits
                if self.state.error.is_some() {
                    debug!("App::handle_key: Esc clears error");
                    self.state.clear_error();
                    Action::None
                } else {
                    debug!("App::handle_key: Esc quit");
                    Action::Quit
                }
            }

            (KeyCode::Tab, _) => {
                self.state.clear_error();
                self.state.focus = self.state.focus.next();
                Action::None
            }

            (KeyCode::BackTab, _) => {
                self.state.clear_error();
                self.state.focus = self.state.focus.prev();
                Action::None
            }

            (KeyCode::Enter, _) => self.submit(),

            (KeyCode::Backspace, _) => {
                self.state.clear_error();
                self.state.focused_field_mut().pop();
                Action::None
            }

            (KeyCode::Up, _) => {
                self.state.scroll = self.state.scroll.saturating_sub(1);
                Action::None
            }

            (KeyCode::Down, _) => {
                self.state.scroll = self.state.scroll.saturating_add(1);
                Action::None
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.state.clear_error();
                self.state.focused_field_mut().push(c);
                Action::None
            }

            _ => Action::None,
        }
    }

    /// Validate the form and produce a submission
    fn submit(&mut self) -> Action {
        debug!("App::submit: called");
        if self.state.is_planning() {
            debug!("App::submit: itinerary call already in flight, ignoring");
            return Action::None;
        }

        self.state.clear_error();
        let query = self.state.query();
        if query.validate().is_err() {
            debug!("App::submit: validation failed");
            self.state.error = Some(VALIDATION_MESSAGE.to_string());
            return Action::None;
        }

        self.state.pick_planning_word();
        self.state.scroll = 0;
        Action::Submit(query)
    }
}
