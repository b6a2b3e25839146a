//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic here.

use rand::seq::IndexedRandom;
use tracing::debug;

use crate::genai::LatLng;
use crate::planner::{PlanPhase, SessionSnapshot, TripQuery};

/// Fun words for the planning status indicator
pub const PLANNING_WORDS: &[&str] = &[
    "Charting",
    "Plotting",
    "Scouting",
    "Surveying",
    "Navigating",
    "Wandering",
    "Detouring",
    "Roaming",
];

/// Braille spinner frames, advanced on every tick
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Which form field has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Source,
    Destination,
    Interests,
}

impl Focus {
    /// Get the next field in the Tab cycle
    pub fn next(self) -> Self {
        debug!(?self, "Focus::next: called");
        match self {
            Self::Source => Self::Destination,
            Self::Destination => Self::Interests,
            Self::Interests => Self::Source,
        }
    }

    /// Get the previous field in the Tab cycle
    pub fn prev(self) -> Self {
        debug!(?self, "Focus::prev: called");
        match self {
            Self::Source => Self::Interests,
            Self::Destination => Self::Source,
            Self::Interests => Self::Destination,
        }
    }

    /// Get the form label for this field
    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Destination => "Destination",
            Self::Interests => "I'm interested in...",
        }
    }
}

/// TUI application state
#[derive(Debug)]
pub struct AppState {
    /// Form field contents
    pub source: String,
    pub destination: String,
    pub interests: String,

    /// Which field receives typed characters
    pub focus: Focus,

    /// Inline validation message, cleared on the next keypress
    pub error: Option<String>,

    /// Caller location resolved once at startup (may be absent)
    pub location: Option<LatLng>,

    /// Latest view of the plan session
    pub snapshot: SessionSnapshot,

    /// Status word chosen per submission
    pub planning_word: &'static str,

    /// Current spinner frame index
    pub spinner_frame: usize,

    /// Results pane scroll offset
    pub scroll: u16,
}

impl AppState {
    /// Create the initial state with the original form defaults
    pub fn new(location: Option<LatLng>) -> Self {
        debug!(has_location = %location.is_some(), "AppState::new: called");
        Self {
            source: "San Francisco, CA".to_string(),
            destination: "Los Angeles, CA".to_string(),
            interests: "quirky roadside attractions and unique cafes".to_string(),
            focus: Focus::default(),
            error: None,
            location,
            snapshot: SessionSnapshot::default(),
            planning_word: PLANNING_WORDS[0],
            spinner_frame: 0,
            scroll: 0,
        }
    }

    /// Get the currently focused field, mutably
    pub fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            Focus::Source => &mut self.source,
            Focus::Destination => &mut self.destination,
            Focus::Interests => &mut self.interests,
        }
    }

    /// Build a query from the current form contents
    pub fn query(&self) -> TripQuery {
        TripQuery::new(self.source.clone(), self.destination.clone(), self.interests.clone())
            .with_location(self.location)
    }

    /// Check if an itinerary call is currently in flight
    pub fn is_planning(&self) -> bool {
        self.snapshot.phase == PlanPhase::Planning
    }

    /// Pick a fresh status word for a new submission
    pub fn pick_planning_word(&mut self) {
        let mut rng = rand::rng();
        if let Some(word) = PLANNING_WORDS.choose(&mut rng) {
            self.planning_word = word;
        }
    }

    /// Advance the spinner one frame
    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    /// Get the current spinner frame
    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    /// Clear any transient validation message
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_cycle_covers_all_fields() {
        let mut focus = Focus::Source;
        focus = focus.next();
        assert_eq!(focus, Focus::Destination);
        focus = focus.next();
        assert_eq!(focus, Focus::Interests);
        focus = focus.next();
        assert_eq!(focus, Focus::Source);

        assert_eq!(Focus::Source.prev(), Focus::Interests);
    }

    #[test]
    fn test_initial_state_prefills_form() {
        let state = AppState::new(None);
        assert_eq!(state.source, "San Francisco, CA");
        assert_eq!(state.destination, "Los Angeles, CA");
        assert!(state.interests.contains("quirky roadside attractions"));
        assert!(state.error.is_none());
        assert!(!state.is_planning());
    }

    #[test]
    fn test_query_carries_location() {
        let location = LatLng {
            latitude: 37.77,
            longitude: -122.42,
        };
        let state = AppState::new(Some(location));
        assert_eq!(state.query().location, Some(location));
    }

    #[test]
    fn test_tick_wraps_spinner() {
        let mut state = AppState::new(None);
        for _ in 0..SPINNER_FRAMES.len() {
            state.tick();
        }
        assert_eq!(state.spinner_frame, 0);
    }
}
