//! Wayfinder - AI road-trip planner for the terminal
//!
//! Wayfinder collects a source, destination, and interests, asks a
//! generative-AI text+grounding model for a narrative itinerary with
//! map-grounded stops, then asynchronously generates an illustrative image
//! for each stop. The itinerary call must resolve before a plan exists;
//! image enrichment runs as independent concurrent tasks that update the
//! plan incrementally, out of order, and without blocking each other.
//!
//! # Core Concepts
//!
//! - **One plan at a time**: each submission supersedes the last; writes
//!   from a superseded enrichment batch are discarded by generation tag
//! - **Actor-owned state**: all plan mutations flow through the session
//!   actor, so concurrent tasks never clobber each other
//! - **Injected clients**: the service boundary is a trait handle passed
//!   in, substitutable with a fake in tests
//! - **Isolated image failures**: a failed image settles only its own stop
//!
//! # Modules
//!
//! - [`genai`] - generative-AI service boundary (itinerary + image calls)
//! - [`planner`] - domain types, session actor, and orchestrator
//! - [`markdown`] - `**Title**` heading segmentation for narrative text
//! - [`geo`] - optional caller-location resolution
//! - [`prompts`] - Handlebars templates for the service calls
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//! - [`tui`] - interactive terminal UI

pub mod cli;
pub mod config;
pub mod genai;
pub mod geo;
pub mod markdown;
pub mod planner;
pub mod prompts;
pub mod tui;

// Re-export commonly used types
pub use config::{Config, GenAiConfig, GeoConfig, LoggingConfig, UiConfig};
pub use genai::{GenAiClient, GeminiClient, Itinerary, ItineraryRequest, LatLng, PlaceRef, ServiceError, create_client};
pub use markdown::Segment;
pub use planner::{
    Applied, ImageState, LocationEntry, PlanError, PlanPhase, PlanSession, Planner, QueryError, SessionError,
    SessionEvent, SessionSnapshot, TripPlan, TripQuery,
};
