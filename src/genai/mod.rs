//! Generative-AI service boundary for Wayfinder
//!
//! Provides the itinerary (text+grounding) and per-place image calls.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::GenAiClient;
pub use error::ServiceError;
pub use gemini::GeminiClient;
pub use types::{Itinerary, ItineraryRequest, LatLng, PlaceRef};

use crate::config::GenAiConfig;

/// Create a generative-AI client from configuration
///
/// There is a single provider today; the Arc'd trait object keeps the
/// orchestrator decoupled from it and lets tests substitute a fake.
pub fn create_client(config: &GenAiConfig) -> Result<Arc<dyn GenAiClient>, ServiceError> {
    debug!(model = %config.model, "create_client: called");
    Ok(Arc::new(GeminiClient::from_config(config)?))
}
