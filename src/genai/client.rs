//! GenAiClient trait definition

use async_trait::async_trait;
#[allow(unused_imports)]
use tracing::debug;

use super::{Itinerary, ItineraryRequest, ServiceError};

/// Stateless generative-AI client - each call is independent
///
/// This is the boundary to the external text+grounding and image models.
/// Implementations hold no conversation state; every call either resolves
/// or rejects exactly once, with no local retry or caching.
#[async_trait]
pub trait GenAiClient: Send + Sync {
    /// Request a narrative itinerary with grounded place references
    ///
    /// Fails when the transport fails, the service rejects the call, or the
    /// response carries no narrative text.
    async fn generate_itinerary(&self, request: ItineraryRequest) -> Result<Itinerary, ServiceError>;

    /// Request an illustrative image for a place, returned as a data URI
    ///
    /// Fails when the call fails or the response carries no inline image
    /// payload.
    async fn generate_place_image(&self, place_title: &str) -> Result<String, ServiceError>;
}
