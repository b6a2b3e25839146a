//! Request/response types for the generative-AI service boundary
//!
//! These types model the Gemini generateContent API surface but stay
//! provider-agnostic enough to support other grounded-text providers.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A caller location hint, forwarded to the grounding retrieval config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything needed for one itinerary call
#[derive(Debug, Clone)]
pub struct ItineraryRequest {
    /// Starting point of the trip
    pub source: String,

    /// Trip destination
    pub destination: String,

    /// Free-text interests guiding the suggestions
    pub interests: String,

    /// Optional caller location for "nearby" relevance
    pub location: Option<LatLng>,
}

/// A grounded place citation returned by the itinerary service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRef {
    pub uri: String,
    pub title: String,
}

impl PlaceRef {
    /// Create a place reference
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        debug!(%title, "PlaceRef::new: called");
        Self { uri: uri.into(), title }
    }
}

/// Response from an itinerary call: narrative text plus grounded stops
#[derive(Debug, Clone)]
pub struct Itinerary {
    /// Free text using the `**Title**` section-heading convention
    pub narrative: String,

    /// Map-grounded place references, in service response order
    pub places: Vec<PlaceRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latlng_serializes_camel_case() {
        let loc = LatLng {
            latitude: 37.77,
            longitude: -122.42,
        };
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["latitude"], 37.77);
        assert_eq!(json["longitude"], -122.42);
    }

    #[test]
    fn test_place_ref_new() {
        let place = PlaceRef::new("https://maps.example/abc", "Cabazon Dinosaurs");
        assert_eq!(place.uri, "https://maps.example/abc");
        assert_eq!(place.title, "Cabazon Dinosaurs");
    }
}
