//! Prompt templates for the generative-AI calls
//!
//! Templates are compiled into the binary from .pmt files and rendered with
//! Handlebars. The itinerary template asks for `**Title**` section headings
//! and no numbered lists; downstream rendering depends on that convention.

use handlebars::{Handlebars, RenderError, no_escape};
use serde::Serialize;
use tracing::debug;

use crate::genai::{ItineraryRequest, LatLng};

/// Handlebars instance with HTML escaping disabled (these are plain-text
/// prompts, not markup)
fn renderer() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(no_escape);
    handlebars
}

/// Trip-planner instruction template
pub const ITINERARY: &str = include_str!("../prompts/itinerary.pmt");

/// Photographic-depiction template for a single place
pub const IMAGE: &str = include_str!("../prompts/image.pmt");

#[derive(Serialize)]
struct ItineraryContext<'a> {
    source: &'a str,
    destination: &'a str,
    interests: &'a str,
    location: Option<LatLng>,
}

/// Render the itinerary instruction for one request
pub fn render_itinerary(request: &ItineraryRequest) -> Result<String, RenderError> {
    debug!(
        source = %request.source,
        destination = %request.destination,
        has_location = %request.location.is_some(),
        "render_itinerary: called"
    );
    let context = ItineraryContext {
        source: &request.source,
        destination: &request.destination,
        interests: &request.interests,
        location: request.location,
    };
    renderer().render_template(ITINERARY, &context)
}

/// Render the image instruction for one place title
pub fn render_place_image(place_title: &str) -> Result<String, RenderError> {
    debug!(%place_title, "render_place_image: called");
    renderer().render_template(IMAGE, &serde_json::json!({ "place": place_title }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(location: Option<LatLng>) -> ItineraryRequest {
        ItineraryRequest {
            source: "San Francisco, CA".to_string(),
            destination: "Los Angeles, CA".to_string(),
            interests: "quirky roadside attractions".to_string(),
            location,
        }
    }

    #[test]
    fn test_render_itinerary_embeds_fields() {
        let prompt = render_itinerary(&request(None)).unwrap();
        assert!(prompt.contains("Source: San Francisco, CA"));
        assert!(prompt.contains("Destination: Los Angeles, CA"));
        assert!(prompt.contains("Interests: quirky roadside attractions"));
        assert!(prompt.contains("**Title**"));
        assert!(prompt.contains("Do not use numbered lists"));
    }

    #[test]
    fn test_render_itinerary_omits_location_when_absent() {
        let prompt = render_itinerary(&request(None)).unwrap();
        assert!(!prompt.contains("current location"));
    }

    #[test]
    fn test_render_itinerary_includes_location_when_present() {
        let prompt = render_itinerary(&request(Some(LatLng {
            latitude: 37.77,
            longitude: -122.42,
        })))
        .unwrap();
        assert!(prompt.contains("latitude 37.77"));
        assert!(prompt.contains("longitude -122.42"));
    }

    #[test]
    fn test_render_place_image_embeds_title() {
        let prompt = render_place_image("Cabazon Dinosaurs").unwrap();
        assert!(prompt.contains("photograph of Cabazon Dinosaurs"));
    }

    #[test]
    fn test_render_does_not_html_escape() {
        let prompt = render_place_image("Pete's Diner & Gift Shop").unwrap();
        assert!(prompt.contains("Pete's Diner & Gift Shop"));
    }
}
