//! Gemini API client implementation
//!
//! Implements the GenAiClient trait over the generateContent endpoints: the
//! text+grounding model with the Google Maps tool for itineraries, and the
//! image model for per-place illustrations. Calls carry no local retry or
//! backoff; each request resolves or rejects exactly once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{GenAiClient, Itinerary, ItineraryRequest, PlaceRef, ServiceError};
use crate::config::GenAiConfig;
use crate::prompts;

/// Gemini API client
pub struct GeminiClient {
    model: String,
    image_model: String,
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &GenAiConfig) -> Result<Self, ServiceError> {
        debug!(model = %config.model, image_model = %config.image_model, "from_config: called");
        let api_key = config.get_api_key()?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(ServiceError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            image_model: config.image_model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    /// Build the request body for an itinerary call
    ///
    /// Enables the Google Maps grounding tool, and forwards the caller
    /// location as a retrieval hint when present.
    fn build_itinerary_body(&self, request: &ItineraryRequest) -> Result<serde_json::Value, ServiceError> {
        debug!(source = %request.source, destination = %request.destination, "build_itinerary_body: called");
        let prompt = prompts::render_itinerary(request)?;

        let mut body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "googleMaps": {} }],
        });

        if let Some(location) = request.location {
            debug!("build_itinerary_body: adding retrieval location hint");
            body["toolConfig"] = serde_json::json!({
                "retrievalConfig": { "latLng": location }
            });
        }

        Ok(body)
    }

    /// Build the request body for an image call
    fn build_image_body(&self, place_title: &str) -> Result<serde_json::Value, ServiceError> {
        debug!(%place_title, "build_image_body: called");
        let prompt = prompts::render_place_image(place_title)?;

        Ok(serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE"] },
        }))
    }

    /// POST a generateContent request and decode the response envelope
    async fn post(&self, model: &str, body: &serde_json::Value) -> Result<GenerateContentResponse, ServiceError> {
        let url = self.endpoint(model);
        debug!(%url, "post: sending request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(ServiceError::Network)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(%status, "post: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api { status, message: text });
        }

        debug!("post: success");
        Ok(response.json().await?)
    }

    /// Extract narrative text and map-grounded places from the response
    fn parse_itinerary(&self, response: GenerateContentResponse) -> Result<Itinerary, ServiceError> {
        debug!(candidate_count = %response.candidates.len(), "parse_itinerary: called");
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or(ServiceError::EmptyNarrative)?;

        let narrative: String = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if narrative.trim().is_empty() {
            debug!("parse_itinerary: narrative empty");
            return Err(ServiceError::EmptyNarrative);
        }

        // Only grounding chunks tagged as map places become stops; web and
        // other citation kinds are dropped.
        let places: Vec<PlaceRef> = candidate
            .grounding_metadata
            .map(|metadata| metadata.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.maps)
            .map(|maps| PlaceRef {
                uri: maps.uri,
                title: maps.title,
            })
            .collect();

        debug!(place_count = %places.len(), "parse_itinerary: parsed");
        Ok(Itinerary { narrative, places })
    }

    /// Extract the first inline image payload as a data URI
    fn parse_image(&self, response: GenerateContentResponse, place_title: &str) -> Result<String, ServiceError> {
        debug!(%place_title, "parse_image: called");
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(inline) = part.inline_data {
                let mime = inline.mime_type.unwrap_or_else(|| "image/png".to_string());
                debug!(%mime, "parse_image: inline payload found");
                return Ok(format!("data:{};base64,{}", mime, inline.data));
            }
        }

        debug!(%place_title, "parse_image: no inline payload");
        Err(ServiceError::NoImage {
            place: place_title.to_string(),
        })
    }
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn generate_itinerary(&self, request: ItineraryRequest) -> Result<Itinerary, ServiceError> {
        debug!(%self.model, "generate_itinerary: called");
        let body = self.build_itinerary_body(&request)?;
        let response = self.post(&self.model, &body).await?;
        self.parse_itinerary(response)
    }

    async fn generate_place_image(&self, place_title: &str) -> Result<String, ServiceError> {
        debug!(%self.image_model, %place_title, "generate_place_image: called");
        let body = self.build_image_body(place_title)?;
        let response = self.post(&self.image_model, &body).await?;
        self.parse_image(response, place_title)
    }
}

// Gemini generateContent response envelope

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    maps: Option<MapsChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MapsChunk {
    uri: String,
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::LatLng;

    fn client() -> GeminiClient {
        GeminiClient {
            model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
        }
    }

    fn request(location: Option<LatLng>) -> ItineraryRequest {
        ItineraryRequest {
            source: "San Francisco, CA".to_string(),
            destination: "Los Angeles, CA".to_string(),
            interests: "quirky roadside attractions".to_string(),
            location,
        }
    }

    #[test]
    fn test_endpoint() {
        let client = client();
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_itinerary_body_basic() {
        let client = client();
        let body = client.build_itinerary_body(&request(None)).unwrap();

        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("San Francisco, CA"));
        assert!(body["tools"][0]["googleMaps"].is_object());
        assert!(body.get("toolConfig").is_none());
    }

    #[test]
    fn test_build_itinerary_body_with_location() {
        let client = client();
        let body = client
            .build_itinerary_body(&request(Some(LatLng {
                latitude: 37.77,
                longitude: -122.42,
            })))
            .unwrap();

        assert_eq!(body["toolConfig"]["retrievalConfig"]["latLng"]["latitude"], 37.77);
        assert_eq!(body["toolConfig"]["retrievalConfig"]["latLng"]["longitude"], -122.42);
    }

    #[test]
    fn test_build_image_body() {
        let client = client();
        let body = client.build_image_body("Cabazon Dinosaurs").unwrap();

        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Cabazon Dinosaurs"));
        assert_eq!(body["generationConfig"]["responseModalities"][0], "IMAGE");
    }

    #[test]
    fn test_parse_itinerary_joins_text_and_filters_maps_chunks() {
        let client = client();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "**Cabazon Dinosaurs**\n" },
                    { "text": "Giant roadside dinosaurs." }
                ]},
                "groundingMetadata": { "groundingChunks": [
                    { "maps": { "uri": "https://maps.example/1", "title": "Cabazon Dinosaurs" } },
                    { "web": { "uri": "https://example.com", "title": "Some article" } },
                    { "maps": { "uri": "https://maps.example/2", "title": "Salvation Mountain" } }
                ]}
            }]
        }))
        .unwrap();

        let itinerary = client.parse_itinerary(response).unwrap();
        assert_eq!(itinerary.narrative, "**Cabazon Dinosaurs**\nGiant roadside dinosaurs.");
        assert_eq!(itinerary.places.len(), 2);
        assert_eq!(itinerary.places[0].title, "Cabazon Dinosaurs");
        assert_eq!(itinerary.places[1].title, "Salvation Mountain");
    }

    #[test]
    fn test_parse_itinerary_empty_narrative_is_error() {
        let client = client();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "   " }] } }]
        }))
        .unwrap();

        assert!(matches!(
            client.parse_itinerary(response),
            Err(ServiceError::EmptyNarrative)
        ));
    }

    #[test]
    fn test_parse_itinerary_no_candidates_is_error() {
        let client = client();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({})).unwrap();

        assert!(matches!(
            client.parse_itinerary(response),
            Err(ServiceError::EmptyNarrative)
        ));
    }

    #[test]
    fn test_parse_itinerary_without_grounding_has_no_places() {
        let client = client();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "Just drive south." }] } }]
        }))
        .unwrap();

        let itinerary = client.parse_itinerary(response).unwrap();
        assert!(itinerary.places.is_empty());
    }

    #[test]
    fn test_parse_image_builds_data_uri() {
        let client = client();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here is your image." },
                { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
            ]}}]
        }))
        .unwrap();

        let uri = client.parse_image(response, "Cabazon Dinosaurs").unwrap();
        assert_eq!(uri, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_parse_image_defaults_mime_type() {
        let client = client();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "data": "aGVsbG8=" } }
            ]}}]
        }))
        .unwrap();

        let uri = client.parse_image(response, "Cabazon Dinosaurs").unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_parse_image_missing_payload_is_error() {
        let client = client();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "no image here" }] } }]
        }))
        .unwrap();

        let result = client.parse_image(response, "Salvation Mountain");
        assert!(matches!(result, Err(ServiceError::NoImage { place }) if place == "Salvation Mountain"));
    }
}
