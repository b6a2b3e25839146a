//! Trip plan domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::genai::{LatLng, PlaceRef};

/// A required form field was empty
///
/// Caught at the surface before any service call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
}

/// One trip-planning submission
///
/// Transient; constructed fresh per submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TripQuery {
    pub source: String,
    pub destination: String,
    pub interests: String,
    pub location: Option<LatLng>,
}

impl TripQuery {
    /// Create a query without a location hint
    pub fn new(source: impl Into<String>, destination: impl Into<String>, interests: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            interests: interests.into(),
            location: None,
        }
    }

    /// Attach an optional caller location hint
    pub fn with_location(mut self, location: Option<LatLng>) -> Self {
        self.location = location;
        self
    }

    /// Require all three text fields to be non-empty
    pub fn validate(&self) -> Result<(), QueryError> {
        debug!("TripQuery::validate: called");
        if self.source.trim().is_empty() {
            return Err(QueryError::MissingField { field: "source" });
        }
        if self.destination.trim().is_empty() {
            return Err(QueryError::MissingField { field: "destination" });
        }
        if self.interests.trim().is_empty() {
            return Err(QueryError::MissingField { field: "interests" });
        }
        Ok(())
    }
}

/// Image display state for one stop
///
/// The loading flag and image URL of the source design are collapsed into
/// one enum so a loading entry can never also carry an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ImageState {
    /// No fetch requested yet
    Pending,
    /// Fetch in flight
    Loading,
    /// Fetch succeeded; the payload as a data URI
    Ready { data_uri: String },
    /// Fetch failed; the stop stays image-less
    Unavailable,
}

impl ImageState {
    /// Check if a fetch is currently in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, ImageState::Loading)
    }

    /// Check if the fetch has completed, successfully or not
    pub fn is_settled(&self) -> bool {
        matches!(self, ImageState::Ready { .. } | ImageState::Unavailable)
    }

    /// Get the data URI if the image is ready
    pub fn data_uri(&self) -> Option<&str> {
        match self {
            ImageState::Ready { data_uri } => Some(data_uri),
            _ => None,
        }
    }
}

/// A suggested stop: an immutable place reference plus mutable image state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Stable identity; image updates are addressed by this, never by index
    pub id: Uuid,
    pub place: PlaceRef,
    pub image: ImageState,
}

impl LocationEntry {
    /// Create an entry with no image requested yet
    pub fn new(place: PlaceRef) -> Self {
        Self {
            id: Uuid::now_v7(),
            place,
            image: ImageState::Pending,
        }
    }
}

/// A settled itinerary: narrative text plus its suggested stops
///
/// The stops sequence is fixed at creation (service response order); only
/// each entry's image state changes afterward, inside the session actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    /// Which planning attempt this plan belongs to; stale enrichment writes
    /// are discarded by comparing against the session's current generation
    pub generation: u64,
    pub created_at: DateTime<Utc>,
    /// Free text using the `**Title**` heading convention
    pub narrative: String,
    pub stops: Vec<LocationEntry>,
}

impl TripPlan {
    /// Build a plan from an itinerary response
    pub fn new(generation: u64, narrative: impl Into<String>, places: Vec<PlaceRef>) -> Self {
        debug!(generation, place_count = places.len(), "TripPlan::new: called");
        Self {
            generation,
            created_at: Utc::now(),
            narrative: narrative.into(),
            stops: places.into_iter().map(LocationEntry::new).collect(),
        }
    }

    /// Look up a stop by identity
    pub fn stop(&self, id: Uuid) -> Option<&LocationEntry> {
        self.stops.iter().find(|entry| entry.id == id)
    }

    /// Look up a stop by identity, mutably
    pub fn stop_mut(&mut self, id: Uuid) -> Option<&mut LocationEntry> {
        self.stops.iter_mut().find(|entry| entry.id == id)
    }

    /// Check whether every stop has reached a settled image state
    pub fn settled(&self) -> bool {
        self.stops.iter().all(|entry| entry.image.is_settled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_complete_query() {
        let query = TripQuery::new("San Francisco, CA", "Los Angeles, CA", "quirky roadside attractions");
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let query = TripQuery::new("", "Los Angeles, CA", "diners");
        assert_eq!(query.validate(), Err(QueryError::MissingField { field: "source" }));

        let query = TripQuery::new("San Francisco, CA", "   ", "diners");
        assert_eq!(query.validate(), Err(QueryError::MissingField { field: "destination" }));

        let query = TripQuery::new("San Francisco, CA", "Los Angeles, CA", "");
        assert_eq!(query.validate(), Err(QueryError::MissingField { field: "interests" }));
    }

    #[test]
    fn test_image_state_never_loading_with_image() {
        // The settled/loading split is structural: no variant carries a
        // data URI while loading.
        let ready = ImageState::Ready {
            data_uri: "data:image/png;base64,aGVsbG8=".to_string(),
        };
        assert!(ready.is_settled());
        assert!(!ready.is_loading());
        assert!(ready.data_uri().is_some());

        assert!(ImageState::Loading.is_loading());
        assert!(ImageState::Loading.data_uri().is_none());
        assert!(!ImageState::Loading.is_settled());

        assert!(ImageState::Unavailable.is_settled());
        assert!(ImageState::Unavailable.data_uri().is_none());
    }

    #[test]
    fn test_new_plan_starts_all_pending() {
        let plan = TripPlan::new(
            1,
            "**A**\nbody",
            vec![
                PlaceRef::new("https://maps.example/1", "A"),
                PlaceRef::new("https://maps.example/2", "B"),
            ],
        );
        assert_eq!(plan.stops.len(), 2);
        assert!(plan.stops.iter().all(|s| s.image == ImageState::Pending));
        assert!(!plan.settled());
    }

    #[test]
    fn test_plan_preserves_place_order() {
        let plan = TripPlan::new(
            1,
            "text",
            vec![
                PlaceRef::new("u1", "First"),
                PlaceRef::new("u2", "Second"),
                PlaceRef::new("u3", "Third"),
            ],
        );
        let titles: Vec<_> = plan.stops.iter().map(|s| s.place.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_stop_lookup_by_id() {
        let mut plan = TripPlan::new(1, "text", vec![PlaceRef::new("u1", "Only")]);
        let id = plan.stops[0].id;
        assert!(plan.stop(id).is_some());
        if let Some(entry) = plan.stop_mut(id) {
            entry.image = ImageState::Unavailable;
        }
        assert!(plan.settled());

        assert!(plan.stop(Uuid::now_v7()).is_none());
    }

    #[test]
    fn test_empty_plan_is_settled() {
        let plan = TripPlan::new(1, "no stops", vec![]);
        assert!(plan.settled());
    }
}
