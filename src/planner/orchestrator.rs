//! Planning orchestrator
//!
//! Chains the two external calls: one itinerary request that must resolve
//! before a plan exists, then one independent image request per stop. The
//! service client is injected, never a module-level singleton, so tests can
//! substitute a fake. Enrichment tasks are tracked in a JoinSet rather than
//! detached, so callers can await drain-completion.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::genai::{GenAiClient, ItineraryRequest, ServiceError};

use super::plan::{QueryError, TripPlan, TripQuery};
use super::session::{PlanSession, SessionError};

/// Errors from a planning attempt
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed to generate trip plan: {0}")]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Drives itinerary generation and per-stop image enrichment
pub struct Planner {
    client: Arc<dyn GenAiClient>,
    session: PlanSession,
    tasks: tokio::sync::Mutex<JoinSet<()>>,
}

impl Planner {
    /// Create a planner over an injected service client and session
    pub fn new(client: Arc<dyn GenAiClient>, session: PlanSession) -> Self {
        debug!("Planner::new: called");
        Self {
            client,
            session,
            tasks: tokio::sync::Mutex::new(JoinSet::new()),
        }
    }

    /// Get the session handle this planner publishes into
    pub fn session(&self) -> &PlanSession {
        &self.session
    }

    /// Run one planning attempt to completion
    ///
    /// Validates the query (issuing zero service calls on failure), makes
    /// exactly one itinerary call, and publishes the resulting plan with
    /// every stop image pending. On service failure the session records the
    /// user-facing message and no partial plan remains. Image enrichment is
    /// not part of this call; see [`Planner::enrich`].
    pub async fn plan(&self, query: TripQuery) -> Result<TripPlan, PlanError> {
        debug!(source = %query.source, destination = %query.destination, "plan: called");
        query.validate()?;

        let generation = self.session.begin().await?;
        let request = ItineraryRequest {
            source: query.source,
            destination: query.destination,
            interests: query.interests,
            location: query.location,
        };

        match self.client.generate_itinerary(request).await {
            Ok(itinerary) => {
                debug!(
                    generation,
                    place_count = itinerary.places.len(),
                    "plan: itinerary resolved"
                );
                let plan = TripPlan::new(generation, itinerary.narrative, itinerary.places);
                self.session.publish(plan.clone()).await?;
                Ok(plan)
            }
            Err(error) => {
                warn!(generation, error = %error, "plan: itinerary call failed");
                self.session.fail(generation, error.to_string()).await?;
                Err(PlanError::Service(error))
            }
        }
    }

    /// Launch one independent image-fetch task per stop
    ///
    /// Tasks run concurrently with no ordering guarantee and no concurrency
    /// limit. Each marks its stop loading, calls the image service, and
    /// settles the stop; failures are logged and absorbed per stop. Tasks
    /// targeting a superseded plan generation no-op. Returns the number of
    /// tasks launched.
    pub async fn enrich(&self, plan: &TripPlan) -> usize {
        debug!(generation = plan.generation, stop_count = plan.stops.len(), "enrich: called");
        let mut tasks = self.tasks.lock().await;

        for stop in &plan.stops {
            let client = Arc::clone(&self.client);
            let session = self.session.clone();
            let generation = plan.generation;
            let stop_id = stop.id;
            let title = stop.place.title.clone();

            tasks.spawn(async move {
                match session.mark_loading(generation, stop_id).await {
                    Ok(applied) if applied.is_current() => {}
                    Ok(_) => {
                        debug!(generation, %stop_id, "enrich task: plan superseded, skipping");
                        return;
                    }
                    Err(_) => return,
                }

                match client.generate_place_image(&title).await {
                    Ok(data_uri) => {
                        debug!(generation, %title, "enrich task: image ready");
                        let _ = session.set_image(generation, stop_id, data_uri).await;
                    }
                    Err(error) => {
                        warn!(generation, %title, error = %error, "enrich task: image generation failed");
                        let _ = session.mark_unavailable(generation, stop_id).await;
                    }
                }
            });
        }

        plan.stops.len()
    }

    /// Await completion of every tracked enrichment task
    pub async fn drain(&self) {
        debug!("drain: called");
        let mut tasks = self.tasks.lock().await;
        while let Some(result) = tasks.join_next().await {
            if let Err(error) = result {
                warn!(error = %error, "drain: enrichment task failed");
            }
        }
    }
}
