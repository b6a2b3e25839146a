//! PlanSession - actor that owns the active trip plan
//!
//! All plan mutations flow through one task via command channels, so
//! concurrent enrichment tasks can never clobber each other with stale
//! snapshots. Every mutating command carries the plan generation it targets;
//! commands against a superseded generation are discarded. A broadcast
//! channel notifies subscribers (the TUI) of every applied transition.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use super::plan::{ImageState, TripPlan};

/// Command channel depth
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Event channel depth; slow subscribers drop oldest events
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Whether a mutating command targeted the current plan generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The command was applied to the current plan
    Current,
    /// The command targeted a superseded generation and was discarded
    Stale,
}

impl Applied {
    pub fn is_current(self) -> bool {
        matches!(self, Applied::Current)
    }
}

/// Where the session is in the planning lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum PlanPhase {
    /// No submission yet
    #[default]
    Idle,
    /// Itinerary call in flight
    Planning,
    /// A plan is published; enrichment may still be running
    Ready,
    /// The planning attempt failed; message is user-facing
    Failed { message: String },
}

/// Point-in-time view of the session, consumed by the surfaces
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub phase: PlanPhase,
    pub plan: Option<TripPlan>,
}

/// Broadcast when session state changes that surfaces should react to
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A new planning attempt began; any prior plan is gone
    PlanStarted { generation: u64 },
    /// The itinerary resolved and a plan is published
    PlanReady { generation: u64, stop_count: usize },
    /// The planning attempt failed with a user-facing message
    PlanFailed { generation: u64, message: String },
    /// One stop's image state changed
    StopUpdated { generation: u64, stop_id: Uuid },
}

/// Errors from session handle operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Plan session is no longer running")]
    ChannelClosed,
}

enum SessionCommand {
    Begin {
        reply: oneshot::Sender<u64>,
    },
    Publish {
        plan: TripPlan,
        reply: oneshot::Sender<Applied>,
    },
    Fail {
        generation: u64,
        message: String,
        reply: oneshot::Sender<Applied>,
    },
    SetImageState {
        generation: u64,
        stop_id: Uuid,
        image: ImageState,
        reply: oneshot::Sender<Applied>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Handle to send commands to the session actor
#[derive(Clone)]
pub struct PlanSession {
    tx: mpsc::Sender<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl PlanSession {
    /// Spawn a new session actor
    pub fn spawn() -> Self {
        debug!("PlanSession::spawn: called");
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(actor_loop(rx));

        Self { tx, event_tx }
    }

    /// Subscribe to session state changes
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Start a new planning attempt
    ///
    /// Bumps the generation, drops any prior plan, and returns the new
    /// generation for tagging downstream writes.
    pub async fn begin(&self) -> Result<u64, SessionError> {
        debug!("begin: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Begin { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        let generation = reply_rx.await.map_err(|_| SessionError::ChannelClosed)?;

        let _ = self.event_tx.send(SessionEvent::PlanStarted { generation });
        Ok(generation)
    }

    /// Publish a settled plan for its generation
    pub async fn publish(&self, plan: TripPlan) -> Result<Applied, SessionError> {
        debug!(generation = plan.generation, stop_count = plan.stops.len(), "publish: called");
        let generation = plan.generation;
        let stop_count = plan.stops.len();

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Publish { plan, reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        let applied = reply_rx.await.map_err(|_| SessionError::ChannelClosed)?;

        if applied.is_current() {
            let _ = self.event_tx.send(SessionEvent::PlanReady { generation, stop_count });
        }
        Ok(applied)
    }

    /// Record a failed planning attempt with its user-facing message
    pub async fn fail(&self, generation: u64, message: impl Into<String>) -> Result<Applied, SessionError> {
        let message = message.into();
        debug!(generation, %message, "fail: called");

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Fail {
                generation,
                message: message.clone(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        let applied = reply_rx.await.map_err(|_| SessionError::ChannelClosed)?;

        if applied.is_current() {
            let _ = self.event_tx.send(SessionEvent::PlanFailed { generation, message });
        }
        Ok(applied)
    }

    /// Mark a stop's image fetch as in flight
    pub async fn mark_loading(&self, generation: u64, stop_id: Uuid) -> Result<Applied, SessionError> {
        self.set_image_state(generation, stop_id, ImageState::Loading).await
    }

    /// Settle a stop with its fetched image
    pub async fn set_image(
        &self,
        generation: u64,
        stop_id: Uuid,
        data_uri: impl Into<String>,
    ) -> Result<Applied, SessionError> {
        self.set_image_state(
            generation,
            stop_id,
            ImageState::Ready {
                data_uri: data_uri.into(),
            },
        )
        .await
    }

    /// Settle a stop without an image after a failed fetch
    pub async fn mark_unavailable(&self, generation: u64, stop_id: Uuid) -> Result<Applied, SessionError> {
        self.set_image_state(generation, stop_id, ImageState::Unavailable).await
    }

    async fn set_image_state(
        &self,
        generation: u64,
        stop_id: Uuid,
        image: ImageState,
    ) -> Result<Applied, SessionError> {
        debug!(generation, %stop_id, ?image, "set_image_state: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::SetImageState {
                generation,
                stop_id,
                image,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        let applied = reply_rx.await.map_err(|_| SessionError::ChannelClosed)?;

        if applied.is_current() {
            let _ = self.event_tx.send(SessionEvent::StopUpdated { generation, stop_id });
        }
        Ok(applied)
    }

    /// Get a point-in-time view of the session
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        reply_rx.await.map_err(|_| SessionError::ChannelClosed)
    }

    /// Shut down the session actor
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        debug!("shutdown: called");
        self.tx
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }
}

struct SessionState {
    generation: u64,
    phase: PlanPhase,
    plan: Option<TripPlan>,
}

/// The actor loop that owns the plan and processes commands
async fn actor_loop(mut rx: mpsc::Receiver<SessionCommand>) {
    debug!("actor_loop: PlanSession actor started");
    let mut state = SessionState {
        generation: 0,
        phase: PlanPhase::Idle,
        plan: None,
    };

    while let Some(cmd) = rx.recv().await {
        match cmd {
            SessionCommand::Begin { reply } => {
                state.generation += 1;
                state.phase = PlanPhase::Planning;
                state.plan = None;
                debug!(generation = state.generation, "actor_loop: Begin command");
                let _ = reply.send(state.generation);
            }

            SessionCommand::Publish { plan, reply } => {
                let applied = if plan.generation == state.generation {
                    debug!(generation = plan.generation, "actor_loop: Publish applied");
                    state.phase = PlanPhase::Ready;
                    state.plan = Some(plan);
                    Applied::Current
                } else {
                    debug!(
                        generation = plan.generation,
                        current = state.generation,
                        "actor_loop: Publish discarded, generation superseded"
                    );
                    Applied::Stale
                };
                let _ = reply.send(applied);
            }

            SessionCommand::Fail { generation, message, reply } => {
                let applied = if generation == state.generation {
                    debug!(generation, %message, "actor_loop: Fail applied");
                    state.phase = PlanPhase::Failed { message };
                    state.plan = None;
                    Applied::Current
                } else {
                    debug!(generation, current = state.generation, "actor_loop: Fail discarded");
                    Applied::Stale
                };
                let _ = reply.send(applied);
            }

            SessionCommand::SetImageState {
                generation,
                stop_id,
                image,
                reply,
            } => {
                let applied = apply_image_state(&mut state, generation, stop_id, image);
                let _ = reply.send(applied);
            }

            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(SessionSnapshot {
                    generation: state.generation,
                    phase: state.phase.clone(),
                    plan: state.plan.clone(),
                });
            }

            SessionCommand::Shutdown => {
                info!("PlanSession shutting down");
                break;
            }
        }
    }

    debug!("actor_loop: PlanSession actor stopped");
}

/// Read-modify-write of one stop's image state against the current plan
fn apply_image_state(state: &mut SessionState, generation: u64, stop_id: Uuid, image: ImageState) -> Applied {
    if generation != state.generation {
        debug!(
            generation,
            current = state.generation,
            %stop_id,
            "apply_image_state: write discarded, generation superseded"
        );
        return Applied::Stale;
    }

    let Some(plan) = state.plan.as_mut() else {
        debug!(generation, %stop_id, "apply_image_state: no plan published");
        return Applied::Stale;
    };

    match plan.stop_mut(stop_id) {
        Some(entry) => {
            entry.image = image;
            Applied::Current
        }
        None => {
            debug!(%stop_id, "apply_image_state: unknown stop id");
            Applied::Stale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::PlaceRef;

    fn plan_with_stops(generation: u64, titles: &[&str]) -> TripPlan {
        TripPlan::new(
            generation,
            "**Trip**\nbody",
            titles
                .iter()
                .map(|t| PlaceRef::new(format!("https://maps.example/{t}"), *t))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_begin_bumps_generation_and_clears_plan() {
        let session = PlanSession::spawn();

        let first = session.begin().await.unwrap();
        let second = session.begin().await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.phase, PlanPhase::Planning);
        assert!(snapshot.plan.is_none());

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_current_generation() {
        let session = PlanSession::spawn();
        let generation = session.begin().await.unwrap();

        let applied = session.publish(plan_with_stops(generation, &["A"])).await.unwrap();
        assert_eq!(applied, Applied::Current);

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, PlanPhase::Ready);
        assert_eq!(snapshot.plan.unwrap().stops.len(), 1);

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_superseded_generation_is_discarded() {
        let session = PlanSession::spawn();
        let first = session.begin().await.unwrap();
        let _second = session.begin().await.unwrap();

        let applied = session.publish(plan_with_stops(first, &["A"])).await.unwrap();
        assert_eq!(applied, Applied::Stale);

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, PlanPhase::Planning);
        assert!(snapshot.plan.is_none());

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_fail_records_message_and_clears_plan() {
        let session = PlanSession::spawn();
        let generation = session.begin().await.unwrap();

        session.fail(generation, "service unavailable").await.unwrap();

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(
            snapshot.phase,
            PlanPhase::Failed {
                message: "service unavailable".to_string()
            }
        );
        assert!(snapshot.plan.is_none());

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_image_transitions_loading_then_ready() {
        let session = PlanSession::spawn();
        let generation = session.begin().await.unwrap();
        let plan = plan_with_stops(generation, &["A"]);
        let stop_id = plan.stops[0].id;
        session.publish(plan).await.unwrap();

        assert_eq!(
            session.mark_loading(generation, stop_id).await.unwrap(),
            Applied::Current
        );
        let snapshot = session.snapshot().await.unwrap();
        assert!(snapshot.plan.unwrap().stops[0].image.is_loading());

        assert_eq!(
            session
                .set_image(generation, stop_id, "data:image/png;base64,aGVsbG8=")
                .await
                .unwrap(),
            Applied::Current
        );
        let snapshot = session.snapshot().await.unwrap();
        let image = &snapshot.plan.unwrap().stops[0].image;
        assert!(image.is_settled());
        assert_eq!(image.data_uri(), Some("data:image/png;base64,aGVsbG8="));

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_image_failure_settles_without_image() {
        let session = PlanSession::spawn();
        let generation = session.begin().await.unwrap();
        let plan = plan_with_stops(generation, &["A"]);
        let stop_id = plan.stops[0].id;
        session.publish(plan).await.unwrap();

        session.mark_loading(generation, stop_id).await.unwrap();
        session.mark_unavailable(generation, stop_id).await.unwrap();

        let snapshot = session.snapshot().await.unwrap();
        let image = &snapshot.plan.unwrap().stops[0].image;
        assert_eq!(*image, ImageState::Unavailable);

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_image_write_does_not_touch_new_plan() {
        let session = PlanSession::spawn();
        let first = session.begin().await.unwrap();
        let old_plan = plan_with_stops(first, &["A"]);
        let old_stop = old_plan.stops[0].id;
        session.publish(old_plan).await.unwrap();

        // Resubmission supersedes the first plan
        let second = session.begin().await.unwrap();
        let new_plan = plan_with_stops(second, &["A"]);
        session.publish(new_plan).await.unwrap();

        // A straggler task from the first enrichment batch writes back
        let applied = session
            .set_image(first, old_stop, "data:image/png;base64,c3RhbGU=")
            .await
            .unwrap();
        assert_eq!(applied, Applied::Stale);

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.generation, second);
        assert_eq!(snapshot.plan.unwrap().stops[0].image, ImageState::Pending);

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_stop_id_is_discarded() {
        let session = PlanSession::spawn();
        let generation = session.begin().await.unwrap();
        session.publish(plan_with_stops(generation, &["A"])).await.unwrap();

        let applied = session.mark_loading(generation, Uuid::now_v7()).await.unwrap();
        assert_eq!(applied, Applied::Stale);

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_events_emitted_for_applied_transitions_only() {
        let session = PlanSession::spawn();
        let mut events = session.subscribe();

        let first = session.begin().await.unwrap();
        let plan = plan_with_stops(first, &["A"]);
        let stop_id = plan.stops[0].id;
        session.publish(plan).await.unwrap();
        session.mark_loading(first, stop_id).await.unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::PlanStarted { generation } if generation == first
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::PlanReady { generation, stop_count: 1 } if generation == first
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::StopUpdated { generation, .. } if generation == first
        ));

        // A stale write emits nothing
        let second = session.begin().await.unwrap();
        session.mark_loading(first, stop_id).await.unwrap();
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::PlanStarted { generation } if generation == second
        ));
        assert!(events.try_recv().is_err());

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_snapshot_before_any_submission() {
        let session = PlanSession::spawn();

        let snapshot = session.snapshot().await.unwrap();
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.phase, PlanPhase::Idle);
        assert!(snapshot.plan.is_none());

        session.shutdown().await.unwrap();
    }
}
