//! Trip planning: domain types, session state, and orchestration

mod orchestrator;
mod plan;
mod session;

pub use orchestrator::{PlanError, Planner};
pub use plan::{ImageState, LocationEntry, QueryError, TripPlan, TripQuery};
pub use session::{Applied, PlanPhase, PlanSession, SessionError, SessionEvent, SessionSnapshot};
