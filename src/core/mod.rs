pub mod planner;
pub mod request;
pub mod session;

pub use planner::{PlanOutcome, TripPlanner};
pub use request::{
    parse_budget, trip_duration_days, TripRequest, ValidatedTrip, KNOWN_TRIP_TYPES, MAX_TRIP_DAYS,
};
pub use session::{RequestToken, SearchOutcome, SearchSession, SearchState};
