//! trip-planner-rs: travel itinerary generation on top of generative text models
//!
//! A [`TripRequest`] is validated, turned into a prompt, and sent to a
//! [`TextModel`] backend (Gemini, Hugging Face, or any OpenAI-compatible
//! endpoint). The reply is parsed, normalized to the trip length, and returned
//! as an [`ItineraryBundle`]. Transient failures are retried with a fixed delay.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_planner::{TripPlanner, TripRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let planner = TripPlanner::from_env()?;
//!     let request = TripRequest::new("Riyadh", "5000", "2025-03-01", "2025-03-04");
//!
//!     let bundle = planner.generate_trip_plan(&request).await?;
//!     println!("{}", bundle.render());
//!     Ok(())
//! }
//! ```

extern crate self as trip_planner;

pub mod config;
pub mod core;
pub mod error;
pub mod providers;
pub mod schemas;
pub mod services;
pub mod types;

pub use config::{PlannerConfig, ProviderKind, RetryPolicy, SamplingParams};
pub use crate::core::{
    parse_budget, trip_duration_days, PlanOutcome, RequestToken, SearchOutcome, SearchSession,
    SearchState, TripPlanner, TripRequest, ValidatedTrip,
};
pub use error::{PlannerError, Result};
pub use providers::{create_model, TextModel};
pub use schemas::{CompletionSchema, SchemaHandle};
pub use tripplanner_macros::completion_schema;
pub use types::{
    Activity, ActivityCategory, DayPlan, ItineraryBundle, ItineraryOverview, ModelItinerary,
    TimeSlot, TripPlan,
};

pub use schemas as schema;

#[cfg(feature = "cli")]
pub mod cli;
