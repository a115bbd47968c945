pub mod itinerary;
pub mod model_payload;
pub mod overview;

pub use itinerary::{Activity, ActivityCategory, DayPlan, ItineraryBundle, TripPlan};
pub use model_payload::{ModelActivity, ModelDay, ModelItinerary};
pub use overview::{CostShare, DayTimeline, ItineraryOverview, TimeSlot, TimelineEntry};
