//! Turning model JSON into an [`ItineraryBundle`].
//!
//! Normalization is total: any missing or mistyped field gets a default, and
//! the day list always has exactly one entry per trip day.

use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    core::request::ValidatedTrip,
    schema::CompletionSchema,
    schemas::schema_violations,
    types::{Activity, ActivityCategory, DayPlan, ItineraryBundle, ModelItinerary, TripPlan},
};

const PLACEHOLDER_TIME: &str = "09:00";
const PLACEHOLDER_DESCRIPTION: &str = "استكشاف المعالم السياحية الشهيرة";
const WEATHER_UNAVAILABLE: &str = "معلومات الطقس غير متوفرة";
const CULTURE_UNAVAILABLE: &str = "معلومات ثقافية غير متوفرة";
const PACKING_UNAVAILABLE: &str = "قائمة الأمتعة غير متوفرة";
const TRANSPORT_UNAVAILABLE: &str = "معلومات النقل غير متوفرة";

// Accepted spellings per field; the first is the one the prompt asks for.
const SUMMARY_KEYS: &[&str] = &["summary"];
const RECOMMENDATION_KEYS: &[&str] = &["recommendations"];
const DAY_KEYS: &[&str] = &["dailyPlan", "dayPlans", "days"];
const WEATHER_KEYS: &[&str] = &["weather", "weatherInfo"];
const CULTURE_KEYS: &[&str] = &["culturalTips", "culturalInfo"];
const PACKING_KEYS: &[&str] = &["packingList"];
const TRANSPORT_KEYS: &[&str] = &["transportation", "transportInfo"];

/// Normalize a parsed model payload for `trip`.
///
/// A non-object `payload` is treated as an empty object.
pub fn normalize_itinerary(payload: &Value, trip: &ValidatedTrip) -> ItineraryBundle {
    report_schema_deviations(payload);

    let empty = Map::new();
    let payload = payload.as_object().unwrap_or(&empty);

    for (name, keys) in [
        ("summary", SUMMARY_KEYS),
        ("recommendations", RECOMMENDATION_KEYS),
        ("dailyPlan", DAY_KEYS),
    ] {
        if lookup(payload, keys).is_none() {
            warn!(field = name, "model payload is missing an expected field");
        }
    }

    let summary = text_field(payload, SUMMARY_KEYS);
    let summary = if summary.trim().is_empty() {
        default_summary(trip)
    } else {
        summary
    };

    let raw_days: &[Value] = lookup(payload, DAY_KEYS)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let expected = trip.duration_days as usize;
    if raw_days.len() != expected {
        warn!(
            returned = raw_days.len(),
            expected, "model returned a different number of days; fitting to trip length"
        );
    }

    let day_plans = (0..expected)
        .map(|index| match raw_days.get(index) {
            Some(day) => DayPlan::new(trip.day_date(index), normalize_activities(day)),
            None => placeholder_day(trip, index),
        })
        .collect();

    ItineraryBundle {
        trip_plan: TripPlan::new(
            summary,
            trip.budget as f64,
            string_list(payload, RECOMMENDATION_KEYS),
            day_plans,
        ),
        weather_info: text_field(payload, WEATHER_KEYS),
        cultural_info: string_list(payload, CULTURE_KEYS),
        packing_list: string_list(payload, PACKING_KEYS),
        transport_info: string_list(payload, TRANSPORT_KEYS),
    }
}

/// Minimal bundle used when the model output cannot be parsed at all.
pub fn degraded_itinerary(trip: &ValidatedTrip) -> ItineraryBundle {
    let day_plans = (0..trip.duration_days as usize)
        .map(|index| placeholder_day(trip, index))
        .collect();

    ItineraryBundle {
        trip_plan: TripPlan::new(
            default_summary(trip),
            trip.budget as f64,
            vec![format!("استكشاف {}", trip.destination)],
            day_plans,
        ),
        weather_info: WEATHER_UNAVAILABLE.to_string(),
        cultural_info: vec![CULTURE_UNAVAILABLE.to_string()],
        packing_list: vec![PACKING_UNAVAILABLE.to_string()],
        transport_info: vec![TRANSPORT_UNAVAILABLE.to_string()],
    }
}

fn report_schema_deviations(payload: &Value) {
    let schema = ModelItinerary::schema();
    let violations = schema_violations(schema, payload);
    if !violations.is_empty() {
        warn!(
            schema = schema.schema_name(),
            violations = %violations.join("; "),
            "model payload deviates from schema; normalizing"
        );
    }
}

fn normalize_activities(day: &Value) -> Vec<Activity> {
    day.get("activities")
        .and_then(Value::as_array)
        .map(|activities| {
            activities
                .iter()
                .filter_map(Value::as_object)
                .map(normalize_activity)
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_activity(activity: &Map<String, Value>) -> Activity {
    let category = activity
        .get("type")
        .or_else(|| activity.get("category"))
        .and_then(Value::as_str)
        .and_then(ActivityCategory::from_label)
        .unwrap_or_default();

    Activity {
        title: text_field(activity, &["title"]),
        description: text_field(activity, &["description"]),
        time: text_field(activity, &["time"]),
        cost: activity
            .get("cost")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        category,
    }
}

fn placeholder_day(trip: &ValidatedTrip, index: usize) -> DayPlan {
    DayPlan::new(
        trip.day_date(index),
        vec![Activity {
            title: format!("استكشاف {}", trip.destination),
            description: PLACEHOLDER_DESCRIPTION.to_string(),
            time: PLACEHOLDER_TIME.to_string(),
            cost: 0.0,
            category: ActivityCategory::Tourism,
        }],
    )
}

fn default_summary(trip: &ValidatedTrip) -> String {
    format!("رحلة إلى {}", trip.destination)
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn text_field(object: &Map<String, Value>, keys: &[&str]) -> String {
    lookup(object, keys)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// String entries of an array field; other entries are dropped.
fn string_list(object: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    lookup(object, keys)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
