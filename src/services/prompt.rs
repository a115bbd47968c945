use crate::{core::request::ValidatedTrip, types::ModelItinerary, ActivityCategory};

/// Build the itinerary prompt for a validated trip.
pub fn compose_trip_prompt(trip: &ValidatedTrip, currency: &str, language: &str) -> String {
    let skeleton = serde_json::to_string_pretty(&ModelItinerary::prompt_skeleton(language))
        .unwrap_or_default();

    let categories: Vec<&str> = ActivityCategory::ALL
        .iter()
        .map(|category| category.label())
        .collect();

    format!(
        "You are a travel planning assistant. Create a detailed travel plan for a {days}-day trip to {destination} for {travelers} travelers with a budget of {budget} {currency}. Trip type: {trip_type}.\n\n\
         Provide the response in the following JSON format (do not include any text before or after the JSON, and ensure all text is in {language}):\n\n\
         {skeleton}\n\n\
         The \"dailyPlan\" array must contain exactly {days} entries, one per day. \
         Every activity \"type\" must be one of: {categories}. \
         Every \"cost\" must be a number in {currency}.",
        days = trip.duration_days,
        destination = trip.destination,
        travelers = trip.travelers,
        budget = trip.budget,
        currency = currency,
        trip_type = trip.trip_type,
        language = language,
        skeleton = skeleton,
        categories = categories.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TripRequest;

    #[test]
    fn test_prompt_embeds_trip_parameters() {
        let trip = TripRequest::new("العلا", "2000-5000", "2025-01-01", "2025-01-04")
            .with_travelers(4)
            .with_trip_type("cultural")
            .validate()
            .unwrap();

        let prompt = compose_trip_prompt(&trip, "SAR", "Arabic");

        assert!(prompt.contains("3-day trip to العلا"));
        assert!(prompt.contains("for 4 travelers"));
        assert!(prompt.contains("budget of 5000 SAR"));
        assert!(prompt.contains("Trip type: cultural"));
        assert!(prompt.contains("all text is in Arabic"));
        assert!(prompt.contains("\"dailyPlan\""));
        assert!(prompt.contains("exactly 3 entries"));
        assert!(prompt.contains("طعام"));
    }
}
