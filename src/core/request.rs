use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Longest trip the planner accepts.
pub const MAX_TRIP_DAYS: u32 = 30;

/// Trip type ids offered by the search form, with their display labels.
pub const KNOWN_TRIP_TYPES: [(&str, &str); 4] = [
    ("family", "عائلية"),
    ("cultural", "ثقافية"),
    ("adventure", "مغامرات"),
    ("relaxation", "استجمام"),
];

/// Search form input, as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub destination: String,
    /// Free text, e.g. `3500` or a `2000-5000` range
    pub budget: String,
    /// `YYYY-MM-DD` or RFC 3339
    pub start_date: String,
    pub end_date: String,
    pub travelers: u32,
    pub trip_type: String,
}

impl TripRequest {
    pub fn new(
        destination: impl Into<String>,
        budget: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            budget: budget.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            travelers: 1,
            trip_type: KNOWN_TRIP_TYPES[0].0.to_string(),
        }
    }

    pub fn with_travelers(mut self, travelers: u32) -> Self {
        self.travelers = travelers;
        self
    }

    pub fn with_trip_type(mut self, trip_type: impl Into<String>) -> Self {
        self.trip_type = trip_type.into();
        self
    }

    /// Check every field and derive the values the pipeline works with.
    pub fn validate(&self) -> Result<ValidatedTrip> {
        let required = [
            ("destination", &self.destination),
            ("budget", &self.budget),
            ("start date", &self.start_date),
            ("end date", &self.end_date),
            ("trip type", &self.trip_type),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(PlannerError::InvalidRequest(format!(
                "Please fill in all required fields ({field} is missing)"
            )));
        }

        if self.travelers == 0 {
            return Err(PlannerError::InvalidRequest(
                "At least one traveler is required".to_string(),
            ));
        }

        let start = parse_trip_date(&self.start_date)?;
        let end = parse_trip_date(&self.end_date)?;
        if end < start {
            return Err(PlannerError::InvalidRequest(
                "End date must not be before the start date".to_string(),
            ));
        }

        let duration_days = trip_duration_days(start.naive_utc(), end.naive_utc());
        if duration_days > MAX_TRIP_DAYS {
            return Err(PlannerError::InvalidRequest(format!(
                "Trips are limited to {MAX_TRIP_DAYS} days ({duration_days} requested)"
            )));
        }

        Ok(ValidatedTrip {
            destination: self.destination.trim().to_string(),
            budget: parse_budget(&self.budget)?,
            // The calendar day as the user wrote it, not the UTC day
            start_date: start.date_naive(),
            duration_days,
            travelers: self.travelers,
            trip_type: self.trip_type.trim().to_string(),
        })
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTrip {
    pub destination: String,
    pub budget: u64,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub travelers: u32,
    pub trip_type: String,
}

impl ValidatedTrip {
    /// Calendar date of the zero-based `index`-th trip day.
    pub fn day_date(&self, index: usize) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(index as u64))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Parse the budget field.
///
/// For a `low-high` range the digits after the dash are the budget;
/// otherwise all digits of the value are. Either way it must be positive.
pub fn parse_budget(raw: &str) -> Result<u64> {
    let invalid = || PlannerError::InvalidRequest(format!("Please enter a valid budget ('{raw}')"));

    let source = match raw.split_once('-') {
        Some((_, upper)) if upper.chars().any(|c| c.is_ascii_digit()) => upper,
        _ => raw,
    };

    match digits_value(source) {
        Some(0) | None => Err(invalid()),
        Some(value) => Ok(value),
    }
}

/// Whole days between two instants, rounded up.
pub fn trip_duration_days(start: NaiveDateTime, end: NaiveDateTime) -> u32 {
    let seconds = (end - start).num_seconds().max(0);
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Plain dates are taken as midnight UTC; RFC 3339 keeps its own offset.
fn parse_trip_date(raw: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()).and_utc().fixed_offset());
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant);
    }

    Err(PlannerError::InvalidRequest(format!(
        "Please enter valid dates ('{raw}' is not a date)"
    )))
}

/// `None` when there are no digits or the number overflows.
fn digits_value(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TripRequest {
        TripRequest::new("Riyadh", "2000-5000", "2025-01-01", "2025-01-04").with_travelers(2)
    }

    #[test]
    fn test_budget_parsing() {
        assert_eq!(parse_budget("2000-5000").unwrap(), 5000);
        assert_eq!(parse_budget("3500").unwrap(), 3500);
        assert_eq!(parse_budget("3,500 SAR").unwrap(), 3500);
        assert_eq!(parse_budget("5000-").unwrap(), 5000);
        assert!(parse_budget("abc").is_err());
        assert!(parse_budget("0").is_err());
        assert!(parse_budget("1000-0").is_err());
        assert_eq!(
            parse_budget("1000000000000-2000000000000").unwrap(),
            2_000_000_000_000
        );
        assert_eq!(parse_budget("3000-five thousand").unwrap(), 3000);
    }

    #[test]
    fn test_duration_from_dates() {
        let trip = request().validate().unwrap();
        assert_eq!(trip.duration_days, 3);
        assert_eq!(trip.budget, 5000);
        assert_eq!(trip.day_date(2), NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
    }

    #[test]
    fn test_partial_days_round_up() {
        let trip = TripRequest::new(
            "Jeddah",
            "1500",
            "2025-05-01T08:00:00Z",
            "2025-05-03T09:30:00Z",
        )
        .validate()
        .unwrap();
        assert_eq!(trip.duration_days, 3);
        assert_eq!(trip.start_date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    }

    #[test]
    fn test_offset_dates_keep_local_calendar_day() {
        let trip = TripRequest::new(
            "Jeddah",
            "1500",
            "2025-05-01T01:00:00+05:00",
            "2025-05-03T01:00:00+05:00",
        )
        .validate()
        .unwrap();
        assert_eq!(trip.start_date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(trip.duration_days, 2);
        assert_eq!(trip.day_date(1), NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
    }

    #[test]
    fn test_trip_length_is_capped() {
        let err = TripRequest::new("Abha", "800", "2025-01-01", "9999-12-31")
            .validate()
            .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidRequest(ref message) if message.contains("30 days")));

        let longest = TripRequest::new("Abha", "800", "2025-01-01", "2025-01-31")
            .validate()
            .unwrap();
        assert_eq!(longest.duration_days, MAX_TRIP_DAYS);
    }

    #[test]
    fn test_same_day_trip_has_zero_days() {
        let trip = TripRequest::new("Abha", "800", "2025-06-01", "2025-06-01")
            .validate()
            .unwrap();
        assert_eq!(trip.duration_days, 0);
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = TripRequest::new("", "1000", "2025-01-01", "2025-01-02")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("destination"));

        let err = TripRequest::new("Taif", "1000", "2025-01-05", "2025-01-02")
            .validate()
            .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidRequest(_)));

        assert!(TripRequest::new("Taif", "1000", "next week", "2025-01-02")
            .validate()
            .is_err());
        assert!(request().with_travelers(0).validate().is_err());
        assert!(request().with_trip_type("  ").validate().is_err());
    }
}
