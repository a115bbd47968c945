use chrono::NaiveDate;
use serde::Serialize;

use super::itinerary::{ActivityCategory, ItineraryBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "صباحاً",
            TimeSlot::Afternoon => "ظهراً",
            TimeSlot::Evening => "مساءً",
        }
    }

    /// Reads the hour out of labels like `09:00`, `9:30`, `7:15 PM` or `14`.
    pub fn from_time_label(time: &str) -> Option<Self> {
        let trimmed = time.trim();
        let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
        let mut hour: u32 = digits.parse().ok()?;
        if hour > 23 {
            return None;
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper.ends_with("PM") && hour < 12 {
            hour += 12;
        } else if upper.ends_with("AM") && hour == 12 {
            hour = 0;
        }

        Some(match hour {
            0..=11 => TimeSlot::Morning,
            12..=16 => TimeSlot::Afternoon,
            _ => TimeSlot::Evening,
        })
    }

    /// Fallback when the time label carries no hour.
    pub fn from_category(category: ActivityCategory) -> Self {
        match category {
            ActivityCategory::Food => TimeSlot::Morning,
            ActivityCategory::Tourism => TimeSlot::Afternoon,
            _ => TimeSlot::Evening,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub time: String,
    pub slot: TimeSlot,
    pub title: String,
    pub description: String,
    pub cost: f64,
    pub category: ActivityCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayTimeline {
    /// 1-based
    pub day_number: usize,
    pub date: NaiveDate,
    pub entries: Vec<TimelineEntry>,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostShare {
    pub category: ActivityCategory,
    pub amount: f64,
    /// Fraction of the planned spend, between 0 and 1
    pub share: f64,
}

/// Render-ready view of an [`ItineraryBundle`].
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryOverview {
    /// First line of the summary
    pub headline: String,
    pub total_days: usize,
    pub total_budget: f64,
    pub planned_spend: f64,
    pub remaining_budget: f64,
    pub days: Vec<DayTimeline>,
    /// Non-zero categories, in [`ActivityCategory::ALL`] order
    pub cost_breakdown: Vec<CostShare>,
}

impl ItineraryOverview {
    pub fn from_bundle(bundle: &ItineraryBundle) -> Self {
        let plan = &bundle.trip_plan;

        let days: Vec<DayTimeline> = plan
            .day_plans
            .iter()
            .enumerate()
            .map(|(index, day)| DayTimeline {
                day_number: index + 1,
                date: day.date,
                entries: day
                    .activities
                    .iter()
                    .map(|activity| TimelineEntry {
                        time: activity.time.clone(),
                        slot: TimeSlot::from_time_label(&activity.time)
                            .unwrap_or_else(|| TimeSlot::from_category(activity.category)),
                        title: activity.title.clone(),
                        description: activity.description.clone(),
                        cost: activity.cost,
                        category: activity.category,
                    })
                    .collect(),
                total_cost: day.total_cost,
            })
            .collect();

        let planned_spend = plan.planned_spend();
        let cost_breakdown = ActivityCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let amount: f64 = plan
                    .day_plans
                    .iter()
                    .flat_map(|day| &day.activities)
                    .filter(|activity| activity.category == category)
                    .map(|activity| activity.cost)
                    .sum();
                if amount == 0.0 {
                    return None;
                }
                let share = if planned_spend > 0.0 {
                    amount / planned_spend
                } else {
                    0.0
                };
                Some(CostShare {
                    category,
                    amount,
                    share,
                })
            })
            .collect();

        let headline = plan
            .summary
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("وجهة غير محددة")
            .to_string();

        Self {
            headline,
            total_days: days.len(),
            total_budget: plan.total_budget,
            planned_spend,
            remaining_budget: plan.remaining_budget,
            days,
            cost_breakdown,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining_budget < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::itinerary::{Activity, DayPlan, TripPlan};

    fn activity(time: &str, cost: f64, category: ActivityCategory) -> Activity {
        Activity {
            title: "title".to_string(),
            description: String::new(),
            time: time.to_string(),
            cost,
            category,
        }
    }

    #[test]
    fn test_time_slots() {
        assert_eq!(TimeSlot::from_time_label("09:00"), Some(TimeSlot::Morning));
        assert_eq!(TimeSlot::from_time_label("13:30"), Some(TimeSlot::Afternoon));
        assert_eq!(TimeSlot::from_time_label("7:15 PM"), Some(TimeSlot::Evening));
        assert_eq!(TimeSlot::from_time_label("12 AM"), Some(TimeSlot::Morning));
        assert_eq!(TimeSlot::from_time_label("مساءً"), None);
        assert_eq!(TimeSlot::from_time_label("99:00"), None);
        assert_eq!(
            TimeSlot::from_category(ActivityCategory::Food),
            TimeSlot::Morning
        );
    }

    #[test]
    fn test_overview_breakdown() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let bundle = ItineraryBundle {
            trip_plan: TripPlan::new(
                "\nجولة في الرياض\nتفاصيل".to_string(),
                400.0,
                Vec::new(),
                vec![
                    DayPlan::new(
                        start,
                        vec![
                            activity("09:00", 100.0, ActivityCategory::Food),
                            activity("", 300.0, ActivityCategory::Shopping),
                        ],
                    ),
                    DayPlan::new(
                        start.succ_opt().unwrap(),
                        vec![activity("20:00", 100.0, ActivityCategory::Food)],
                    ),
                ],
            ),
            weather_info: String::new(),
            cultural_info: Vec::new(),
            packing_list: Vec::new(),
            transport_info: Vec::new(),
        };

        let overview = ItineraryOverview::from_bundle(&bundle);
        assert_eq!(overview.headline, "جولة في الرياض");
        assert_eq!(overview.total_days, 2);
        assert_eq!(overview.planned_spend, 500.0);
        assert!(overview.is_over_budget());

        assert_eq!(overview.days[0].entries[1].slot, TimeSlot::Evening);
        assert_eq!(overview.days[1].day_number, 2);

        let categories: Vec<_> = overview
            .cost_breakdown
            .iter()
            .map(|share| share.category)
            .collect();
        assert_eq!(
            categories,
            vec![ActivityCategory::Shopping, ActivityCategory::Food]
        );
        assert!((overview.cost_breakdown[1].share - 0.4).abs() < 1e-9);
    }
}
