use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::overview::ItineraryOverview;

/// Activity categories the model is asked to choose from.
///
/// Serialized with the Arabic names used in the prompt and by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityCategory {
    #[default]
    #[serde(rename = "سياحة")]
    Tourism,
    #[serde(rename = "تسوق")]
    Shopping,
    #[serde(rename = "طعام")]
    Food,
    #[serde(rename = "ترفيه")]
    Entertainment,
    #[serde(rename = "ثقافة")]
    Culture,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 5] = [
        ActivityCategory::Tourism,
        ActivityCategory::Shopping,
        ActivityCategory::Food,
        ActivityCategory::Entertainment,
        ActivityCategory::Culture,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ActivityCategory::Tourism => "سياحة",
            ActivityCategory::Shopping => "تسوق",
            ActivityCategory::Food => "طعام",
            ActivityCategory::Entertainment => "ترفيه",
            ActivityCategory::Culture => "ثقافة",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            ActivityCategory::Tourism => "tourism",
            ActivityCategory::Shopping => "shopping",
            ActivityCategory::Food => "food",
            ActivityCategory::Entertainment => "entertainment",
            ActivityCategory::Culture => "culture",
        }
    }

    /// Match an Arabic label or English name; anything else is `None`.
    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|category| {
            category.label() == value || category.english_name().eq_ignore_ascii_case(value)
        })
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub description: String,
    /// Time-of-day label as written by the model, usually `HH:MM`
    pub time: String,
    pub cost: f64,
    #[serde(rename = "type")]
    pub category: ActivityCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
    /// Always the sum of `activities[].cost`
    pub total_cost: f64,
}

impl DayPlan {
    pub fn new(date: NaiveDate, activities: Vec<Activity>) -> Self {
        let total_cost = activities.iter().map(|activity| activity.cost).sum();
        Self {
            date,
            activities,
            total_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub summary: String,
    pub total_budget: f64,
    /// `total_budget` minus the planned spend; negative when over budget
    pub remaining_budget: f64,
    pub recommendations: Vec<String>,
    pub day_plans: Vec<DayPlan>,
}

impl TripPlan {
    pub fn new(
        summary: String,
        total_budget: f64,
        recommendations: Vec<String>,
        day_plans: Vec<DayPlan>,
    ) -> Self {
        let planned: f64 = day_plans.iter().map(|day| day.total_cost).sum();
        Self {
            summary,
            total_budget,
            remaining_budget: total_budget - planned,
            recommendations,
            day_plans,
        }
    }

    pub fn planned_spend(&self) -> f64 {
        self.day_plans.iter().map(|day| day.total_cost).sum()
    }
}

/// Everything the UI renders for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryBundle {
    pub trip_plan: TripPlan,
    pub weather_info: String,
    pub cultural_info: Vec<String>,
    pub packing_list: Vec<String>,
    pub transport_info: Vec<String>,
}

impl ItineraryBundle {
    pub fn day_count(&self) -> usize {
        self.trip_plan.day_plans.len()
    }

    pub fn overview(&self) -> ItineraryOverview {
        ItineraryOverview::from_bundle(self)
    }

    /// Plain-text rendering for terminals and logs.
    pub fn render(&self) -> String {
        let overview = self.overview();
        let plan = &self.trip_plan;
        let mut lines = Vec::new();

        lines.push(format!("=== {} ===", overview.headline));
        lines.push(plan.summary.clone());
        lines.push(format!(
            "Budget: {:.0} | Planned: {:.0} | Remaining: {:.0}",
            plan.total_budget, overview.planned_spend, plan.remaining_budget
        ));

        push_section(&mut lines, "Recommendations", &plan.recommendations);

        if !self.weather_info.is_empty() {
            lines.push(String::new());
            lines.push("Weather:".to_string());
            lines.push(format!("  {}", self.weather_info));
        }

        for day in &overview.days {
            lines.push(String::new());
            lines.push(format!(
                "Day {} - {} (total {:.0})",
                day.day_number, day.date, day.total_cost
            ));
            for entry in &day.entries {
                lines.push(format!(
                    "  [{}] {} {} ({}, {:.0})",
                    entry.slot.label(),
                    entry.time,
                    entry.title,
                    entry.category,
                    entry.cost
                ));
                if !entry.description.is_empty() {
                    lines.push(format!("      {}", entry.description));
                }
            }
        }

        if !overview.cost_breakdown.is_empty() {
            lines.push(String::new());
            lines.push("Cost breakdown:".to_string());
            for share in &overview.cost_breakdown {
                lines.push(format!(
                    "  {}: {:.0} ({:.0}%)",
                    share.category,
                    share.amount,
                    share.share * 100.0
                ));
            }
        }

        push_section(&mut lines, "Cultural tips", &self.cultural_info);
        push_section(&mut lines, "Packing list", &self.packing_list);
        push_section(&mut lines, "Transportation", &self.transport_info);

        lines.join("\n")
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(format!("{title}:"));
    lines.extend(items.iter().map(|item| format!("  - {item}")));
}
