use crate::completion_schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::itinerary::ActivityCategory;

/// Travel plan the model is asked to produce, in the requested language.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[completion_schema(name = "trip_itinerary")]
pub struct ModelItinerary {
    /// A brief summary of the trip
    pub summary: String,
    /// Practical recommendations for the traveler
    pub recommendations: Vec<String>,
    /// One entry per trip day, in order
    #[serde(rename = "dailyPlan")]
    pub daily_plan: Vec<ModelDay>,
    /// Expected weather during the trip
    pub weather: String,
    /// Local customs and etiquette worth knowing
    #[serde(rename = "culturalTips")]
    pub cultural_tips: Vec<String>,
    /// Items to bring
    #[serde(rename = "packingList")]
    pub packing_list: Vec<String>,
    /// Getting there and getting around
    pub transportation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelDay {
    pub activities: Vec<ModelActivity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelActivity {
    pub title: String,
    pub description: String,
    /// 24-hour `HH:MM` start time
    pub time: String,
    /// Estimated cost in the trip currency
    pub cost: f64,
    /// One of the activity category labels
    #[serde(rename = "type")]
    pub category: String,
}

impl ModelItinerary {
    /// Skeleton embedded in the prompt to show the expected shape.
    pub fn prompt_skeleton(language: &str) -> Self {
        let text = |what: &str| format!("{what} in {language}");
        Self {
            summary: text("A brief summary of the trip"),
            recommendations: vec![text("recommendation 1"), text("recommendation 2")],
            daily_plan: vec![ModelDay {
                activities: vec![ModelActivity {
                    title: text("Activity title"),
                    description: text("Activity description"),
                    time: "09:00".to_string(),
                    cost: 100.0,
                    category: ActivityCategory::Tourism.label().to_string(),
                }],
            }],
            weather: text("Weather information"),
            cultural_tips: vec![text("Cultural tip 1"), text("Cultural tip 2")],
            packing_list: vec![text("Packing item 1"), text("Packing item 2")],
            transportation: vec![text("Transportation info 1"), text("Transportation info 2")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CompletionSchema;

    #[test]
    fn test_schema_uses_wire_names() {
        let schema = ModelItinerary::schema();
        assert_eq!(schema.schema_name(), "trip_itinerary");

        let properties = &schema.schema_json()["properties"];
        assert!(properties.get("dailyPlan").is_some());
        assert!(properties.get("culturalTips").is_some());
        assert!(properties.get("daily_plan").is_none());
        assert_eq!(
            properties["summary"]["description"],
            "A brief summary of the trip"
        );
    }

    #[test]
    fn test_skeleton_serializes_in_prompt_order() {
        let skeleton = serde_json::to_string(&ModelItinerary::prompt_skeleton("Arabic")).unwrap();
        let summary_at = skeleton.find("\"summary\"").unwrap();
        let transport_at = skeleton.find("\"transportation\"").unwrap();
        assert!(summary_at < transport_at);
        assert!(skeleton.contains("\"type\":\"سياحة\""));
        assert!(skeleton.contains("in Arabic"));
    }
}
