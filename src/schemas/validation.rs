use crate::schemas::SchemaHandle;
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// List how `payload` deviates from `schema`, capped at a few entries.
///
/// Model output is normalized no matter what, so deviations are reported as
/// diagnostics and never as errors.
pub fn schema_violations(schema: &SchemaHandle, payload: &Value) -> Vec<String> {
    let validator = match schema.validator() {
        Ok(validator) => validator,
        Err(reason) => {
            return vec![format!(
                "`{}` schema could not be compiled: {}",
                schema.schema_name(),
                reason
            )]
        }
    };

    let Err(errors) = validator.validate(payload) else {
        return Vec::new();
    };

    let mut details = Vec::new();
    for (idx, error) in errors.enumerate() {
        if idx == MAX_SCHEMA_ERRORS {
            details.push("additional errors truncated".to_string());
            break;
        }
        let mut path = error.instance_path.to_string();
        if path.is_empty() {
            path = "<root>".to_string();
        }
        details.push(format!("{}: {}", path, error));
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schema::CompletionSchema, types::ModelItinerary};
    use serde_json::json;

    #[test]
    fn test_complete_payload_has_no_violations() {
        let payload = serde_json::to_value(ModelItinerary::prompt_skeleton("Arabic")).unwrap();
        assert!(schema_violations(ModelItinerary::schema(), &payload).is_empty());
    }

    #[test]
    fn test_violations_are_capped() {
        let payload = json!({ "dailyPlan": "tomorrow" });
        let violations = schema_violations(ModelItinerary::schema(), &payload);
        assert_eq!(violations.len(), MAX_SCHEMA_ERRORS + 1);
        assert_eq!(violations.last().unwrap(), "additional errors truncated");
    }

    #[test]
    fn test_uncompilable_schema_is_reported() {
        let root: schemars::schema::RootSchema =
            serde_json::from_value(json!({ "type": "string", "pattern": "(unclosed" })).unwrap();
        let handle = SchemaHandle::from_root_schema("broken", "Broken", root);
        assert!(handle.validator().is_err());

        let violations = schema_violations(&handle, &json!({}));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("`broken` schema could not be compiled"));
    }

    #[test]
    fn test_violation_names_path() {
        let mut payload = serde_json::to_value(ModelItinerary::prompt_skeleton("Arabic")).unwrap();
        payload["dailyPlan"][0]["activities"][0]["cost"] = json!("free");
        let violations = schema_violations(ModelItinerary::schema(), &payload);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("/dailyPlan/0/activities/0/cost"));
    }
}
