use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Top-level keys of the itinerary payload; used to recognise wrapper objects.
const ITINERARY_KEYS: [&str; 7] = [
    "summary",
    "recommendations",
    "dailyPlan",
    "weather",
    "culturalTips",
    "packingList",
    "transportation",
];

const WRAPPER_TEXT_KEYS: [&str; 2] = ["text", "generated_text"];

/// Why model text could not be turned into an itinerary object.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("model output is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("model output is JSON but not an object")]
    NotAnObject,
}

fn json_span() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("JSON span pattern is valid"))
}

/// Outermost `{...}` span of `text`, or all of `text` when there is none.
pub fn extract_json_candidate(text: &str) -> &str {
    json_span()
        .find(text)
        .map(|found| found.as_str())
        .unwrap_or(text)
}

/// First brace-balanced object in `text`, skipping braces inside strings.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Turn raw model text into the itinerary JSON object.
///
/// Tries the outermost brace span first, then the first balanced object.
/// A wrapper object carrying the real payload in `text`/`generated_text` is
/// unwrapped once.
pub fn parse_model_payload(text: &str) -> Result<Map<String, Value>, PayloadError> {
    parse_with_unwrap(text, true)
}

fn parse_with_unwrap(text: &str, allow_unwrap: bool) -> Result<Map<String, Value>, PayloadError> {
    let candidate = extract_json_candidate(text);
    debug!(candidate_len = candidate.len(), "extracted JSON candidate");

    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(err) => match first_balanced_object(text).filter(|span| *span != candidate) {
            Some(span) => {
                debug!(error = %err, "outer span did not parse, trying first balanced object");
                serde_json::from_str::<Value>(span)?
            }
            None => return Err(err.into()),
        },
    };

    let Value::Object(object) = value else {
        return Err(PayloadError::NotAnObject);
    };

    if allow_unwrap && !ITINERARY_KEYS.iter().any(|key| object.contains_key(*key)) {
        let inner = WRAPPER_TEXT_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str));
        if let Some(inner) = inner {
            debug!("unwrapping text field of wrapper object");
            return parse_with_unwrap(inner, false);
        }
    }

    Ok(object)
}
