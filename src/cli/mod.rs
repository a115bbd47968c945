use crate::{
    core::KNOWN_TRIP_TYPES, PlannerConfig, PlannerError, ProviderKind, TripPlanner, TripRequest,
};
use chrono::{Days, NaiveDate};
use clap::{Arg, ArgAction, Command};
use dotenvy;
use std::time::Duration;
use tracing::{error, info};

/// CLI entry point for the trip-planner tool
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = Command::new("trip-planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate a day-by-day travel itinerary with a generative model")
        .arg(
            Arg::new("destination")
                .help("Where the trip goes")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("budget")
                .short('b')
                .long("budget")
                .value_name("AMOUNT")
                .help("Total budget, e.g. 5000 or 2000-5000")
                .required(true),
        )
        .arg(
            Arg::new("start-date")
                .short('s')
                .long("start-date")
                .value_name("YYYY-MM-DD")
                .help("First day of the trip")
                .required(true),
        )
        .arg(
            Arg::new("end-date")
                .short('e')
                .long("end-date")
                .value_name("YYYY-MM-DD")
                .help("Last day of the trip")
                .conflicts_with("duration"),
        )
        .arg(
            Arg::new("duration")
                .short('d')
                .long("duration")
                .value_name("DAYS")
                .help("Trip length in days when no end date is given")
                .default_value("3"),
        )
        .arg(
            Arg::new("travelers")
                .short('n')
                .long("travelers")
                .value_name("COUNT")
                .help("Number of travelers")
                .default_value("1"),
        )
        .arg(
            Arg::new("trip-type")
                .long("trip-type")
                .value_name("TYPE")
                .help(trip_type_help())
                .default_value(KNOWN_TRIP_TYPES[0].0),
        )
        .arg(
            Arg::new("provider")
                .short('p')
                .long("provider")
                .value_name("PROVIDER")
                .help("gemini, huggingface or openai (or set TRIP_PLANNER_PROVIDER)"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Model id (or set TRIP_PLANNER_MODEL)"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("API key (or set the provider's key variable)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Endpoint base URL (or set TRIP_PLANNER_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Per-attempt timeout in seconds"),
        )
        .arg(
            Arg::new("no-structured-output")
                .long("no-structured-output")
                .help("Do not send the JSON schema to OpenAI-compatible endpoints (or set TRIP_PLANNER_STRUCTURED_OUTPUT=false)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the itinerary bundle as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = PlannerConfig::from_env()?;

    if let Some(provider) = matches.get_one::<String>("provider") {
        let provider: ProviderKind = provider.parse()?;
        if provider != config.provider {
            // Re-resolve defaults and the key variable for the newly chosen backend
            config = PlannerConfig {
                retry: config.retry,
                structured_output: config.structured_output,
                ..PlannerConfig::new(provider)
            };
            config.api_key = std::env::var(provider.api_key_var()).ok();
        }
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config = config.with_model(model);
    }
    if let Some(api_key) = matches.get_one::<String>("api-key") {
        config = config.with_api_key(api_key);
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url);
    }
    if matches.get_flag("no-structured-output") {
        config = config.with_structured_output(false);
    }
    if let Some(timeout) = matches.get_one::<String>("timeout") {
        let seconds: u64 = timeout
            .parse()
            .map_err(|_| PlannerError::Config(format!("Invalid timeout '{timeout}'")))?;
        config = config.with_timeout(Duration::from_secs(seconds));
    }

    let destination = required(&matches, "destination")?;
    let start_date = required(&matches, "start-date")?;
    let end_date = match matches.get_one::<String>("end-date") {
        Some(end_date) => end_date.clone(),
        None => end_from_duration(&start_date, &required(&matches, "duration")?)?,
    };
    let travelers: u32 = required(&matches, "travelers")?
        .parse()
        .map_err(|_| PlannerError::InvalidRequest("travelers must be a number".to_string()))?;

    let request = TripRequest::new(
        destination,
        required(&matches, "budget")?,
        start_date,
        end_date,
    )
    .with_travelers(travelers)
    .with_trip_type(required(&matches, "trip-type")?);

    let planner = TripPlanner::new(config)?;
    info!(
        "Planning trip to {} with model backend {}",
        request.destination,
        planner.model_name()
    );

    match planner.generate_with_report(&request).await {
        Ok(outcome) => {
            if matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&outcome.bundle)?);
            } else {
                println!("\n{}", outcome.bundle.render());
            }
            info!(
                attempts = outcome.attempts,
                degraded = outcome.degraded,
                elapsed_ms = outcome.elapsed.as_millis() as u64,
                "Trip planning completed"
            );
        }
        Err(e) => {
            error!("Trip planning failed: {}", e);
            eprintln!("{}", serde_json::to_string_pretty(&e.to_error_payload())?);
            return Err(e.into());
        }
    }

    Ok(())
}

/// `family (عائلية), cultural (ثقافية), ...`
fn trip_type_help() -> String {
    let types: Vec<String> = KNOWN_TRIP_TYPES
        .iter()
        .map(|(id, label)| format!("{id} ({label})"))
        .collect();
    format!("Trip type: {}", types.join(", "))
}

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String, PlannerError> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| PlannerError::InvalidRequest(format!("{name} is required")))
}

/// An N-day trip ends N days after it starts.
fn end_from_duration(start_date: &str, duration: &str) -> Result<String, PlannerError> {
    let days: u64 = duration
        .parse()
        .ok()
        .filter(|days| *days > 0)
        .ok_or_else(|| {
            PlannerError::InvalidRequest(format!("duration must be a positive number, got '{duration}'"))
        })?;
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").map_err(|_| {
        PlannerError::InvalidRequest(format!("start date '{start_date}' is not YYYY-MM-DD"))
    })?;
    let end = start
        .checked_add_days(Days::new(days))
        .ok_or_else(|| PlannerError::InvalidRequest("trip ends too far in the future".to_string()))?;
    Ok(end.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_type_help_lists_labels() {
        let help = trip_type_help();
        assert!(help.contains("family (عائلية)"));
        assert!(help.contains("relaxation (استجمام)"));
    }

    #[test]
    fn test_end_from_duration() {
        assert_eq!(end_from_duration("2025-03-01", "3").unwrap(), "2025-03-04");
        assert_eq!(end_from_duration("2025-03-01", "1").unwrap(), "2025-03-02");
        assert!(end_from_duration("2025-03-01", "0").is_err());
        assert!(end_from_duration("March 1st", "3").is_err());
    }
}
