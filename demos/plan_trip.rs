use std::sync::Arc;

use trip_planner::{SearchOutcome, SearchSession, TripPlanner, TripRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::try_init().ok();

    // Provider and key come from TRIP_PLANNER_PROVIDER / GEMINI_API_KEY etc.
    let planner = Arc::new(TripPlanner::from_env()?);
    let session = SearchSession::new(planner.clone());

    println!("=== Trip Planner ({}) ===\n", planner.model_name());

    let request = TripRequest::new("Jeddah", "4000-6000", "2025-03-01", "2025-03-04")
        .with_travelers(2)
        .with_trip_type("cultural");

    let bundle = match session.search(&request).await {
        SearchOutcome::Applied(bundle) => bundle,
        SearchOutcome::Failed(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err.to_error_payload())?);
            return Err(err.into());
        }
        SearchOutcome::Superseded(token) => {
            eprintln!("search {} was superseded", token.value());
            return Ok(());
        }
    };

    println!("{}", bundle.render());

    let overview = bundle.overview();
    println!("\n--- Overview ---");
    println!("{}", overview.headline);
    println!(
        "Budget: {:.0}  Planned: {:.0}  Remaining: {:.0}",
        overview.total_budget, overview.planned_spend, overview.remaining_budget
    );
    if overview.is_over_budget() {
        println!("Warning: the plan exceeds the budget");
    }

    for day in &overview.days {
        println!("\nDay {} ({}) - {:.0}", day.day_number, day.date, day.total_cost);
        for entry in &day.entries {
            println!(
                "  [{}] {} {} ({:.0})",
                entry.slot.label(),
                entry.time,
                entry.title,
                entry.cost
            );
        }
    }

    println!("\nCost breakdown:");
    for share in &overview.cost_breakdown {
        println!(
            "  {}: {:.0} ({:.0}%)",
            share.category.label(),
            share.amount,
            share.share * 100.0
        );
    }

    Ok(())
}
