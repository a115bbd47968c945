use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::{
    config::{PlannerConfig, RetryPolicy, SamplingParams},
    core::request::TripRequest,
    error::{PlannerError, Result},
    providers::{create_model, TextModel},
    services::{
        extraction::parse_model_payload,
        normalize::{degraded_itinerary, normalize_itinerary},
        prompt::compose_trip_prompt,
    },
    types::ItineraryBundle,
};

/// Turns trip requests into itinerary bundles through a text model.
#[derive(Debug, Clone)]
pub struct TripPlanner {
    model: Arc<dyn TextModel>,
    retry: RetryPolicy,
    sampling: SamplingParams,
    timeout: Duration,
    currency: String,
    language: String,
}

/// A bundle together with how it was obtained.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub bundle: ItineraryBundle,
    /// Model calls made, including the successful one
    pub attempts: usize,
    /// True when the model output could not be parsed and the fallback was used
    pub degraded: bool,
    pub elapsed: Duration,
}

impl TripPlanner {
    /// Build a planner and its backend from `config`.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let model = create_model(&config)?;
        Ok(Self::with_model(model, &config))
    }

    /// Use a caller-supplied backend with the rest of `config`.
    pub fn with_model(model: Arc<dyn TextModel>, config: &PlannerConfig) -> Self {
        Self {
            model,
            retry: config.retry,
            sampling: config.sampling.clone(),
            timeout: config.timeout,
            currency: config.currency.clone(),
            language: config.language.clone(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::new(PlannerConfig::from_env()?)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn generate_trip_plan(&self, request: &TripRequest) -> Result<ItineraryBundle> {
        self.generate_with_report(request)
            .await
            .map(|outcome| outcome.bundle)
    }

    /// Validate, prompt, and retry transient failures with a fixed delay.
    ///
    /// Invalid input and credential failures are returned without retrying.
    /// Unparseable model output yields a degraded bundle, not an error.
    pub async fn generate_with_report(&self, request: &TripRequest) -> Result<PlanOutcome> {
        let trip = request.validate()?;
        let prompt = compose_trip_prompt(&trip, &self.currency, &self.language);
        let started = Instant::now();
        let max_attempts = self.retry.max_attempts;

        info!(
            provider = self.model.name(),
            destination = %trip.destination,
            days = trip.duration_days,
            "generating trip plan"
        );

        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let call = timeout(self.timeout, self.model.generate(&prompt, &self.sampling));
            let result = match call.await {
                Ok(result) => result,
                Err(_) => Err(PlannerError::Timeout(self.timeout)),
            };

            match result {
                Ok(text) => {
                    debug!(attempt, raw = %text, "model response received");

                    let (bundle, degraded) = match parse_model_payload(&text) {
                        Ok(payload) => (normalize_itinerary(&Value::Object(payload), &trip), false),
                        Err(err) => {
                            warn!(
                                attempt,
                                error = %err,
                                "could not parse model output; returning fallback itinerary"
                            );
                            (degraded_itinerary(&trip), true)
                        }
                    };

                    return Ok(PlanOutcome {
                        bundle,
                        attempts: attempt,
                        degraded,
                        elapsed: started.elapsed(),
                    });
                }
                Err(err) if err.is_credential_failure() => {
                    error!(attempt, error = %err, "credential rejected; not retrying");
                    return Err(err.into_credential());
                }
                Err(err) if !err.is_retryable() => {
                    error!(attempt, error = %err, "non-retryable failure");
                    return Err(err);
                }
                Err(err) => {
                    warn!(attempt, max_attempts, error = %err, "attempt failed");
                    last_error = Some(err);
                    if attempt < max_attempts {
                        sleep(self.retry.delay).await;
                    }
                }
            }
        }

        error!(max_attempts, "all attempts failed");
        Err(last_error.unwrap_or(PlannerError::NoResults))
    }
}
