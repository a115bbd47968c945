use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use serde::Serialize;
use tracing::debug;

use crate::{
    core::{planner::TripPlanner, request::TripRequest},
    error::{PlannerError, Result},
    types::ItineraryBundle,
};

/// Identifies one search; later searches get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What the UI should currently display.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SearchState {
    Idle,
    Loading { token: RequestToken },
    Ready { bundle: Box<ItineraryBundle> },
    Failed { code: String, message: String },
}

#[derive(Debug)]
pub enum SearchOutcome {
    Applied(ItineraryBundle),
    Failed(PlannerError),
    /// A newer search was started before this one finished; its result was dropped
    Superseded(RequestToken),
}

/// Keeps the displayed state in step with the most recent search.
///
/// Results are applied by token, not by completion order, so a slow earlier
/// search cannot overwrite a faster later one.
#[derive(Debug)]
pub struct SearchSession {
    planner: Arc<TripPlanner>,
    latest: AtomicU64,
    state: Mutex<SearchState>,
}

impl SearchSession {
    pub fn new(planner: Arc<TripPlanner>) -> Self {
        Self {
            planner,
            latest: AtomicU64::new(0),
            state: Mutex::new(SearchState::Idle),
        }
    }

    /// Issue a new token and mark the session as loading.
    pub fn begin(&self) -> RequestToken {
        let mut state = self.lock_state();
        let token = RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        *state = SearchState::Loading { token };
        debug!(token = token.0, "search started");
        token
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Apply `result` if `token` is still the latest search.
    pub fn complete(&self, token: RequestToken, result: Result<ItineraryBundle>) -> SearchOutcome {
        let mut state = self.lock_state();
        if !self.is_current(token) {
            debug!(token = token.0, "discarding stale search result");
            return SearchOutcome::Superseded(token);
        }

        match result {
            Ok(bundle) => {
                *state = SearchState::Ready {
                    bundle: Box::new(bundle.clone()),
                };
                SearchOutcome::Applied(bundle)
            }
            Err(err) => {
                *state = SearchState::Failed {
                    code: err.error_code().to_string(),
                    message: err.to_string(),
                };
                SearchOutcome::Failed(err)
            }
        }
    }

    /// Run one search end to end.
    pub async fn search(&self, request: &TripRequest) -> SearchOutcome {
        let token = self.begin();
        let result = self.planner.generate_trip_plan(request).await;
        self.complete(token, result)
    }

    pub fn state(&self) -> SearchState {
        self.lock_state().clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SearchState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
