use std::time::Duration;

use thiserror::Error;

/// Substring providers put in messages about rejected or missing keys.
const CREDENTIAL_SIGNATURE: &str = "API key";

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid trip request: {0}")]
    InvalidRequest(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No results found. Check your connection and try the search again.")]
    NoResults,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Whether another attempt against the provider could succeed.
    pub fn is_retryable(&self) -> bool {
        if self.is_credential_failure() {
            return false;
        }

        matches!(
            self,
            PlannerError::Provider { .. }
                | PlannerError::Http(_)
                | PlannerError::InvalidResponse(_)
                | PlannerError::Timeout(_)
                | PlannerError::Serialization(_)
        )
    }

    /// Credential problems are never transient.
    pub fn is_credential_failure(&self) -> bool {
        match self {
            PlannerError::Credential(_) => true,
            PlannerError::Provider { status, message } => {
                matches!(status, 401 | 403) || message.contains(CREDENTIAL_SIGNATURE)
            }
            PlannerError::Http(message) | PlannerError::InvalidResponse(message) => {
                message.contains(CREDENTIAL_SIGNATURE)
            }
            _ => false,
        }
    }

    /// Collapse any credential-shaped failure into [`PlannerError::Credential`].
    pub fn into_credential(self) -> Self {
        match self {
            PlannerError::Credential(_) => self,
            other if other.is_credential_failure() => {
                PlannerError::Credential(format!("API key is invalid or expired ({other})"))
            }
            other => other,
        }
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlannerError::Config(_) => "CONFIG_ERROR",
            PlannerError::InvalidRequest(_) => "INVALID_REQUEST",
            PlannerError::Credential(_) => "CREDENTIAL_ERROR",
            PlannerError::Provider { .. } => "PROVIDER_ERROR",
            PlannerError::Http(_) => "HTTP_ERROR",
            PlannerError::InvalidResponse(_) => "INVALID_RESPONSE",
            PlannerError::Timeout(_) => "TIMEOUT_ERROR",
            PlannerError::Serialization(_) => "SERIALIZATION_ERROR",
            PlannerError::NoResults => "NO_RESULTS",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        })
    }
}

impl PlannerError {
    /// Map a transport failure, keeping timeouts distinct.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            PlannerError::Timeout(timeout)
        } else {
            PlannerError::Http(err.to_string())
        }
    }
}
