//! Generative text backends.
//!
//! Every backend makes exactly one HTTP call per [`TextModel::generate`];
//! retries belong to the planner.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::{PlannerConfig, ProviderKind, SamplingParams},
    error::{PlannerError, Result},
};

pub mod gemini;
pub mod huggingface;
pub mod openai;

pub use gemini::GeminiModel;
pub use huggingface::HuggingFaceModel;
pub use openai::OpenAiChatModel;

const MAX_ERROR_BODY_CHARS: usize = 500;

/// A text-completion endpoint that turns a prompt into raw text.
#[async_trait]
pub trait TextModel: Send + Sync + fmt::Debug {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, sampling: &SamplingParams) -> Result<String>;
}

/// Create the backend selected by `config.provider`.
pub fn create_model(config: &PlannerConfig) -> Result<Arc<dyn TextModel>> {
    debug!(provider = %config.provider, model = %config.model, "create_model: called");
    let model: Arc<dyn TextModel> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiModel::from_config(config)?),
        ProviderKind::HuggingFace => Arc::new(HuggingFaceModel::from_config(config)?),
        ProviderKind::OpenAi => Arc::new(OpenAiChatModel::from_config(config)?),
    };
    Ok(model)
}

/// Connection settings shared by the HTTP backends.
#[derive(Clone)]
pub(crate) struct HttpEndpoint {
    pub client: Client,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl fmt::Debug for HttpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEndpoint")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpEndpoint {
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PlannerError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: config.timeout,
        })
    }

    /// The key, or a credential error naming the provider.
    pub fn require_key(&self, provider: &str) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                PlannerError::Credential(format!(
                    "{provider} API key is missing. Check the application settings."
                ))
            })
    }

    /// Send `request` and return the JSON body of a successful response.
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|err| PlannerError::from_transport(err, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| PlannerError::from_transport(err, self.timeout))?;

        if !status.is_success() {
            return Err(PlannerError::Provider {
                status: status.as_u16(),
                message: provider_error_message(&body),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|err| {
            PlannerError::InvalidResponse(format!("response body is not JSON: {err}"))
        })?;

        if json.get("error").is_some_and(|error| !error.is_null()) {
            return Err(PlannerError::Provider {
                status: status.as_u16(),
                message: provider_error_message(&body),
            });
        }

        Ok(json)
    }
}

/// Decode a provider envelope, naming the failing path on error.
pub(crate) fn decode_envelope<T: DeserializeOwned>(value: Value, provider: &str) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let location = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        PlannerError::InvalidResponse(format!(
            "unexpected {provider} response at {location}: {}",
            err.inner()
        ))
    })
}

/// Best human-readable message out of an error body.
fn provider_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let error = json.get("error");
        let message = error
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .or_else(|| error.and_then(Value::as_str))
            .or_else(|| json.get("message").and_then(Value::as_str));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        let mut truncated: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            provider_error_message(r#"{"error": {"code": 400, "message": "API key not valid."}}"#),
            "API key not valid."
        );
        assert_eq!(
            provider_error_message(r#"{"error": "Model is currently loading"}"#),
            "Model is currently loading"
        );
        assert_eq!(provider_error_message("  Bad Gateway \n"), "Bad Gateway");

        let long = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        assert!(provider_error_message(&long).ends_with("..."));
    }

    #[test]
    fn test_missing_key_is_credential_error() {
        let config = PlannerConfig::new(ProviderKind::Gemini);
        let endpoint = HttpEndpoint::from_config(&config).unwrap();
        let err = endpoint.require_key("Gemini").unwrap_err();
        assert!(err.is_credential_failure());
        assert!(!err.is_retryable());
    }
}
