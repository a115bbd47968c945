//! Planner configuration.
//!
//! Everything the pipeline needs (provider, credential, retry policy, sampling
//! parameters) lives in [`PlannerConfig`] and is handed to
//! [`TripPlanner::new`](crate::TripPlanner::new) explicitly.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PlannerError, Result};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CURRENCY: &str = "SAR";
pub const DEFAULT_LANGUAGE: &str = "Arabic";

/// Generative text backends the planner can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    HuggingFace,
    OpenAi,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-pro",
            ProviderKind::HuggingFace => "meta-llama/Llama-2-70b-chat-hf",
            ProviderKind::OpenAi => "openai/gpt-4.1-mini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::HuggingFace => "https://api-inference.huggingface.co",
            ProviderKind::OpenAi => "https://openrouter.ai/api/v1",
        }
    }

    /// Environment variable holding this provider's key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::HuggingFace => "HUGGINGFACE_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::OpenAi => "openai",
        };
        f.write_str(name)
    }
}

impl FromStr for ProviderKind {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            "openai" | "openrouter" => Ok(ProviderKind::OpenAi),
            other => Err(PlannerError::Config(format!(
                "Unknown provider '{other}'. Supported: gemini, huggingface, openai"
            ))),
        }
    }
}

/// Sampling knobs forwarded to the model on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    /// Only honoured by backends that support it
    pub repetition_penalty: Option<f32>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
            repetition_penalty: Some(1.1),
        }
    }
}

/// Fixed-delay retry: no growth, no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Clone)]
pub struct PlannerConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub sampling: SamplingParams,
    pub currency: String,
    pub language: String,
    /// Attach the itinerary JSON schema as `response_format` (OpenAI-compatible backends only)
    pub structured_output: bool,
}

// Hand-written so the key never lands in logs.
impl fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("sampling", &self.sampling)
            .field("currency", &self.currency)
            .field("language", &self.language)
            .field("structured_output", &self.structured_output)
            .finish()
    }
}

impl PlannerConfig {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            api_key: None,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            sampling: SamplingParams::default(),
            currency: DEFAULT_CURRENCY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            structured_output: true,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_structured_output(mut self, enabled: bool) -> Self {
        self.structured_output = enabled;
        self
    }

    /// Build a configuration from the process environment.
    ///
    /// A missing key is only logged: the first call then fails with
    /// [`PlannerError::Credential`].
    pub fn from_env() -> Result<Self> {
        let provider = match std::env::var("TRIP_PLANNER_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => ProviderKind::Gemini,
        };

        let mut config = Self::new(provider);

        match std::env::var(provider.api_key_var()) {
            Ok(key) if !key.trim().is_empty() => config.api_key = Some(key),
            _ => warn!(
                provider = %provider,
                variable = provider.api_key_var(),
                "API key not found in environment; requests will fail until one is configured"
            ),
        }

        if let Ok(model) = std::env::var("TRIP_PLANNER_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("TRIP_PLANNER_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(value) = std::env::var("TRIP_PLANNER_MAX_ATTEMPTS") {
            config.retry.max_attempts = parse_env_number("TRIP_PLANNER_MAX_ATTEMPTS", &value)?;
        }
        if let Ok(value) = std::env::var("TRIP_PLANNER_RETRY_DELAY_MS") {
            let millis = parse_env_number("TRIP_PLANNER_RETRY_DELAY_MS", &value)?;
            config.retry.delay = Duration::from_millis(millis);
        }
        if let Ok(value) = std::env::var("TRIP_PLANNER_STRUCTURED_OUTPUT") {
            config.structured_output = parse_env_flag("TRIP_PLANNER_STRUCTURED_OUTPUT", &value)?;
        }

        Ok(config)
    }
}

fn parse_env_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PlannerError::Config(format!("{name} must be a number, got '{value}'")))
}

fn parse_env_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PlannerError::Config(format!(
            "{name} must be true or false, got '{value}'"
        ))),
    }
}
