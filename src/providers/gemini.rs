use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{decode_envelope, HttpEndpoint, TextModel};
use crate::{
    config::{PlannerConfig, SamplingParams},
    error::{PlannerError, Result},
};

const PROVIDER: &str = "Gemini";

/// Google Generative Language `generateContent` backend.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    endpoint: HttpEndpoint,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiModel {
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        Ok(Self {
            endpoint: HttpEndpoint::from_config(config)?,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.base_url, self.endpoint.model
        )
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, sampling: &SamplingParams) -> Result<String> {
        let api_key = self.endpoint.require_key(PROVIDER)?;

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": sampling.temperature,
                "topK": sampling.top_k,
                "topP": sampling.top_p,
                "maxOutputTokens": sampling.max_output_tokens,
            }
        });

        let request = self
            .endpoint
            .client
            .post(self.request_url())
            .header("x-goog-api-key", api_key)
            .json(&body);

        let response: GenerateContentResponse =
            decode_envelope(self.endpoint.send_json(request).await?, PROVIDER)?;

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(PlannerError::InvalidResponse(format!(
                "Gemini returned no candidates ({reason})"
            )));
        };

        debug!(finish_reason = ?candidate.finish_reason, "gemini candidate received");

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        Ok(text)
    }
}
