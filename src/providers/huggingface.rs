use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{decode_envelope, HttpEndpoint, TextModel};
use crate::{
    config::{PlannerConfig, SamplingParams},
    error::{PlannerError, Result},
};

const PROVIDER: &str = "Hugging Face";

/// Hugging Face Inference API text-generation backend.
#[derive(Debug, Clone)]
pub struct HuggingFaceModel {
    endpoint: HttpEndpoint,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

/// The API answers with a list for batched inputs and a bare object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl HuggingFaceModel {
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        Ok(Self {
            endpoint: HttpEndpoint::from_config(config)?,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/models/{}", self.endpoint.base_url, self.endpoint.model)
    }
}

#[async_trait]
impl TextModel for HuggingFaceModel {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn generate(&self, prompt: &str, sampling: &SamplingParams) -> Result<String> {
        let api_key = self.endpoint.require_key(PROVIDER)?;

        let mut parameters = Map::new();
        parameters.insert("max_new_tokens".into(), json!(sampling.max_output_tokens));
        parameters.insert("temperature".into(), json!(sampling.temperature));
        parameters.insert("top_p".into(), json!(sampling.top_p));
        parameters.insert("top_k".into(), json!(sampling.top_k));
        // Otherwise the echoed prompt, JSON skeleton included, leads the output.
        parameters.insert("return_full_text".into(), json!(false));
        if let Some(penalty) = sampling.repetition_penalty {
            parameters.insert("repetition_penalty".into(), json!(penalty));
        }

        let request = self
            .endpoint
            .client
            .post(self.request_url())
            .bearer_auth(api_key)
            .json(&json!({ "inputs": prompt, "parameters": Value::Object(parameters) }));

        let response: GenerationResponse =
            decode_envelope(self.endpoint.send_json(request).await?, PROVIDER)?;

        match response {
            GenerationResponse::Single(generation) => Ok(generation.generated_text),
            GenerationResponse::Batch(generations) => generations
                .into_iter()
                .next()
                .map(|generation| generation.generated_text)
                .ok_or_else(|| {
                    PlannerError::InvalidResponse(
                        "Hugging Face returned an empty generation list".to_string(),
                    )
                }),
        }
    }
}
