use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{decode_envelope, HttpEndpoint, TextModel};
use crate::{
    config::{PlannerConfig, SamplingParams},
    error::{PlannerError, Result},
    schema::CompletionSchema,
    types::ModelItinerary,
};

const PROVIDER: &str = "OpenAI";

/// OpenAI-compatible `/chat/completions` backend (OpenAI, OpenRouter, ...).
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    endpoint: HttpEndpoint,
    structured_output: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatModel {
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        Ok(Self {
            endpoint: HttpEndpoint::from_config(config)?,
            structured_output: config.structured_output,
        })
    }

    /// Endpoints that reject JSON schemas get a plain chat request.
    fn request_body(&self, prompt: &str, sampling: &SamplingParams) -> Value {
        let mut chat_request = ChatCompletionRequest::new(
            self.endpoint.model.clone(),
            vec![json!({ "role": "user", "content": prompt })],
        )
        .with_sampling(sampling);
        if self.structured_output {
            chat_request = chat_request.with_response_format(ModelItinerary::schema().response_format());
        }
        chat_request.into_value()
    }
}

#[async_trait]
impl TextModel for OpenAiChatModel {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str, sampling: &SamplingParams) -> Result<String> {
        let api_key = self.endpoint.require_key(PROVIDER)?;

        let request = self
            .endpoint
            .client
            .post(build_chat_url(&self.endpoint.base_url))
            .bearer_auth(api_key)
            .json(&self.request_body(prompt, sampling));

        let response: ChatCompletionResponse =
            decode_envelope(self.endpoint.send_json(request).await?, PROVIDER)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PlannerError::InvalidResponse(
                    "Completion response contained no assistant content".to_string(),
                )
            })
    }
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

#[derive(Clone, Debug)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
    response_format: Option<Value>,
}

impl ChatCompletionRequest {
    fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            top_p: None,
            max_tokens: None,
            response_format: None,
        }
    }

    // top_k and repetition_penalty have no chat-completions equivalent.
    fn with_sampling(mut self, sampling: &SamplingParams) -> Self {
        self.temperature = Some(sampling.temperature);
        self.top_p = Some(sampling.top_p);
        self.max_tokens = Some(sampling.max_output_tokens);
        self
    }

    fn with_response_format(mut self, response_format: Value) -> Self {
        self.response_format = Some(response_format);
        self
    }

    fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        if let Some(top_p) = self.top_p {
            body["top_p"] = json!(top_p);
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(response_format) = self.response_format {
            body["response_format"] = response_format;
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chat_url() {
        assert_eq!(
            build_chat_url("https://openrouter.ai/api/v1/"),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        assert_eq!(
            build_chat_url("http://localhost:8080/v1/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body() {
        let body = ChatCompletionRequest::new("gpt", vec![json!({"role": "user", "content": "hi"})])
            .with_sampling(&SamplingParams::default())
            .with_response_format(ModelItinerary::schema().response_format())
            .into_value();

        assert_eq!(body["model"], "gpt");
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["name"],
            "trip_itinerary"
        );
        assert!(body.get("top_k").is_none());
    }

    #[test]
    fn test_structured_output_can_be_disabled() {
        let config = PlannerConfig::new(crate::ProviderKind::OpenAi);
        let with_schema = OpenAiChatModel::from_config(&config).unwrap();
        assert!(with_schema
            .request_body("hi", &SamplingParams::default())
            .get("response_format")
            .is_some());

        let plain =
            OpenAiChatModel::from_config(&config.with_structured_output(false)).unwrap();
        let body = plain.request_body("hi", &SamplingParams::default());
        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"][0]["content"], "hi");
    }
}
