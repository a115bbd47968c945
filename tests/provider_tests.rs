use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use trip_planner::{
    create_model, PlannerConfig, PlannerError, ProviderKind, RetryPolicy, SamplingParams,
    TripPlanner, TripRequest,
};

const PLAN_JSON: &str = r#"{"summary":"Two days in Abha","recommendations":["Visit the old town"],"dailyPlan":[{"activities":[{"title":"Al-Soudah","description":"Cable car","time":"09:00","cost":300,"type":"سياحة"}]},{"activities":[{"title":"Souq","description":"Tuesday market","time":"17:00","cost":200,"type":"تسوق"}]}],"weather":"Mild","culturalTips":["Greet elders first"],"packingList":["Jacket"],"transportation":["Rental car"]}"#;

fn config(provider: ProviderKind, base_url: &str) -> PlannerConfig {
    PlannerConfig::new(provider)
        .with_api_key("test-key")
        .with_base_url(base_url)
        .with_retry(RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(10),
        })
}

fn two_day_request() -> TripRequest {
    TripRequest::new("Abha", "2000-3000", "2025-06-10", "2025-06-12")
}

fn gemini_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_gemini_generates_plan() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-pro:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "topK": 40, "maxOutputTokens": 2048 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(PLAN_JSON))
        .expect(1)
        .create_async()
        .await;

    let planner = TripPlanner::new(config(ProviderKind::Gemini, &server.url())).unwrap();
    let bundle = planner.generate_trip_plan(&two_day_request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(bundle.day_count(), 2);
    assert_eq!(bundle.trip_plan.total_budget, 3000.0);
    assert_eq!(bundle.trip_plan.remaining_budget, 2500.0);
    assert_eq!(bundle.weather_info, "Mild");
}

#[tokio::test]
async fn test_gemini_server_error_is_retried() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", "/models/gemini-pro:generateContent")
        .with_status(503)
        .with_body(r#"{"error":{"code":503,"message":"The model is overloaded."}}"#)
        .expect(2)
        .create_async()
        .await;

    let planner = TripPlanner::new(
        config(ProviderKind::Gemini, &server.url()).with_retry(RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(10),
        }),
    )
    .unwrap();
    let err = planner
        .generate_trip_plan(&two_day_request())
        .await
        .unwrap_err();

    failing.assert_async().await;
    assert!(matches!(err, PlannerError::Provider { status: 503, .. }));
    assert_eq!(err.to_error_payload()["error"]["retryable"], true);
}

#[tokio::test]
async fn test_gemini_rejected_key_stops_immediately() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-pro:generateContent")
        .with_status(400)
        .with_body(
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let planner = TripPlanner::new(config(ProviderKind::Gemini, &server.url())).unwrap();
    let err = planner
        .generate_trip_plan(&two_day_request())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, PlannerError::Credential(_)));
    assert_eq!(err.error_code(), "CREDENTIAL_ERROR");
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = PlannerConfig::new(ProviderKind::Gemini).with_base_url(server.url());
    let err = TripPlanner::new(config)
        .unwrap()
        .generate_trip_plan(&two_day_request())
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, PlannerError::Credential(_)));
}

#[tokio::test]
async fn test_huggingface_generation() {
    let mut server = mockito::Server::new_async().await;
    let model_path = format!("/models/{}", ProviderKind::HuggingFace.default_model());
    let mock = server
        .mock("POST", model_path.as_str())
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "parameters": { "return_full_text": false, "max_new_tokens": 2048 }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "generated_text": PLAN_JSON }]).to_string())
        .create_async()
        .await;

    let model = create_model(&config(ProviderKind::HuggingFace, &server.url())).unwrap();
    let text = model
        .generate("plan a trip", &SamplingParams::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(model.name(), "huggingface");
    assert_eq!(text, PLAN_JSON);
}

#[tokio::test]
async fn test_huggingface_loading_error() {
    let mut server = mockito::Server::new_async().await;
    let model_path = format!("/models/{}", ProviderKind::HuggingFace.default_model());
    server
        .mock("POST", model_path.as_str())
        .with_status(503)
        .with_body(r#"{"error":"Model is currently loading","estimated_time":20.0}"#)
        .create_async()
        .await;

    let model = create_model(&config(ProviderKind::HuggingFace, &server.url())).unwrap();
    let err = model
        .generate("plan a trip", &SamplingParams::default())
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(err.to_string().contains("Model is currently loading"));
}

#[tokio::test]
async fn test_openai_chat_completion_with_schema() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "trip_itinerary" }
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{ "message": { "role": "assistant", "content": PLAN_JSON } }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let planner = TripPlanner::new(config(ProviderKind::OpenAi, &server.url())).unwrap();
    let outcome = planner
        .generate_with_report(&two_day_request())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.attempts, 1);
    assert!(!outcome.degraded);
    assert_eq!(outcome.bundle.packing_list, vec!["Jacket".to_string()]);
}

#[tokio::test]
async fn test_openai_without_structured_output() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "messages": [{ "role": "user", "content": "plan a trip" }]
        })))
        .match_request(|request| {
            request
                .body()
                .map(|body| !String::from_utf8_lossy(body).contains("response_format"))
                .unwrap_or(false)
        })
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "choices": [{ "message": { "content": PLAN_JSON } }] }).to_string())
        .expect(1)
        .create_async()
        .await;

    let config = config(ProviderKind::OpenAi, &server.url()).with_structured_output(false);
    let text = create_model(&config)
        .unwrap()
        .generate("plan a trip", &SamplingParams::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(text, PLAN_JSON);
}

#[tokio::test]
async fn test_null_error_field_is_not_a_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": null,
                "choices": [{ "message": { "content": PLAN_JSON } }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let model = create_model(&config(ProviderKind::OpenAi, &server.url())).unwrap();
    let text = model
        .generate("plan a trip", &SamplingParams::default())
        .await
        .unwrap();
    assert_eq!(text, PLAN_JSON);
}

#[tokio::test]
async fn test_error_field_on_success_status_is_provider_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Rate limit exceeded"}}"#)
        .create_async()
        .await;

    let model = create_model(&config(ProviderKind::OpenAi, &server.url())).unwrap();
    let err = model
        .generate("plan a trip", &SamplingParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlannerError::Provider { status: 200, ref message } if message == "Rate limit exceeded"
    ));
}

#[tokio::test]
async fn test_unexpected_envelope_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": "nope"}"#)
        .create_async()
        .await;

    let model = create_model(&config(ProviderKind::OpenAi, &server.url())).unwrap();
    let err = model
        .generate("plan a trip", &SamplingParams::default())
        .await
        .unwrap_err();

    match err {
        PlannerError::InvalidResponse(message) => assert!(message.contains("choices")),
        other => panic!("expected invalid response, got {other:?}"),
    }
}
