//! HTTP-level tests for the Gemini backend against a wiremock server.

use std::sync::Arc;

use serde_json::json;
use studymate_core::{Error, GenerationBackend, ModelRequest, ModelTier, ResponseSchema};
use studymate_inference::gemini::{GeminiBackend, GeminiConfig};
use studymate_inference::Tutor;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> GeminiBackend {
    let config = GeminiConfig {
        base_url: server.uri(),
        fast_model: "flash-test".to_string(),
        reasoning_model: "pro-test".to_string(),
        timeout_seconds: 10,
        ..GeminiConfig::new("test-key")
    };
    GeminiBackend::new(config).expect("Failed to create backend")
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_generate_sends_key_and_uses_tier_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/pro-test:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let request = ModelRequest::prompt(ModelTier::Reasoning, "quiz me")
        .with_schema(ResponseSchema::array(ResponseSchema::string()));
    let response = backend(&server).generate(&request).await;

    assert!(response.is_ok(), "Request should succeed: {:?}", response.err());
    assert_eq!(response.unwrap().text, "[]");
}

#[tokio::test]
async fn test_structured_request_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/flash-test:generateContent"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "summarize"}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {"type": "OBJECT"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let request = ModelRequest::prompt(ModelTier::Fast, "summarize")
        .with_schema(ResponseSchema::object([("summary", ResponseSchema::string())]));
    backend(&server).generate(&request).await.unwrap();
}

#[tokio::test]
async fn test_grounding_citations_extracted() {
    let server = MockServer::start().await;

    let body = json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "Osmosis is diffusion of water."}]},
            "groundingMetadata": {
                "groundingChunks": [
                    {"web": {"uri": "https://khan.example/osmosis", "title": "Khan Academy"}},
                    {"web": {"uri": "https://untitled.example"}},
                    {"web": {"title": "No link"}}
                ]
            }
        }]
    });

    Mock::given(method("POST"))
        .and(path("/models/flash-test:generateContent"))
        .and(body_partial_json(json!({"tools": [{"googleSearch": {}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let request = ModelRequest::prompt(ModelTier::Fast, "What is osmosis?").with_search();
    let response = backend(&server).generate(&request).await.unwrap();

    assert_eq!(response.citations.len(), 2);
    assert_eq!(response.citations[0].title, "Khan Academy");
    assert_eq!(response.citations[1].title, "External Resource");
}

#[tokio::test]
async fn test_error_body_mapped_to_error_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelRequest::prompt(ModelTier::Fast, "hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Inference(_)));
    assert!(err.to_string().contains("Quota exceeded"));
}

#[tokio::test]
async fn test_auth_failure_is_config_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelRequest::prompt(ModelTier::Fast, "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_non_json_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = backend(&server)
        .generate(&ModelRequest::prompt(ModelTier::Fast, "hi"))
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = GeminiConfig {
        base_url: uri,
        timeout_seconds: 2,
        ..GeminiConfig::new("test-key")
    };
    let err = GeminiBackend::new(config)
        .unwrap()
        .generate(&ModelRequest::prompt(ModelTier::Fast, "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Request(_)), "got {:?}", err);
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    assert!(backend(&server).health_check().await.unwrap());
}

#[tokio::test]
async fn test_tutor_summary_fallback_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/flash-test:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_response("definitely not json")),
        )
        .mount(&server)
        .await;

    let tutor = Tutor::new(Arc::new(backend(&server)));
    let note = studymate_core::Note::new("a.txt", "content", studymate_core::NoteType::Text);
    let summary = tutor.summarizer.summarize(&note).await.unwrap();

    assert_eq!(summary.summary, "Failed to generate summary.");
    assert!(summary.key_takeaways.is_empty());
}

#[tokio::test]
async fn test_tutor_quiz_over_http() {
    let server = MockServer::start().await;

    let questions = json!([
        {"question": "1+1?", "options": ["1", "2", "3", "4"], "correctAnswer": 1, "explanation": "2"},
        {"question": "bad", "options": ["1", "2"], "correctAnswer": 0, "explanation": "x"}
    ]);

    Mock::given(method("POST"))
        .and(path("/models/pro-test:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_response(&questions.to_string())),
        )
        .mount(&server)
        .await;

    let tutor = Tutor::new(Arc::new(backend(&server)));
    let quiz = tutor
        .quiz
        .generate(&[], Default::default(), Default::default())
        .await
        .unwrap();

    assert_eq!(quiz.len(), 1);
    assert_eq!(quiz[0].correct_answer, 1);
}
