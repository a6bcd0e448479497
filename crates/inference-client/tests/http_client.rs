use std::time::Duration;

use configuration::InferenceSettings;
use inference_client::error::InferenceError;
use inference_client::{GenerateRequest, HttpInferenceClient, InferenceClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, api_key: &str) -> HttpInferenceClient {
    let settings = InferenceSettings {
        base_url: server.uri(),
        api_key: api_key.to_string(),
        request_timeout_ms: 200,
        ..InferenceSettings::default()
    };
    HttpInferenceClient::new(&settings).unwrap()
}

#[tokio::test]
async fn generate_posts_camel_case_body_and_returns_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "default",
            "prompt": "analyze",
            "temperature": 0.5,
            "maxTokens": 256,
            "systemInstruction": "be brief"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": "hello" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "sk-test");
    let request = GenerateRequest::new("analyze", 0.5, 256)
        .with_model(InferenceSettings::default().model)
        .with_system_instruction("be brief");

    let resp = client.generate(&request).await.unwrap();
    assert_eq!(resp.content, "hello");
}

#[tokio::test]
async fn quota_exhaustion_is_distinguished_from_rate_limiting() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "code": "insufficient_quota",
            "message": "You exceeded your current quota"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "");
    let err = client
        .generate(&GenerateRequest::new("x", 0.3, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::QuotaExceeded(_)), "{err:?}");
}

#[tokio::test]
async fn plain_429_is_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
        .mount(&server)
        .await;

    let err = client_for(&server, "")
        .generate(&GenerateRequest::new("x", 0.3, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::RateLimited(_)), "{err:?}");
}

#[tokio::test]
async fn server_errors_map_to_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "error": "overloaded" })))
        .mount(&server)
        .await;

    let err = client_for(&server, "")
        .generate(&GenerateRequest::new("x", 0.3, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Service(503, ref m) if m == "overloaded"), "{err:?}");
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server, "")
        .generate(&GenerateRequest::new("x", 0.3, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)), "{err:?}");
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "content": "late" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server, "")
        .generate(&GenerateRequest::new("x", 0.3, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Timeout(_)), "{err:?}");
}

#[tokio::test]
async fn health_check_reads_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let status = client_for(&server, "").health_check().await.unwrap();
    assert_eq!(status.status, "ok");
}
