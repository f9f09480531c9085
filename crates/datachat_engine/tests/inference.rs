use std::time::Duration;

use datachat_engine::{
    CompletionRequest, InferenceClient, InferenceFailure, InferenceSettings, OpenAiCompatClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> InferenceSettings {
    InferenceSettings {
        base_url: format!("{}/v1/", server.uri()),
        api_key: Some("lm-studio".to_string()),
        ..InferenceSettings::default()
    }
}

fn request(settings: &InferenceSettings) -> CompletionRequest {
    CompletionRequest {
        system_context: Some("context".to_string()),
        user_text: "hello".to_string(),
        options: settings.options(),
    }
}

#[tokio::test]
async fn returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer lm-studio"))
        .and(body_partial_json(json!({
            "model": "QuantFactory/Meta-Llama-3-8B-Instruct-GGUF",
            "max_tokens": 800,
            "messages": [
                { "role": "system", "content": "context" },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "role": "assistant", "content": "42" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = OpenAiCompatClient::new(settings.clone()).unwrap();

    let answer = client.complete(&request(&settings)).await.unwrap();
    assert_eq!(answer, "42");
}

#[tokio::test]
async fn request_without_system_context_sends_only_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [ { "role": "user", "content": "hello" } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "content": "ok" } } ]
        })))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = OpenAiCompatClient::new(settings.clone()).unwrap();
    let mut request = request(&settings);
    request.system_context = None;

    assert_eq!(client.complete(&request).await.unwrap(), "ok");
}

#[tokio::test]
async fn http_error_status_maps_to_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = OpenAiCompatClient::new(settings.clone()).unwrap();

    let err = client.complete(&request(&settings)).await.unwrap_err();
    assert_eq!(err.kind, InferenceFailure::HttpStatus(503));
    assert!(err.message.contains("model loading"));
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = OpenAiCompatClient::new(settings.clone()).unwrap();

    let err = client.complete(&request(&settings)).await.unwrap_err();
    assert_eq!(err.kind, InferenceFailure::EmptyResponse);
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let client = OpenAiCompatClient::new(settings.clone()).unwrap();

    let err = client.complete(&request(&settings)).await.unwrap_err();
    assert_eq!(err.kind, InferenceFailure::MalformedResponse);
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let settings = InferenceSettings {
        request_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let client = OpenAiCompatClient::new(settings.clone()).unwrap();

    let err = client.complete(&request(&settings)).await.unwrap_err();
    assert_eq!(err.kind, InferenceFailure::Timeout);
}

#[tokio::test]
async fn invalid_base_url_is_reported_without_network() {
    let settings = InferenceSettings {
        base_url: "not a url".to_string(),
        ..InferenceSettings::default()
    };
    let client = OpenAiCompatClient::new(settings.clone()).unwrap();

    let err = client.complete(&request(&settings)).await.unwrap_err();
    assert_eq!(err.kind, InferenceFailure::InvalidUrl);
}
