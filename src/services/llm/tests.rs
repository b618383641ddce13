//! LLM Gateway Unit Tests
//!
//! Runs the gateway against a wiremock model server.

use super::client::parse_model_catalog;
use super::service::compose_prompt;
use super::*;
use crate::utils::Locale;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INITIAL_MODEL: &str = "llama3.2";

fn create_gateway(base_url: &str, request_timeout: Duration) -> LLMGatewayImpl {
    let selection = Arc::new(ModelSelection::new(base_url, INITIAL_MODEL, request_timeout));
    let settings = GatewaySettings {
        health_timeout: Duration::from_secs(1),
        generation: GenerationOptions::default(),
        locale: Locale::En,
    };
    LLMGatewayImpl::new(selection, settings).expect("Failed to create gateway")
}

async fn mount_catalog(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_ok() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!({"data": []})).await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    assert!(gateway.check_health().await);
}

#[tokio::test]
async fn test_health_false_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    assert!(!gateway.check_health().await);
}

#[tokio::test]
async fn test_health_false_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    assert!(!gateway.check_health().await);
}

#[tokio::test]
async fn test_health_false_when_unreachable() {
    let gateway = create_gateway("http://127.0.0.1:9", Duration::from_secs(5));
    assert!(!gateway.check_health().await);
}

// ============================================================================
// Model Catalog
// ============================================================================

#[tokio::test]
async fn test_list_models_sorted_and_filtered() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        json!({
            "object": "list",
            "data": [
                {"id": "mistral:latest", "object": "model"},
                {"id": ""},
                {"object": "model"},
                {"id": 12},
                {"id": "deepseek-r1:14b"},
                {"id": "llama3.2"}
            ]
        }),
    )
    .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    let models = gateway.list_models().await;

    assert_eq!(models, vec!["deepseek-r1:14b", "llama3.2", "mistral:latest"]);
}

#[tokio::test]
async fn test_list_models_empty_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    assert!(gateway.list_models().await.is_empty());
}

#[tokio::test]
async fn test_list_models_empty_on_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    assert!(gateway.list_models().await.is_empty());
}

#[tokio::test]
async fn test_list_models_empty_when_unreachable() {
    let gateway = create_gateway("http://127.0.0.1:9", Duration::from_secs(5));
    assert!(gateway.list_models().await.is_empty());
}

#[test]
fn test_parse_catalog_without_data_array() {
    assert!(parse_model_catalog(r#"{"data": "oops"}"#).unwrap().is_empty());
    assert!(parse_model_catalog(r#"{"models": []}"#).unwrap().is_empty());
    assert!(matches!(parse_model_catalog("nope"), Err(LLMError::ParseError(_))));
}

#[tokio::test]
async fn test_validate_model_refetches_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "llama3.2"}]})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    assert!(gateway.validate_model("llama3.2").await);
    assert!(!gateway.validate_model("phi3").await);
}

// ============================================================================
// Model Switching
// ============================================================================

#[tokio::test]
async fn test_set_model_is_unconditional() {
    let gateway = create_gateway("http://127.0.0.1:9", Duration::from_secs(5));

    gateway.set_model("does-not-exist").await;

    assert_eq!(gateway.current_model(), "does-not-exist");
}

#[tokio::test]
async fn test_switch_model_rejects_unknown() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!({"data": [{"id": "mistral:latest"}, {"id": "llama3.2"}]})).await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    let err = gateway.switch_model("phi3").await.unwrap_err();

    assert_eq!(
        err,
        ModelSwitchError::Unavailable {
            model: "phi3".to_string(),
            available: vec!["llama3.2".to_string(), "mistral:latest".to_string()],
        }
    );
    assert_eq!(gateway.current_model(), INITIAL_MODEL);
}

#[tokio::test]
async fn test_switch_model_rejects_empty_name() {
    let gateway = create_gateway("http://127.0.0.1:9", Duration::from_secs(5));
    assert_eq!(gateway.switch_model("   ").await, Err(ModelSwitchError::EmptyName));
}

#[tokio::test]
async fn test_switch_model_then_generate_uses_new_model() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!({"data": [{"id": "mistral:latest"}, {"id": "llama3.2"}]})).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "mistral:latest"})))
        .respond_with(chat_reply("from mistral"))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    gateway.switch_model("mistral:latest").await.unwrap();

    assert_eq!(gateway.current_model(), "mistral:latest");
    assert!(gateway.validate_model("mistral:latest").await);
    assert_eq!(gateway.generate("hello", None).await.unwrap(), "from mistral");
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_generate_sends_chat_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": INITIAL_MODEL,
            "stream": false,
            "options": {"temperature": 0.7, "top_p": 0.9, "max_tokens": 1000}
        })))
        .respond_with(chat_reply("The network looks healthy."))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));
    let context = json!({"analysis": {"device_count": 2}});
    let answer = gateway.generate("Is it ok?", Some(&context)).await.unwrap();

    assert_eq!(answer, "The network looks healthy.");

    let requests = server.received_requests().await.expect("request recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    let content = messages[0]["content"].as_str().unwrap();
    assert!(content.starts_with(Locale::En.system_persona()));
    assert!(content.contains("Question: Is it ok?"));
    assert!(content.contains("\"device_count\": 2"));
}

#[tokio::test]
async fn test_generate_response_timeout_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("too late").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(1));

    let err = gateway.generate("slow", None).await.unwrap_err();
    assert!(matches!(err, LLMError::Timeout(1)));
    assert!(err.is_retryable());

    let text = gateway.generate_response("slow", None).await;
    assert_eq!(text, Locale::En.request_timed_out());
}

#[tokio::test]
async fn test_generate_response_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));

    match gateway.generate("x", None).await {
        Err(LLMError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "model crashed");
        },
        other => panic!("expected status error, got {:?}", other),
    }
    let text = gateway.generate_response("x", None).await;
    assert_eq!(text, Locale::En.upstream_status_error(500));
}

#[tokio::test]
async fn test_generate_response_connection_error_embeds_detail() {
    let gateway = create_gateway("http://127.0.0.1:9", Duration::from_secs(5));

    let text = gateway.generate_response("x", None).await;

    assert!(text.starts_with("An error occurred while contacting the AI: Connection failed"));
}

#[tokio::test]
async fn test_generate_response_empty_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));

    assert!(matches!(gateway.generate("x", None).await, Err(LLMError::EmptyResponse)));
    assert_eq!(gateway.generate_response("x", None).await, Locale::En.empty_response());
}

#[tokio::test]
async fn test_generate_empty_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply(""))
        .mount(&server)
        .await;

    let gateway = create_gateway(&server.uri(), Duration::from_secs(5));

    assert!(matches!(gateway.generate("x", None).await, Err(LLMError::EmptyResponse)));
    assert_eq!(gateway.generate_response("x", None).await, Locale::En.empty_response());
}

#[test]
fn test_compose_prompt_without_context() {
    let prompt = compose_prompt(Locale::Th, "ทดสอบ", None).unwrap();

    assert!(prompt.starts_with(Locale::Th.system_persona()));
    assert!(prompt.ends_with("คำถาม: ทดสอบ"));
    assert!(!prompt.contains(Locale::Th.context_label()));
}

#[test]
fn test_compose_prompt_keeps_unicode_unescaped() {
    let context = json!({"label": "เราเตอร์"});
    let prompt = compose_prompt(Locale::Th, "q", Some(&context)).unwrap();

    assert!(prompt.contains("เราเตอร์"));
}
