//! Integration tests for the Ollama client against a mock server

use myiq::config::LlmConfig;
use myiq::providers::{get_llm_response, is_error_reply, LlmClient, OllamaClient};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OllamaClient {
    OllamaClient::new(LlmConfig {
        host: server.uri(),
        model: "llama3.2:latest".to_string(),
        request_timeout_seconds: Some(5),
    })
    .expect("client should build")
}

#[tokio::test]
async fn test_generate_sends_non_streaming_request_and_trims_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "llama3.2:latest",
            "prompt": "Hello",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.2:latest",
            "response": "  Hi there!\n",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reply = client.generate("Hello").await.expect("generate should succeed");
    assert_eq!(reply, "Hi there!");
}

#[tokio::test]
async fn test_missing_response_field_is_empty_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .generate("anything")
        .await
        .expect("generate should succeed");
    assert_eq!(reply, "");
}

#[tokio::test]
async fn test_http_error_becomes_sentinel_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.generate("hi").await.is_err());

    let reply = get_llm_response(&client, "hi").await;
    assert!(reply.starts_with("[Error talking to LLM:"));
    assert!(reply.contains("model not found"));
    assert!(is_error_reply(&reply));
}

#[tokio::test]
async fn test_unreachable_host_becomes_sentinel_reply() {
    let client = OllamaClient::new(LlmConfig {
        host: "http://127.0.0.1:9".to_string(),
        model: "llama3.2:latest".to_string(),
        request_timeout_seconds: Some(2),
    })
    .expect("client should build");

    let reply = get_llm_response(&client, "hi").await;
    assert!(reply.contains("[Error talking to LLM:"));
}

#[tokio::test]
async fn test_malformed_body_becomes_sentinel_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let reply = get_llm_response(&client_for(&server), "hi").await;
    assert!(is_error_reply(&reply));
}

#[tokio::test]
async fn test_list_models_parses_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "llama3.2:latest", "size": 2019393189, "modified_at": "2024-05-01T10:00:00Z"},
                {"name": "phi3:mini"}
            ]
        })))
        .mount(&server)
        .await;

    let models = client_for(&server)
        .list_models()
        .await
        .expect("list should succeed");
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].name, "llama3.2:latest");
    assert_eq!(models[0].size, 2019393189);
    assert_eq!(models[1].size, 0);
}
