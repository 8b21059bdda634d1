use herald_core::llm::{
    extract_text_from_chat_completions, parse_tool_calls_from_chat, ChatMessage, ChatModel,
    CompletionRequest, Embedder, LlmClient, LlmClientConfig, ResponseSchema, ToolSpec,
};
use herald_core::HeraldError;
use mockito::{Matcher, Server};
use serde_json::json;

fn client() -> LlmClient {
    LlmClient::new(LlmClientConfig {
        base_url: "http://localhost:9999/v1/".to_string(),
        model: "test-model".to_string(),
        embedding_model: "test-embed".to_string(),
        api_key: None,
        request_timeout_ms: 1_000,
        temperature: 0.7,
    })
    .unwrap()
}

fn client_for(server: &Server) -> LlmClient {
    LlmClient::new(LlmClientConfig {
        base_url: format!("{}/v1", server.url()),
        model: "test-model".to_string(),
        embedding_model: "test-embed".to_string(),
        api_key: Some("sk-test".to_string()),
        request_timeout_ms: 5_000,
        temperature: 0.7,
    })
    .unwrap()
}

fn retrieve_spec() -> ToolSpec {
    ToolSpec {
        name: "retrieve_context".to_string(),
        description: "Look up profile documents".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        }),
    }
}

#[test]
fn test_parse_chat_multiple_tool_calls() {
    let resp = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {"id": "call_a", "type": "function", "function": {"name": "retrieve_context", "arguments": "{\"query\":\"skills\"}"}},
                    {"id": "call_b", "type": "function", "function": {"name": "tavily_search", "arguments": "{\"query\":\"Rust news\"}"}}
                ]
            }
        }]
    });

    let calls = parse_tool_calls_from_chat(&resp);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].id, "call_a");
    assert_eq!(calls[0].name, "retrieve_context");
    assert_eq!(calls[0].arguments["query"], "skills");
    assert_eq!(calls[1].name, "tavily_search");
    assert_eq!(extract_text_from_chat_completions(&resp), None);
}

#[test]
fn test_parse_chat_malformed_arguments() {
    let resp = json!({
        "choices": [{
            "message": {
                "tool_calls": [
                    {"id": "call_1", "function": {"name": "retrieve_context", "arguments": "{not json"}}
                ]
            }
        }]
    });

    let calls = parse_tool_calls_from_chat(&resp);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arguments, json!({}));
}

#[test]
fn test_parse_chat_text_only() {
    let resp = json!({
        "choices": [{"message": {"role": "assistant", "content": "Aman leads the platform team."}}]
    });

    assert!(parse_tool_calls_from_chat(&resp).is_empty());
    assert_eq!(
        extract_text_from_chat_completions(&resp).as_deref(),
        Some("Aman leads the platform team.")
    );
}

#[test]
fn chat_body_omits_tools_when_none() {
    let body = client().build_chat_body(&CompletionRequest::new(vec![ChatMessage::user("hi")]));

    assert_eq!(body["model"], "test-model");
    assert_eq!(body["messages"][0]["role"], "user");
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
    assert!(body.get("response_format").is_none());
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

#[test]
fn chat_body_carries_tools_and_choice() {
    let request = CompletionRequest::new(vec![ChatMessage::user("What is Aman's email?")])
        .with_tools(vec![retrieve_spec()]);
    let body = client().build_chat_body(&request);

    assert_eq!(body["tool_choice"], "auto");
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "retrieve_context");
    assert_eq!(body["tools"][0]["function"]["parameters"]["required"], json!(["query"]));
}

#[test]
fn chat_body_structured_output() {
    let request = CompletionRequest::new(vec![ChatMessage::user("classify me")])
        .with_temperature(0.0)
        .with_response_schema(ResponseSchema {
            name: "guardrail_decision".to_string(),
            schema: json!({"type": "object"}),
        });
    let body = client().build_chat_body(&request);

    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], "guardrail_decision");
    assert_eq!(body["response_format"]["json_schema"]["strict"], true);
}

#[test]
fn client_exposes_config() {
    let c = client();
    assert_eq!(c.config().model, "test-model");
    assert_eq!(c.config().embedding_model, "test-embed");
}

#[tokio::test]
async fn complete_posts_chat_body_and_reads_reply() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "test-model",
            "messages": [{"role": "user", "content": "hi"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "model": "test-model-2024",
                "choices": [{"message": {"role": "assistant", "content": "Hello there."}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let completion = client_for(&server)
        .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap();

    assert_eq!(completion.message, ChatMessage::assistant("Hello there."));
    assert_eq!(completion.model.as_deref(), Some("test-model-2024"));
    assert_eq!(completion.usage.map(|u| u.total_tokens), Some(15));
    m.assert_async().await;
}

#[tokio::test]
async fn complete_error_status_is_llm_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let err = client_for(&server)
        .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();
    match err {
        HeraldError::Llm(msg) => {
            assert!(msg.contains("status=500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn complete_rejects_empty_reply() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
        .await
        .unwrap_err();
    assert!(matches!(err, HeraldError::Llm(_)));
}

#[tokio::test]
async fn embed_returns_first_vector() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/v1/embeddings")
        .match_body(Matcher::PartialJson(json!({"model": "test-embed", "input": "skills"})))
        .with_status(200)
        .with_body(r#"{"data": [{"index": 0, "embedding": [0.25, -0.5, 1.0]}]}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.embed("skills").await.unwrap(), vec![0.25, -0.5, 1.0]);
    assert_eq!(client.model_name(), "test-embed");
    m.assert_async().await;
}

#[tokio::test]
async fn embed_error_status_is_llm_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/v1/embeddings")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let err = client_for(&server).embed("skills").await.unwrap_err();
    match err {
        HeraldError::Llm(msg) => assert!(msg.contains("status=429")),
        other => panic!("unexpected error: {other:?}"),
    }
}
