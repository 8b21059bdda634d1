mod common;

use common::ScriptedModel;
use herald_core::guardrail::{Classifier, Decision, LlmGuardrail};
use herald_core::llm::Role;
use herald_core::HeraldError;

#[tokio::test]
async fn classification_call_is_deterministic_and_schema_bound() {
    let model = ScriptedModel::new();
    model.push_text(r#"{"decision":"ALLOWED"}"#);
    let guard = LlmGuardrail::new(model.clone(), "Aman Obaid");

    let decision = guard.classify("What is Aman's experience?").await.unwrap();
    assert_eq!(decision, Decision::Allowed);

    let req = model.last_request();
    assert_eq!(req.temperature, Some(0.0));
    assert!(req.tools.is_empty());
    let schema = req.response_schema.expect("response schema set");
    assert_eq!(
        schema.schema["properties"]["decision"]["enum"],
        serde_json::json!(["ALLOWED", "BLOCKED"])
    );

    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, Role::System);
    assert_eq!(req.messages[0].content, guard.policy());
    assert_eq!(req.messages[1].content, "What is Aman's experience?");
}

#[tokio::test]
async fn off_topic_query_is_blocked() {
    let model = ScriptedModel::new();
    model.push_text(r#"{"decision":"BLOCKED"}"#);
    let guard = LlmGuardrail::new(model, "Aman Obaid");

    assert_eq!(
        guard.classify("What's the weather today?").await.unwrap(),
        Decision::Blocked
    );
}

#[tokio::test]
async fn model_failure_is_a_classification_error() {
    let model = ScriptedModel::new();
    model.push_error("connection reset");
    let guard = LlmGuardrail::new(model, "Aman Obaid");

    let err = guard.classify("hi").await.unwrap_err();
    assert!(matches!(err, HeraldError::Classification(ref d) if d.contains("connection reset")));
}

#[tokio::test]
async fn free_text_reply_is_a_classification_error() {
    let model = ScriptedModel::new();
    model.push_text("Sure, that looks fine to me.");
    let guard = LlmGuardrail::new(model, "Aman Obaid");

    let err = guard.classify("hi").await.unwrap_err();
    assert!(matches!(err, HeraldError::Classification(_)));
}
