use serde_json::{json, Value};

use super::types::{ChatMessage, ResponseSchema, Role, ToolCall, ToolSpec, Usage};

/// Convert messages into the chat.completions `messages` array
pub fn messages_to_chat_payload(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            };
            let mut v = json!({"role": role, "content": m.content});
            if !m.tool_calls.is_empty() {
                v["tool_calls"] = Value::Array(
                    m.tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "id": tc.id,
                                "type": "function",
                                "function": {
                                    "name": tc.name,
                                    // Arguments travel as a JSON-encoded string
                                    "arguments": tc.arguments.to_string(),
                                }
                            })
                        })
                        .collect(),
                );
            }
            if let Some(id) = &m.tool_call_id {
                v["tool_call_id"] = json!(id);
            }
            v
        })
        .collect()
}

/// Convert tool specs into the chat.completions `tools` array
pub fn tools_to_chat_payload(tools: &[ToolSpec]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                }
            })
        })
        .collect()
}

pub fn response_format_payload(schema: &ResponseSchema) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": schema.name,
            "schema": schema.schema,
            "strict": true,
        }
    })
}

// Parsing helpers (public for testing)
pub fn parse_tool_calls_from_chat(v: &Value) -> Vec<ToolCall> {
    let mut calls = Vec::new();
    let Some(tc_arr) = v
        .get("choices")
        .and_then(|x| x.as_array())
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("message"))
        .and_then(|m| m.get("tool_calls"))
        .and_then(|x| x.as_array())
    else {
        return calls;
    };

    for (i, tc) in tc_arr.iter().enumerate() {
        let Some(func) = tc.get("function") else {
            continue;
        };
        let name = func
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("")
            .to_string();
        if name.is_empty() {
            continue;
        }
        let id = tc
            .get("id")
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("call_{i}"));
        let arguments = match func.get("arguments") {
            Some(Value::String(s)) => serde_json::from_str::<Value>(s).unwrap_or(json!({})),
            Some(v) => v.clone(),
            None => json!({}),
        };
        calls.push(ToolCall {
            id,
            name,
            arguments,
        });
    }
    calls
}

pub fn extract_text_from_chat_completions(v: &Value) -> Option<String> {
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}

pub fn extract_usage(v: &Value) -> Option<Usage> {
    v.get("usage")
        .and_then(|u| serde_json::from_value::<Usage>(u.clone()).ok())
}
