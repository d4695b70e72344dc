//! Maps an upstream chat-completion body onto [`ModelResponse`].
//!
//! Nested shapes degrade to defaults: a missing or oddly typed `choices`,
//! `message` or `content` yields empty text, and each usage counter falls back
//! to 0 on its own. Tool calls are read from the top-level `tool_calls` key,
//! falling back to `choices[0].message.tool_calls` where OpenAI-compatible
//! servers put them. Only a body that is not an object, or a `tool_calls`
//! value that is neither empty nor an array, is rejected.

use serde_json::{Map, Value};

use super::models::{ModelResponse, Usage};
use crate::error::{ClientError, Result};

pub fn normalize(body: &Value, model: &str) -> Result<ModelResponse> {
    let body = body.as_object().ok_or_else(|| {
        ClientError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(body)
        ))
    })?;

    let first_message = first_choice_message(body);
    let output_text = first_message
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let usage = body.get("usage").map(extract_usage).unwrap_or_default();

    // Some servers put tool calls on the message rather than the top level.
    let tool_calls = match body.get("tool_calls") {
        Some(value) if is_truthy(value) => extract_tool_calls(value)?,
        _ => match first_message.and_then(|message| message.get("tool_calls")) {
            Some(value) if is_truthy(value) => extract_tool_calls(value)?,
            _ => None,
        },
    };

    Ok(ModelResponse::new(
        model.to_string(),
        output_text,
        tool_calls,
        usage,
    ))
}

/// Only the first choice is ever consulted.
fn first_choice_message(body: &Map<String, Value>) -> Option<&Map<String, Value>> {
    body.get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .as_object()
}

fn extract_usage(value: &Value) -> Usage {
    let mut usage = Usage::default();
    let Some(counters) = value.as_object() else {
        return usage;
    };

    for (name, count) in counters {
        let Some(count) = count.as_u64() else {
            continue;
        };
        match name.as_str() {
            Usage::PROMPT_TOKENS => usage.prompt_tokens = count,
            Usage::COMPLETION_TOKENS => usage.completion_tokens = count,
            Usage::TOTAL_TOKENS => usage.total_tokens = count,
            other => {
                usage.extra.insert(other.to_string(), count);
            }
        }
    }
    usage
}

fn extract_tool_calls(value: &Value) -> Result<Option<Vec<Value>>> {
    match value {
        Value::Array(calls) => Ok(Some(calls.clone())),
        other => Err(ClientError::MalformedResponse(format!(
            "tool_calls must be an array, got {}",
            json_kind(other)
        ))),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
