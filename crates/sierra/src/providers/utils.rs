use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};

use crate::errors::AgentError;
use crate::models::message::{Message, Role};
use crate::models::tool::{Tool, ToolCallRequest};

/// Convert the internal message history to OpenAI's API message specification.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        match message.role {
            Role::System => {
                messages_spec.push(json!({
                    "role": "system",
                    "content": message.content,
                }));
            }
            Role::User => {
                messages_spec.push(json!({
                    "role": "user",
                    "content": message.content,
                }));
            }
            Role::Assistant => {
                let mut converted = json!({
                    "role": "assistant",
                    "content": message.content,
                });
                if let Some(tool_call) = &message.tool_call {
                    converted.as_object_mut().unwrap().insert(
                        "tool_calls".to_string(),
                        json!([{
                            "id": tool_call.id,
                            "type": "function",
                            "function": {
                                "name": sanitize_function_name(&tool_call.name),
                                "arguments": tool_call.arguments.to_string(),
                            }
                        }]),
                    );
                }
                messages_spec.push(converted);
            }
            Role::Tool => {
                messages_spec.push(json!({
                    "role": "tool",
                    "tool_call_id": message.tool_call_id,
                    "name": message.tool_name,
                    "content": message.content,
                }));
            }
        }
    }

    messages_spec
}

/// Convert the tool schema list to OpenAI's API tool specification.
///
/// Schemas are strict: the endpoint must not invent arguments beyond the
/// declared properties.
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
                "strict": true,
            }
        }));
    }

    Ok(result)
}

/// Convert an OpenAI chat-completions response to an assistant Message.
///
/// Only the first proposed tool call is kept even if the endpoint returns
/// several in one reply. A function name with invalid characters or an
/// argument payload that is not valid JSON fails the whole reply, since the
/// endpoint has violated the expected shape.
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = &response["choices"][0]["message"];

    let content = original
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let mut message = Message::assistant(content);

    if let Some(tool_calls) = original.get("tool_calls").and_then(|v| v.as_array()) {
        if let Some(tool_call) = tool_calls.first() {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();

            if !is_valid_function_name(&function_name) {
                return Err(AgentError::MalformedArguments(format!(
                    "function name '{}' has invalid characters, it must match [a-zA-Z0-9_-]+",
                    function_name
                ))
                .into());
            }

            let parsed = serde_json::from_str::<Value>(arguments).map_err(|e| {
                AgentError::MalformedArguments(format!(
                    "could not interpret tool arguments for call {}: {}",
                    id, e
                ))
            })?;

            message = message.with_tool_call(ToolCallRequest::new(id, function_name, parsed));
        }
    }

    Ok(message)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}

fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}
