use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::tool::ToolCallRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One turn in a conversation.
///
/// Messages are appended to a session's history in chronological order and
/// never mutated or removed afterwards. `tool_call` is only present on
/// assistant turns that request a function; `tool_call_id` and `tool_name`
/// are only present on tool-result turns and link back to the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub created: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: content.into(),
            tool_call: None,
            tool_call_id: None,
            tool_name: None,
        }
    }

    /// Create a system message with the current timestamp
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message with the current timestamp
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message with the current timestamp
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attach a proposed function call to an assistant message
    pub fn with_tool_call(mut self, tool_call: ToolCallRequest) -> Self {
        self.tool_call = Some(tool_call);
        self
    }

    /// Create a tool-result message linked back to the originating call
    pub fn tool_result<I, N, S>(call_id: I, tool_name: N, content: S) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut message = Self::new(Role::Tool, content);
        message.tool_call_id = Some(call_id.into());
        message.tool_name = Some(tool_name.into());
        message
    }

    pub fn has_tool_call(&self) -> bool {
        self.tool_call.is_some()
    }
}
