use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, Role};
use crate::models::tool::{Tool, ToolCallRequest};
use crate::providers::base::Provider;

/// What a completed endpoint exchange resolved to: either a user-facing
/// answer or a request to run one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionResponse {
    Text(String),
    ToolCall(ToolCallRequest),
}

/// Owner of one conversation's ordered history and the channel to the
/// completion endpoint.
///
/// The history starts with exactly one system message and only ever grows;
/// messages are never mutated or removed. The session knows nothing about
/// tool semantics, only the generic shape of a function-call reply.
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, system_prompt: &str) -> Self {
        Self {
            provider,
            history: vec![Message::system(system_prompt)],
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Append a user message, ask the endpoint for the next turn, and append
    /// its reply verbatim. On endpoint failure the user message stays in
    /// history so a later call retains context.
    pub async fn send_user_message(
        &mut self,
        text: &str,
        tools: &[Tool],
    ) -> AgentResult<CompletionResponse> {
        self.history.push(Message::user(text));
        self.complete_turn(tools).await
    }

    /// Feed a tool result back to the endpoint against its originating call.
    ///
    /// A `call_id` that does not match an outstanding assistant tool-call is
    /// rejected without touching history; it is never matched to the wrong
    /// call. The reply may itself be another tool call, enabling chains.
    pub async fn submit_tool_result(
        &mut self,
        call_id: &str,
        tool_name: &str,
        result: &Value,
        tools: &[Tool],
    ) -> AgentResult<CompletionResponse> {
        if !self.has_outstanding_call(call_id) {
            error!("Rejected tool result for unmatched call id {}", call_id);
            return Err(AgentError::CompletionEndpoint(format!(
                "tool result submitted for unknown call id: {}",
                call_id
            )));
        }

        self.history
            .push(Message::tool_result(call_id, tool_name, result.to_string()));
        self.complete_turn(tools).await
    }

    /// True when `call_id` was requested by an assistant turn and has not
    /// been answered by a tool-result turn yet.
    fn has_outstanding_call(&self, call_id: &str) -> bool {
        let requested = self
            .history
            .iter()
            .filter(|m| {
                m.tool_call
                    .as_ref()
                    .map(|call| call.id == call_id)
                    .unwrap_or(false)
            })
            .count();
        let answered = self
            .history
            .iter()
            .filter(|m| m.role == Role::Tool && m.tool_call_id.as_deref() == Some(call_id))
            .count();
        requested > answered
    }

    async fn complete_turn(&mut self, tools: &[Tool]) -> AgentResult<CompletionResponse> {
        let (reply, usage) = match self.provider.complete(&self.history, tools).await {
            Ok(ok) => ok,
            Err(e) => {
                error!("Error in response generation: {}", e);
                return Err(match e.downcast::<AgentError>() {
                    Ok(err @ AgentError::MalformedArguments(_)) => err,
                    Ok(other) => AgentError::CompletionEndpoint(other.to_string()),
                    Err(other) => AgentError::CompletionEndpoint(other.to_string()),
                });
            }
        };

        debug!(
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            "completion finished"
        );

        self.history.push(reply.clone());

        match reply.tool_call {
            Some(call) => Ok(CompletionResponse::ToolCall(call)),
            None => Ok(CompletionResponse::Text(reply.content.trim().to_string())),
        }
    }
}
