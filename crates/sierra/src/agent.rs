use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use crate::errors::AgentResult;
use crate::models::message::Message;
use crate::providers::base::Provider;
use crate::session::{ChatSession, CompletionResponse};
use crate::tools::ToolRegistry;

pub const FALLBACK_REPLY: &str =
    "I'm sorry, I couldn't process that request. Could you try again?";
pub const TOOL_LIMIT_REPLY: &str =
    "I'm sorry, I couldn't complete that request. Could you try again?";
pub const FALLBACK_GREETING: &str = "Welcome to Sierra Outfitters! How can I help you today?";

/// Upper bound on tool rounds within one user turn. Past it the turn fails
/// closed instead of looping on an endpoint that keeps requesting tools.
const MAX_TOOL_ROUNDS: usize = 8;

/// The control loop alternating between endpoint calls and tool execution
/// until a user-facing answer exists.
pub struct SupportAgent {
    session: ChatSession,
    tools: ToolRegistry,
}

impl SupportAgent {
    pub fn new(provider: Arc<dyn Provider>, system_prompt: &str, tools: ToolRegistry) -> Self {
        Self {
            session: ChatSession::new(provider, system_prompt),
            tools,
        }
    }

    /// Process one user message, running any requested tools, and produce a
    /// user-facing reply. Failures never escape: every path resolves to a
    /// human-readable string.
    pub async fn process_message(&mut self, message: &str) -> String {
        match self.run_turn(message).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error in process_message: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn run_turn(&mut self, message: &str) -> AgentResult<String> {
        let schemas = self.tools.schemas();
        let mut response = self.session.send_user_message(message, &schemas).await?;

        for _ in 0..MAX_TOOL_ROUNDS {
            let call = match response {
                CompletionResponse::Text(text) => return Ok(text),
                CompletionResponse::ToolCall(call) => call,
            };

            let result = match self.tools.execute(&call.name, call.arguments.clone()).await {
                Ok(value) => value,
                Err(e) => {
                    // Shown to the model as an error-shaped result so it can
                    // retry or apologize coherently
                    error!("Error executing function {}: {}", call.name, e);
                    json!({"error": e.to_string()})
                }
            };

            response = self
                .session
                .submit_tool_result(&call.id, &call.name, &result, &schemas)
                .await?;
        }

        if let CompletionResponse::Text(text) = response {
            return Ok(text);
        }

        warn!("tool round limit reached after {} rounds", MAX_TOOL_ROUNDS);
        Ok(TOOL_LIMIT_REPLY.to_string())
    }

    /// Generate a simple response without tool calling, for instructions
    /// like greetings. This path always produces something user-visible.
    pub async fn generate_response(&mut self, instruction: &str) -> String {
        let prompt = format!("{}.", instruction.to_lowercase());
        match self.session.send_user_message(&prompt, &[]).await {
            Ok(CompletionResponse::Text(text)) => text,
            Ok(CompletionResponse::ToolCall(_)) => {
                warn!("unexpected tool call on a no-tool instruction");
                FALLBACK_GREETING.to_string()
            }
            Err(e) => {
                error!("Error in generate_response: {}", e);
                FALLBACK_GREETING.to_string()
            }
        }
    }

    pub fn history(&self) -> &[Message] {
        self.session.history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Role;
    use crate::models::tool::{Tool, ToolCallRequest};
    use crate::providers::mock::MockProvider;
    use crate::tools::FunctionTool;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::Value;

    struct EchoTool;

    #[async_trait]
    impl FunctionTool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn definition(&self) -> Tool {
            Tool::new(
                "echo",
                "Echoes back the input",
                json!({
                    "type": "object",
                    "properties": {"message": {"type": "string"}},
                    "required": ["message"],
                    "additionalProperties": false
                }),
            )
        }

        async fn execute(&self, arguments: Value) -> Result<Value> {
            if arguments.get("explode").is_some() {
                return Err(anyhow!("echo exploded"));
            }
            Ok(json!({
                "message": arguments.get("message").and_then(|v| v.as_str()).unwrap_or_default()
            }))
        }
    }

    fn agent_with(responses: Vec<Message>) -> SupportAgent {
        SupportAgent::new(
            Arc::new(MockProvider::new(responses)),
            "You are a support agent.",
            ToolRegistry::new(vec![Box::new(EchoTool)]),
        )
    }

    fn tool_call(id: &str, name: &str, arguments: Value) -> Message {
        Message::assistant("").with_tool_call(ToolCallRequest::new(id, name, arguments))
    }

    #[tokio::test]
    async fn test_simple_response() {
        let mut agent = agent_with(vec![Message::assistant("Hello!")]);
        let reply = agent.process_message("Hi").await;
        assert_eq!(reply, "Hello!");
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let mut agent = agent_with(vec![
            tool_call("call_1", "echo", json!({"message": "test"})),
            Message::assistant("Done!"),
        ]);

        let reply = agent.process_message("Echo test").await;
        assert_eq!(reply, "Done!");

        // The tool result made it into history against the right call
        let tool_message = agent
            .history()
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert!(tool_message.content.contains("test"));
    }

    #[tokio::test]
    async fn test_unknown_tool_keeps_the_loop_alive() {
        let mut agent = agent_with(vec![
            tool_call("call_1", "invalid_tool", json!({})),
            Message::assistant("Sorry, that did not work."),
        ]);

        let reply = agent.process_message("Try something").await;
        assert_eq!(reply, "Sorry, that did not work.");

        let tool_message = agent
            .history()
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_message.content.contains("Unknown function: invalid_tool"));
    }

    #[tokio::test]
    async fn test_execution_failure_is_reported_to_the_model() {
        let mut agent = agent_with(vec![
            tool_call("call_1", "echo", json!({"explode": true})),
            Message::assistant("Something went wrong with that lookup."),
        ]);

        let reply = agent.process_message("Blow up").await;
        assert_eq!(reply, "Something went wrong with that lookup.");

        let tool_message = agent
            .history()
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert!(tool_message.content.contains("echo exploded"));
    }

    #[tokio::test]
    async fn test_endpoint_failure_yields_apology() {
        let mut agent = SupportAgent::new(
            Arc::new(MockProvider::failing()),
            "You are a support agent.",
            ToolRegistry::new(vec![Box::new(EchoTool)]),
        );

        let reply = agent.process_message("Hello").await;
        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_tool_round_limit_fails_closed() {
        // The endpoint requests a tool on every reply, past the round limit
        let responses: Vec<Message> = (0..12)
            .map(|i| tool_call(&format!("call_{}", i), "echo", json!({"message": "again"})))
            .collect();
        let mut agent = agent_with(responses);

        let reply = agent.process_message("Loop forever").await;
        assert_eq!(reply, TOOL_LIMIT_REPLY);
    }

    #[tokio::test]
    async fn test_generate_response_lowercases_instruction() {
        let mut agent = agent_with(vec![Message::assistant("Welcome aboard!")]);

        let reply = agent.generate_response("Send a Greeting to User").await;
        assert_eq!(reply, "Welcome aboard!");

        let user_message = agent
            .history()
            .iter()
            .find(|m| m.role == Role::User)
            .unwrap();
        assert_eq!(user_message.content, "send a greeting to user.");
    }

    #[tokio::test]
    async fn test_generate_response_fallback_on_failure() {
        let mut agent = SupportAgent::new(
            Arc::new(MockProvider::failing()),
            "You are a support agent.",
            ToolRegistry::new(vec![]),
        );

        let reply = agent.generate_response("send a greeting to user").await;
        assert_eq!(reply, FALLBACK_GREETING);
    }
}
