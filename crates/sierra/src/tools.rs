use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::error;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

pub mod check_promotion;
pub mod lookup_order;
pub mod recommend_product;

/// One locally executable capability exposed to the model via a schema.
///
/// Capabilities are stateless with respect to the conversation; they may hold
/// references to data stores but never to session state.
#[async_trait]
pub trait FunctionTool: Send + Sync {
    /// Unique key in the registry
    fn name(&self) -> &str;

    /// The schema advertised to the completion endpoint
    fn definition(&self) -> Tool;

    /// Execute with the model-supplied arguments
    async fn execute(&self, arguments: Value) -> Result<Value>;
}

/// The fixed set of capabilities plus dispatch-by-name.
pub struct ToolRegistry {
    tools: Vec<Box<dyn FunctionTool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Box<dyn FunctionTool>>) -> Self {
        Self { tools }
    }

    /// Schemas in registration order, stable across calls.
    pub fn schemas(&self) -> Vec<Tool> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Execute a capability by name.
    ///
    /// An unregistered name yields an error-shaped result rather than an
    /// error, so it can be fed back to the model for self-correction. A
    /// capability failure is an error the caller decides how to surface.
    pub async fn execute(&self, name: &str, arguments: Value) -> AgentResult<Value> {
        match self.tools.iter().find(|tool| tool.name() == name) {
            Some(tool) => tool.execute(arguments).await.map_err(|e| {
                error!("Error executing function {}: {}", name, e);
                AgentError::ToolExecution(e.to_string())
            }),
            None => {
                error!("Unknown function: {}", name);
                Ok(json!({"error": format!("Unknown function: {}", name)}))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

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
            let message = arguments
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            Ok(json!({"message": message}))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl FunctionTool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn definition(&self) -> Tool {
            Tool::new(
                "broken",
                "Always fails",
                json!({"type": "object", "properties": {}, "required": [], "additionalProperties": false}),
            )
        }

        async fn execute(&self, _arguments: Value) -> Result<Value> {
            Err(anyhow!("store unavailable"))
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new(vec![Box::new(EchoTool), Box::new(BrokenTool)])
    }

    #[test]
    fn test_schemas_follow_registration_order_and_are_idempotent() {
        let registry = registry();
        let first = registry.schemas();
        let second = registry.schemas();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "echo");
        assert_eq!(first[1].name, "broken");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_name() {
        let registry = registry();
        let result = registry
            .execute("echo", json!({"message": "hi"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"message": "hi"}));
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_error_shaped_result() {
        let registry = registry();
        let result = registry.execute("missing", json!({})).await.unwrap();
        assert_eq!(result["error"], "Unknown function: missing");
    }

    #[tokio::test]
    async fn test_execution_failure_is_an_error() {
        let registry = registry();
        let err = registry.execute("broken", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolExecution(_)));
        assert!(err.to_string().contains("store unavailable"));
    }
}
