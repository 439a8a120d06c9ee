use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Completion endpoint error: {0}")]
    CompletionEndpoint(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Malformed tool arguments: {0}")]
    MalformedArguments(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
