use super::error::ToolResult;
use crate::llm::ToolSpec;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// The core trait for all tools the agent can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of the tool (e.g., "retrieve_context")
    fn name(&self) -> String;

    /// A human-readable description of what the tool does
    fn description(&self) -> String;

    /// The JSON Schema for the tool's arguments
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments
    async fn call(&self, arguments: Value) -> ToolResult<Value>;

    /// Output reported when a call exceeds `limit`; `None` surfaces `ToolError::Timeout`
    fn timeout_output(&self, _limit: Duration) -> Option<Value> {
        None
    }

    /// Description handed to the model
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name(),
            description: self.description(),
            parameters: self.parameters(),
        }
    }
}
