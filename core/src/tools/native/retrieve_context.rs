use crate::context_store::{ContextRetriever, DEFAULT_N_RESULTS};
use crate::tools::{Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

pub const RETRIEVE_CONTEXT_TOOL: &str = "retrieve_context";

/// Exposes the context store to the agent.
///
/// Store failures and timeouts come back as `Ok` text; only malformed
/// arguments are errors.
pub struct RetrieveContextTool {
    retriever: ContextRetriever,
    default_n_results: usize,
}

impl RetrieveContextTool {
    pub fn new(retriever: ContextRetriever) -> Self {
        Self {
            retriever,
            default_n_results: DEFAULT_N_RESULTS,
        }
    }

    pub fn with_default_n_results(mut self, n: usize) -> Self {
        self.default_n_results = n.max(1);
        self
    }
}

#[async_trait]
impl Tool for RetrieveContextTool {
    fn name(&self) -> String {
        RETRIEVE_CONTEXT_TOOL.to_string()
    }

    fn description(&self) -> String {
        "Retrieve relevant documents about the represented person (background, skills, \
         experience, projects, verified contact information) from the context store."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query string"
                },
                "n_results": {
                    "type": "integer",
                    "description": format!("Number of top results to retrieve (default: {})", self.default_n_results)
                }
            },
            "required": ["query"]
        })
    }

    fn timeout_output(&self, limit: Duration) -> Option<Value> {
        Some(Value::String(self.retriever.timeout_message(limit)))
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query'".to_string()))?;

        let n_results = arguments["n_results"]
            .as_u64()
            .map(|n| n.max(1) as usize)
            .unwrap_or(self.default_n_results);

        let text = self.retriever.retrieve(query, n_results).await;
        Ok(Value::String(text))
    }
}
