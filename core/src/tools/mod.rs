pub mod error;
pub mod native;
pub mod registry;
pub mod traits;

// Re-export common types
pub use error::{ToolError, ToolResult};
pub use registry::ToolRegistry;
pub use traits::Tool;

use serde_json::Value;

/// Render tool output as the plain text the model observes
pub fn output_to_text(output: &Value) -> String {
    match output {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
