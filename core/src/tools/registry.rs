use super::error::{ToolError, ToolResult};
use super::traits::Tool;
use crate::llm::ToolSpec;
use dashmap::DashMap;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, UpDownCounter},
    KeyValue,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// A registry for managing available tools
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Arc<DashMap<String, Arc<dyn Tool>>>,
    call_timeout: Duration,

    // OpenTelemetry metrics
    invocations_counter: Counter<u64>,
    errors_counter: Counter<u64>,
    timeouts_counter: Counter<u64>,
    invoke_latency: Histogram<f64>,
    registered_tools_gauge: UpDownCounter<i64>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TOOL_TIMEOUT)
    }

    pub fn with_timeout(call_timeout: Duration) -> Self {
        let meter = global::meter("herald.tool_registry");

        let invocations_counter = meter
            .u64_counter("herald.tool_registry.invocations_total")
            .with_description("Total number of tool invocations")
            .init();

        let errors_counter = meter
            .u64_counter("herald.tool_registry.errors_total")
            .with_description("Total number of tool errors")
            .init();

        let timeouts_counter = meter
            .u64_counter("herald.tool_registry.timeouts_total")
            .with_description("Total number of tool timeouts")
            .init();

        let invoke_latency = meter
            .f64_histogram("herald.tool_registry.invoke_latency_ms")
            .with_description("Tool invocation latency in milliseconds")
            .init();

        let registered_tools_gauge = meter
            .i64_up_down_counter("herald.tool_registry.registered_tools")
            .with_description("Number of registered tools")
            .init();

        Self {
            tools: Arc::new(DashMap::new()),
            call_timeout,
            invocations_counter,
            errors_counter,
            timeouts_counter,
            invoke_latency,
            registered_tools_gauge,
        }
    }

    /// Register a new tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        info!(target: "tool_registry", tool = %name, "Registering tool");

        if self.tools.insert(name, tool).is_none() {
            self.registered_tools_gauge.add(1, &[]);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|t| t.clone())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Tool specs sorted by name
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.iter().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Call a tool by name with timeout.
    ///
    /// A tool that supplies `timeout_output` answers with it instead of
    /// `ToolError::Timeout`; the timeout is still counted.
    #[tracing::instrument(skip(self, arguments), fields(tool.name = %name))]
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> ToolResult<serde_json::Value> {
        let start_time = std::time::Instant::now();

        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        debug!(target: "tool_registry", tool = %name, "Invoking tool");

        let result = match timeout(self.call_timeout, tool.call(arguments)).await {
            Ok(res) => res,
            Err(_) => {
                warn!(target: "tool_registry", tool = %name, "Tool execution timed out");
                self.timeouts_counter
                    .add(1, &[KeyValue::new("tool", name.to_string())]);
                tool.timeout_output(self.call_timeout)
                    .ok_or(ToolError::Timeout)
            }
        };

        let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        self.invoke_latency
            .record(elapsed_ms, &[KeyValue::new("tool", name.to_string())]);

        match &result {
            Ok(_) => {
                debug!(target: "tool_registry", tool = %name, latency_ms = %elapsed_ms, "Tool execution finished");
                self.invocations_counter.add(
                    1,
                    &[
                        KeyValue::new("tool", name.to_string()),
                        KeyValue::new("status", "success"),
                    ],
                );
            }
            Err(e) => {
                warn!(target: "tool_registry", tool = %name, error = %e, latency_ms = %elapsed_ms, "Tool execution failed");
                self.errors_counter.add(
                    1,
                    &[
                        KeyValue::new("tool", name.to_string()),
                        KeyValue::new("error", e.to_string()),
                    ],
                );
            }
        }

        result
    }
}
