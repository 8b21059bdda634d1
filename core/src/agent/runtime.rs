use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::checkpoint::{CheckpointStore, ConversationState};
use super::persona::persona_prompt;
use super::summarizer::Summarizer;
use super::token_counter::default_counter;
use super::{Agent, AgentConfig, AgentResponse};
use crate::llm::{ChatMessage, ChatModel, CompletionRequest, ToolCall};
use crate::tools::{output_to_text, ToolRegistry};
use crate::{HeraldError, Result};

/// Tool-calling agent bound to the representative persona.
///
/// Each invocation loads the thread's history, appends the question and
/// alternates model turns with tool executions until the model answers
/// without requesting tools.
pub struct ToolCallingAgent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    checkpoints: Arc<dyn CheckpointStore>,
    summarizer: Summarizer,
    system_prompt: String,
    max_iterations: usize,
}

impl ToolCallingAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        checkpoints: Arc<dyn CheckpointStore>,
        config: &AgentConfig,
    ) -> Self {
        let summarizer = Summarizer::new(model.clone(), default_counter(), config.summarization);
        Self {
            model,
            tools,
            checkpoints,
            summarizer,
            system_prompt: persona_prompt(&config.subject_name),
            max_iterations: config.max_iterations.max(1),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Execute one tool call; failures become text the model can read
    async fn run_tool(&self, call: &ToolCall) -> String {
        let started = Instant::now();
        let output = match self.tools.call(&call.name, call.arguments.clone()).await {
            Ok(value) => output_to_text(&value),
            Err(e) => {
                warn!(target: "agent", tool = %call.name, error = %e, "Tool call failed");
                format!("Error: {e}")
            }
        };
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(target: "agent", tool = %call.name, latency_ms = %latency_ms, "Tool invocation finished");
        output
    }

    fn build_request(&self, state: &ConversationState) -> CompletionRequest {
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(state.messages.iter().cloned());
        CompletionRequest::new(messages).with_tools(self.tools.specs())
    }
}

#[async_trait]
impl Agent for ToolCallingAgent {
    #[tracing::instrument(name = "agent.invoke", skip_all, fields(thread_id = %thread_id))]
    async fn invoke(&self, query: &str, thread_id: &str) -> Result<AgentResponse> {
        let mut state = self
            .checkpoints
            .get(thread_id)
            .await?
            .unwrap_or_else(|| ConversationState::new(thread_id));
        debug!(target: "agent", history = state.messages.len(), "Thread loaded");

        state.messages.push(ChatMessage::user(query));
        let mut tool_calls: Vec<ToolCall> = Vec::new();

        for step in 0..self.max_iterations {
            self.summarizer.maybe_summarize(&mut state).await?;

            let completion = self.model.complete(self.build_request(&state)).await?;
            if let Some(usage) = completion.usage {
                debug!(
                    target: "agent",
                    step,
                    model = ?completion.model,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Model turn usage"
                );
            }
            let reply = completion.message;
            let calls = reply.tool_calls.clone();
            state.messages.push(reply);

            if calls.is_empty() {
                debug!(target: "agent", step, tool_calls = tool_calls.len(), "Final answer produced");
                self.checkpoints.put(state.clone()).await?;
                return Ok(AgentResponse {
                    thread_id: thread_id.to_string(),
                    messages: state.messages,
                    tool_calls,
                });
            }

            // Sequential, in the order the model requested them
            for call in &calls {
                let output = self.run_tool(call).await;
                state
                    .messages
                    .push(ChatMessage::tool(call.id.clone(), call.name.clone(), output));
            }
            tool_calls.extend(calls);
            self.checkpoints.put(state.clone()).await?;
        }

        warn!(target: "agent", max_iterations = self.max_iterations, "Step limit reached");
        Err(HeraldError::Agent(format!(
            "No final answer after {} model turns",
            self.max_iterations
        )))
    }
}
