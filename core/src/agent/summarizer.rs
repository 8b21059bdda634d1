//! History summarization.
//!
//! Once a thread's history grows past a token threshold, everything except
//! the most recent messages is folded into a single summary message.

use super::checkpoint::ConversationState;
use super::token_counter::TokenCounter;
use crate::llm::{ChatMessage, ChatModel, CompletionRequest, Role};
use crate::{HeraldError, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub const SUMMARY_PREFIX: &str = "Here is a summary of the conversation to date:\n\n";

const SUMMARY_INSTRUCTIONS: &str = "Summarize the conversation below between a recruiter and \
an assistant representing a candidate. Keep every concrete fact that was shared (names, roles, \
dates, skills, contact details, open questions) and drop pleasantries. Write in plain prose.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummarizationConfig {
    pub max_tokens_before_summary: usize,
    pub messages_to_keep: usize,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            max_tokens_before_summary: 2000,
            messages_to_keep: 11,
        }
    }
}

pub struct Summarizer {
    model: Arc<dyn ChatModel>,
    counter: Arc<dyn TokenCounter>,
    config: SummarizationConfig,
}

impl Summarizer {
    pub fn new(
        model: Arc<dyn ChatModel>,
        counter: Arc<dyn TokenCounter>,
        config: SummarizationConfig,
    ) -> Self {
        Self {
            model,
            counter,
            config,
        }
    }

    pub fn config(&self) -> SummarizationConfig {
        self.config
    }

    /// Summarize `state` in place when over threshold. Returns whether a
    /// summary was produced.
    pub async fn maybe_summarize(&self, state: &mut ConversationState) -> Result<bool> {
        let total = self.counter.count_messages(&state.messages);
        state.summary.last_token_count = total;
        state.summary.messages_to_keep = self.config.messages_to_keep;

        if total <= self.config.max_tokens_before_summary {
            return Ok(false);
        }

        let cutoff = find_safe_cutoff(&state.messages, self.config.messages_to_keep);
        if cutoff == 0 {
            debug!(target: "summarizer", thread_id = %state.thread_id, tokens = total, "Over threshold but nothing old enough to summarize");
            return Ok(false);
        }

        let summary = self.summarize(&state.messages[..cutoff]).await?;
        let kept = state.messages.split_off(cutoff);
        state.messages = std::iter::once(ChatMessage::user(format!("{SUMMARY_PREFIX}{summary}")))
            .chain(kept)
            .collect();
        state.summary.summaries += 1;
        state.summary.last_token_count = self.counter.count_messages(&state.messages);

        info!(
            target: "summarizer",
            thread_id = %state.thread_id,
            summarized = cutoff,
            tokens_before = total,
            tokens_after = state.summary.last_token_count,
            "History summarized"
        );
        Ok(true)
    }

    async fn summarize(&self, messages: &[ChatMessage]) -> Result<String> {
        let prompt = format!(
            "{SUMMARY_INSTRUCTIONS}\n\nConversation:\n{}",
            render_transcript(messages)
        );
        let completion = self
            .model
            .complete(CompletionRequest::new(vec![ChatMessage::user(prompt)]))
            .await?;
        let text = completion.message.content.trim().to_string();
        if text.is_empty() {
            return Err(HeraldError::Agent("Summarization returned no text".into()));
        }
        Ok(text)
    }
}

/// Index splitting `messages` into (summarized, kept).
///
/// Keeps at least `messages_to_keep` trailing messages and never leaves a
/// tool result in the kept part without the assistant turn that requested it.
pub fn find_safe_cutoff(messages: &[ChatMessage], messages_to_keep: usize) -> usize {
    let mut cutoff = messages.len().saturating_sub(messages_to_keep);
    while cutoff > 0 && cutoff < messages.len() && messages[cutoff].role == Role::Tool {
        cutoff -= 1;
    }
    cutoff
}

fn render_transcript(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for m in messages {
        match m.role {
            Role::System => continue,
            Role::User => out.push_str(&format!("User: {}\n", m.content)),
            Role::Assistant => {
                if !m.content.is_empty() {
                    out.push_str(&format!("Assistant: {}\n", m.content));
                }
                for call in &m.tool_calls {
                    out.push_str(&format!("Assistant called {}({})\n", call.name, call.arguments));
                }
            }
            Role::Tool => out.push_str(&format!(
                "Tool {}: {}\n",
                m.name.as_deref().unwrap_or("result"),
                m.content
            )),
        }
    }
    out
}
