//! Token Counting
//!
//! Approximate token counts used to decide when history needs summarizing.

use crate::llm::ChatMessage;
use std::sync::Arc;

/// Token counting interface
pub trait TokenCounter: Send + Sync {
    /// Count tokens in text
    fn count_text(&self, text: &str) -> usize;

    /// Count tokens for one chat message, including tool-call payloads
    fn count_message(&self, message: &ChatMessage) -> usize {
        let mut tokens = self.count_text(&message.content);
        for call in &message.tool_calls {
            tokens += self.count_text(&call.name) + self.count_text(&call.arguments.to_string());
        }
        // Role and framing overhead
        tokens + 4
    }

    fn count_messages(&self, messages: &[ChatMessage]) -> usize {
        messages.iter().map(|m| self.count_message(m)).sum()
    }
}

/// Character-based estimator.
///
/// Average 4 characters per token for English prose, plus 10% for special
/// tokens. No tokenizer tables are bundled.
pub struct ApproxTokenCounter {
    chars_per_token: f32,
}

impl Default for ApproxTokenCounter {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl ApproxTokenCounter {
    pub fn new(chars_per_token: f32) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1.0),
        }
    }
}

impl TokenCounter for ApproxTokenCounter {
    fn count_text(&self, text: &str) -> usize {
        let base_estimate = (text.chars().count() as f32 / self.chars_per_token).ceil() as usize;
        base_estimate + (base_estimate / 10)
    }
}

/// Create the shared default counter
pub fn default_counter() -> Arc<dyn TokenCounter> {
    Arc::new(ApproxTokenCounter::default())
}
