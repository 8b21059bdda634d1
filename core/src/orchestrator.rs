//! Query orchestrator: guardrail first, agent second.

use crate::agent::{Agent, AgentResponse};
use crate::guardrail::{Classifier, Decision};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Failure of one query, tagged by the step that failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Error classifying query: {0}")]
    Classification(String),

    #[error("Error querying agent: {0}")]
    AgentInvocation(String),
}

/// Successful outcome of one query
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// The guardrail let the query through and the agent answered
    Answered(AgentResponse),
    /// The guardrail blocked the query; a single synthetic refusal message
    Rejected(AgentResponse),
}

impl QueryOutcome {
    pub fn response(&self) -> &AgentResponse {
        match self {
            QueryOutcome::Answered(r) | QueryOutcome::Rejected(r) => r,
        }
    }

    pub fn final_text(&self) -> &str {
        self.response().final_text()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, QueryOutcome::Rejected(_))
    }
}

/// Sequences Classify → Answer for each query
pub struct QueryOrchestrator {
    classifier: Arc<dyn Classifier>,
    agent: Arc<dyn Agent>,
    rejection_message: String,
}

impl QueryOrchestrator {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        agent: Arc<dyn Agent>,
        rejection_message: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            agent,
            rejection_message: rejection_message.into(),
        }
    }

    pub fn rejection_message(&self) -> &str {
        &self.rejection_message
    }

    #[tracing::instrument(name = "orchestrator.query", skip_all, fields(thread_id = %thread_id))]
    pub async fn query(&self, question: &str, thread_id: &str) -> Result<QueryOutcome, QueryError> {
        let decision = self.classifier.classify(question).await.map_err(|e| {
            warn!(target: "orchestrator", error = %e, "Classification failed");
            QueryError::Classification(e.to_string())
        })?;

        if decision == Decision::Blocked {
            info!(target: "orchestrator", "Query rejected");
            return Ok(QueryOutcome::Rejected(AgentResponse::single(
                thread_id,
                self.rejection_message.clone(),
            )));
        }

        let response = self.agent.invoke(question, thread_id).await.map_err(|e| {
            warn!(target: "orchestrator", error = %e, "Agent invocation failed");
            QueryError::AgentInvocation(e.to_string())
        })?;
        info!(target: "orchestrator", messages = response.messages.len(), "Query answered");
        Ok(QueryOutcome::Answered(response))
    }

    /// Query and flatten the outcome into the single string the HTTP API returns
    pub async fn answer(&self, question: &str, thread_id: &str) -> String {
        match self.query(question, thread_id).await {
            Ok(outcome) => outcome.final_text().to_string(),
            Err(e) => e.to_string(),
        }
    }
}
