//! Outcome command for Trellis.
//!
//! Submits an activity outcome for a learner and reports the resulting
//! mastery status. The engine retries once automatically on a version
//! conflict (reload-and-reapply), which covers the common case of two
//! quick submissions from the same terminal.

use serde::{Deserialize, Serialize};

use crate::core::MasteryStatus;
use crate::error::TrellisError;
use crate::pathway::{Outcome, PathwayEngine};
use crate::storage::ProfileStore;

/// Options for the outcome command.
#[derive(Debug, Clone, Default)]
pub struct OutcomeOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the outcome command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The objective the outcome applied to.
    pub lo_id: String,
    /// Resulting mastery status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MasteryStatus>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeOutput {
    /// Create a successful output.
    pub fn success(lo_id: impl Into<String>, status: MasteryStatus) -> Self {
        Self {
            success: true,
            lo_id: lo_id.into(),
            status: Some(status),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(lo_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            lo_id: lo_id.into(),
            status: None,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Outcome failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }
        match self.status {
            Some(status) => format!("{} is now {}", self.lo_id, status.display_name()),
            None => String::new(),
        }
    }
}

/// The outcome command implementation.
pub struct OutcomeCommand<S: ProfileStore> {
    engine: PathwayEngine<S>,
}

impl<S: ProfileStore> OutcomeCommand<S> {
    /// Create a new outcome command.
    pub fn new(engine: PathwayEngine<S>) -> Self {
        Self { engine }
    }

    /// Run the outcome command.
    pub fn run(&self, learner_id: &str, outcome: &Outcome, _options: &OutcomeOptions) -> OutcomeOutput {
        match self.submit_with_retry(learner_id, outcome) {
            Ok(status) => OutcomeOutput::success(outcome.lo_id.as_str(), status),
            Err(e) => OutcomeOutput::failure(outcome.lo_id.as_str(), e.to_string()),
        }
    }

    /// Submit, retrying once on a stale-version conflict.
    fn submit_with_retry(
        &self,
        learner_id: &str,
        outcome: &Outcome,
    ) -> Result<MasteryStatus, TrellisError> {
        match self.engine.submit_outcome(learner_id, outcome) {
            Err(e) if e.is_retryable() => {
                tracing::warn!(learner_id, "profile version conflict, retrying once");
                self.engine.submit_outcome(learner_id, outcome)
            }
            other => other,
        }
    }

    /// Format the output according to the options.
    pub fn format_output(&self, output: &OutcomeOutput, options: &OutcomeOptions) -> String {
        if options.quiet {
            return String::new();
        }
        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|e| {
                format!("{{\"success\":false,\"error\":\"serialization failed: {e}\"}}")
            })
        } else {
            output.format_text()
        }
    }
}
