//! Profile command for Trellis.
//!
//! Shows a learner's mastery state: per-objective status, preferences, and
//! recent performance history.

use serde::{Deserialize, Serialize};

use crate::catalog::CurriculumCatalog;
use crate::core::{LearnerProfile, MasteryStatus};
use crate::pathway::EligibilityResolver;
use crate::storage::ProfileStore;

/// Options for the profile command.
#[derive(Debug, Clone, Default)]
pub struct ProfileOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum history entries to show.
    pub history_limit: usize,
}

/// Per-objective status line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveStatus {
    /// Objective id.
    pub lo_id: String,
    /// Mastery status.
    pub status: MasteryStatus,
    /// Whether the objective is currently eligible for selection.
    pub eligible: bool,
}

/// Output format for the profile command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The learner id.
    pub learner_id: String,
    /// Profile version (0 means never saved).
    pub version: u64,
    /// Preference map.
    pub preferences: Vec<(String, String)>,
    /// Per-objective status in catalog declaration order.
    pub objectives: Vec<ObjectiveStatus>,
    /// Recent history entries, most recent first.
    pub recent_history: Vec<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfileOutput {
    /// Create a failed output.
    pub fn failure(learner_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            learner_id: learner_id.into(),
            version: 0,
            preferences: vec![],
            objectives: vec![],
            recent_history: vec![],
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Profile failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!(
            "Learner {} (version {}):",
            self.learner_id, self.version
        )];

        if !self.preferences.is_empty() {
            let prefs: Vec<String> = self
                .preferences
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            lines.push(format!("  preferences: {}", prefs.join(", ")));
        }

        lines.push(String::new());
        for obj in &self.objectives {
            let marker = if obj.eligible { "*" } else { " " };
            lines.push(format!(
                "  {} {:<20} {}",
                marker,
                obj.lo_id,
                obj.status.display_name()
            ));
        }

        if !self.recent_history.is_empty() {
            lines.push(String::new());
            lines.push("  recent outcomes:".to_string());
            for entry in &self.recent_history {
                lines.push(format!("    {entry}"));
            }
        }

        lines.join("\n")
    }
}

/// The profile command implementation.
pub struct ProfileCommand<S: ProfileStore> {
    catalog: CurriculumCatalog,
    store: S,
}

impl<S: ProfileStore> ProfileCommand<S> {
    /// Create a new profile command.
    pub fn new(catalog: CurriculumCatalog, store: S) -> Self {
        Self { catalog, store }
    }

    /// Run the profile command.
    pub fn run(&self, learner_id: &str, options: &ProfileOptions) -> ProfileOutput {
        let profile = match self.store.load(learner_id) {
            Ok(Some(profile)) => profile,
            Ok(None) => LearnerProfile::new(learner_id),
            Err(e) => return ProfileOutput::failure(learner_id, e.to_string()),
        };

        let resolver = EligibilityResolver::new(&self.catalog);

        let objectives = self
            .catalog
            .all_los()
            .iter()
            .map(|lo| ObjectiveStatus {
                lo_id: lo.id.clone(),
                status: profile.status_of(&lo.id),
                eligible: resolver.is_eligible(&profile, lo),
            })
            .collect();

        let limit = if options.history_limit == 0 {
            5
        } else {
            options.history_limit
        };
        let recent_history = profile
            .performance_history
            .iter()
            .rev()
            .take(limit)
            .map(|r| {
                format!(
                    "{} on {}: {:.2} ({})",
                    r.activity_id,
                    r.lo_id,
                    r.score,
                    if r.completed { "completed" } else { "incomplete" }
                )
            })
            .collect();

        let mut preferences: Vec<(String, String)> = profile
            .preferences
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        preferences.sort();

        ProfileOutput {
            success: true,
            learner_id: learner_id.to_string(),
            version: profile.version,
            preferences,
            objectives,
            recent_history,
            error: None,
        }
    }

    /// Format the output according to the options.
    pub fn format_output(&self, output: &ProfileOutput, options: &ProfileOptions) -> String {
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
