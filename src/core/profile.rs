//! Learner profile types for Trellis.
//!
//! A `LearnerProfile` is the per-learner mutable record: mastery status per
//! objective, a preference map, and an append-only performance history. The
//! profile is owned exclusively by its learner and mutated only through the
//! feedback processor and the explicit edit operations here; persistence is
//! a separate, explicit store call.
//!
//! The `version` field implements optimistic concurrency: stores reject a
//! save whose version no longer matches the stored profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::objective::MasteryStatus;

/// Schema version for profile serialization.
///
/// Increment when the schema changes in a breaking way.
pub const PROFILE_SCHEMA_VERSION: u8 = 1;

/// One entry in the append-only performance history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutcomeRecord {
    /// Id of the content item that produced this outcome.
    pub activity_id: String,
    /// Objective the outcome applies to.
    pub lo_id: String,
    /// Normalized score in [0, 1].
    pub score: f64,
    /// Whether the activity was finished.
    pub completed: bool,
    /// When the outcome was recorded.
    pub timestamp: DateTime<Utc>,
}

impl OutcomeRecord {
    /// Create a new record stamped with the current time.
    pub fn new(
        activity_id: impl Into<String>,
        lo_id: impl Into<String>,
        score: f64,
        completed: bool,
    ) -> Self {
        Self {
            activity_id: activity_id.into(),
            lo_id: lo_id.into(),
            score,
            completed,
            timestamp: Utc::now(),
        }
    }
}

/// Per-learner mutable record of mastery, preferences, and history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LearnerProfile {
    /// Unique learner identifier; the storage key.
    pub learner_id: String,
    /// Schema version for forward compatibility.
    pub schema_version: u8,
    /// Preference category → value (e.g. "modality" → "visual").
    #[serde(default)]
    pub preferences: HashMap<String, String>,
    /// Objective id → mastery status. Absent entries mean `NotStarted`.
    #[serde(default)]
    pub lo_status: HashMap<String, MasteryStatus>,
    /// Append-only ordered log of activity outcomes.
    #[serde(default)]
    pub performance_history: Vec<OutcomeRecord>,
    /// Monotonically increasing version for optimistic concurrency.
    #[serde(default)]
    pub version: u64,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl LearnerProfile {
    /// Create a fresh profile for a learner id.
    pub fn new(learner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            learner_id: learner_id.into(),
            schema_version: PROFILE_SCHEMA_VERSION,
            preferences: HashMap::new(),
            lo_status: HashMap::new(),
            performance_history: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get the mastery status of an objective, defaulting to `NotStarted`.
    pub fn status_of(&self, lo_id: &str) -> MasteryStatus {
        self.lo_status.get(lo_id).copied().unwrap_or_default()
    }

    /// Set the mastery status of an objective.
    pub fn set_status(&mut self, lo_id: impl Into<String>, status: MasteryStatus) {
        self.lo_status.insert(lo_id.into(), status);
        self.touch();
    }

    /// Append an outcome to the performance history.
    ///
    /// History is append-only; entries are never rewritten or dropped.
    pub fn record_outcome(&mut self, entry: OutcomeRecord) {
        self.performance_history.push(entry);
        self.touch();
    }

    /// Look up a preference value by category.
    pub fn preference(&self, category: &str) -> Option<&str> {
        self.preferences.get(category).map(String::as_str)
    }

    /// Set a preference value.
    pub fn set_preference(&mut self, category: impl Into<String>, value: impl Into<String>) {
        self.preferences.insert(category.into(), value.into());
        self.touch();
    }

    /// Explicitly re-open a mastered objective for re-teaching.
    ///
    /// This is the only path back out of `Mastered`. Calling it on an
    /// objective in any other status is a no-op.
    pub fn reteach(&mut self, lo_id: &str) {
        if self.status_of(lo_id) == MasteryStatus::Mastered {
            self.set_status(lo_id.to_string(), MasteryStatus::InProgress);
        }
    }

    /// The most recent history entry for an objective, if any.
    pub fn last_outcome_for(&self, lo_id: &str) -> Option<&OutcomeRecord> {
        self.performance_history
            .iter()
            .rev()
            .find(|r| r.lo_id == lo_id)
    }

    /// Index of the most recent history entry for an objective.
    ///
    /// Used to order remediation candidates by recency.
    pub fn last_outcome_index(&self, lo_id: &str) -> Option<usize> {
        self.performance_history
            .iter()
            .rposition(|r| r.lo_id == lo_id)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
