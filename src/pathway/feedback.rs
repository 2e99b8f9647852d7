//! Outcome feedback processing.
//!
//! Translates an activity outcome into a mastery-status transition and an
//! auditable history entry. Validation runs before any mutation: an invalid
//! outcome (score outside [0,1], unknown objective) rejects the request and
//! leaves the profile untouched. A valid outcome always appends to the
//! performance history, even when the status does not change.
//!
//! Thresholds come from `MasteryConfig`; the defaults (0.85 mastered, 0.50
//! struggling) are deliberately configuration, not constants.

use crate::catalog::CurriculumCatalog;
use crate::config::MasteryConfig;
use crate::core::{LearnerProfile, MasteryStatus, OutcomeRecord};
use crate::error::{Result, TrellisError};

/// An activity outcome submitted by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Id of the activity that produced the outcome.
    pub activity_id: String,
    /// Objective the outcome applies to.
    pub lo_id: String,
    /// Normalized score in [0, 1].
    pub score: f64,
    /// Whether the activity was finished.
    pub completed: bool,
}

impl Outcome {
    /// Create a new outcome.
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
        }
    }
}

/// Applies outcomes to learner profiles.
#[derive(Debug, Clone, Default)]
pub struct FeedbackProcessor {
    thresholds: MasteryConfig,
}

impl FeedbackProcessor {
    /// Create a processor with the given thresholds.
    pub fn new(thresholds: MasteryConfig) -> Self {
        Self { thresholds }
    }

    /// Process an outcome: validate, append to history, transition status.
    ///
    /// Returns the (possibly unchanged) mastery status of the objective.
    /// `Mastered` is terminal under default flow; outcomes on a mastered
    /// objective are recorded but never regress the status. The only path
    /// back out is the profile's explicit `reteach`.
    pub fn process(
        &self,
        catalog: &CurriculumCatalog,
        profile: &mut LearnerProfile,
        outcome: &Outcome,
    ) -> Result<MasteryStatus> {
        // Validation precedes all mutation.
        if !outcome.score.is_finite() || !(0.0..=1.0).contains(&outcome.score) {
            return Err(TrellisError::validation(format!(
                "score {} outside [0, 1]",
                outcome.score
            )));
        }
        if !catalog.contains_lo(&outcome.lo_id) {
            return Err(TrellisError::validation(format!(
                "unknown objective: {}",
                outcome.lo_id
            )));
        }

        profile.record_outcome(OutcomeRecord::new(
            outcome.activity_id.as_str(),
            outcome.lo_id.as_str(),
            outcome.score,
            outcome.completed,
        ));

        let current = profile.status_of(&outcome.lo_id);
        let next = self.transition(current, outcome);
        if next != current {
            profile.set_status(outcome.lo_id.clone(), next);
        }

        Ok(next)
    }

    /// The mastery state machine.
    fn transition(&self, current: MasteryStatus, outcome: &Outcome) -> MasteryStatus {
        if current == MasteryStatus::Mastered {
            return MasteryStatus::Mastered;
        }

        if !outcome.completed {
            // An attempted-but-unfinished activity is progress signal only:
            // a fresh objective opens, everything else holds its status.
            return if current == MasteryStatus::NotStarted {
                MasteryStatus::InProgress
            } else {
                current
            };
        }

        if outcome.score >= self.thresholds.mastered_threshold {
            MasteryStatus::Mastered
        } else if outcome.score < self.thresholds.struggling_threshold {
            MasteryStatus::Struggling
        } else {
            MasteryStatus::Partial
        }
    }
}
