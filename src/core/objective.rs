//! Learning objective types for Trellis.
//!
//! A `LearningObjective` is an atomic unit of curriculum a learner can
//! master. Objectives form a directed acyclic graph through their
//! `prerequisites` sets; the catalog validates acyclicity at build time.
//! Objectives are immutable after catalog load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An atomic unit of curriculum, gated by prerequisite mastery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LearningObjective {
    /// Unique identifier.
    pub id: String,
    /// Subject area (e.g. "math").
    pub subject: String,
    /// Strand within the subject (e.g. "fractions").
    pub strand: String,
    /// Human-readable description.
    pub description: String,
    /// Objectives that must be mastered before this one is eligible.
    ///
    /// A `BTreeSet` keeps serialized catalogs stable and diffs readable.
    #[serde(default)]
    pub prerequisites: BTreeSet<String>,
}

impl LearningObjective {
    /// Create a new objective with no prerequisites.
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        strand: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            strand: strand.into(),
            description: description.into(),
            prerequisites: BTreeSet::new(),
        }
    }

    /// Set the prerequisite objective ids.
    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    /// Check if this objective is a root (no prerequisites).
    pub fn is_root(&self) -> bool {
        self.prerequisites.is_empty()
    }
}

/// Content modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Game,
    Video,
    Worksheet,
    Text,
    Quiz,
}

impl Modality {
    /// Get all modality variants.
    pub fn all() -> &'static [Modality] {
        &[
            Modality::Game,
            Modality::Video,
            Modality::Worksheet,
            Modality::Text,
            Modality::Quiz,
        ]
    }

    /// Get the display name for this modality.
    pub fn display_name(&self) -> &'static str {
        match self {
            Modality::Game => "Game",
            Modality::Video => "Video",
            Modality::Worksheet => "Worksheet",
            Modality::Text => "Text",
            Modality::Quiz => "Quiz",
        }
    }
}

/// Ordinal difficulty of a content item.
///
/// The derived `Ord` gives easy < medium < hard, which the selector relies
/// on for its easiest-first sweeps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Get all difficulty variants, easiest first.
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// Get the display name for this difficulty.
    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Per-objective mastery status.
///
/// Drives both eligibility (mastered objectives leave the ordinary pathway)
/// and content selection (struggling/partial objectives get remediation
/// treatment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MasteryStatus {
    /// No recorded activity for this objective.
    #[default]
    NotStarted,
    /// Attempted but not yet evaluated against the mastery thresholds.
    InProgress,
    /// Last evaluated outcome fell below the struggling threshold.
    Struggling,
    /// Last evaluated outcome landed between the thresholds.
    Partial,
    /// Terminal for ordinary flow; re-entry only via an explicit re-teach.
    Mastered,
}

impl MasteryStatus {
    /// Get all status variants.
    pub fn all() -> &'static [MasteryStatus] {
        &[
            MasteryStatus::NotStarted,
            MasteryStatus::InProgress,
            MasteryStatus::Struggling,
            MasteryStatus::Partial,
            MasteryStatus::Mastered,
        ]
    }

    /// Check if this status keeps the objective in the ordinary pathway.
    pub fn is_open(&self) -> bool {
        !matches!(self, MasteryStatus::Mastered)
    }

    /// Check if this status marks the objective as a remediation candidate.
    pub fn needs_remediation(&self) -> bool {
        matches!(self, MasteryStatus::Struggling | MasteryStatus::Partial)
    }

    /// Get the display name for this status.
    pub fn display_name(&self) -> &'static str {
        match self {
            MasteryStatus::NotStarted => "not started",
            MasteryStatus::InProgress => "in progress",
            MasteryStatus::Struggling => "struggling",
            MasteryStatus::Partial => "partial",
            MasteryStatus::Mastered => "mastered",
        }
    }
}
