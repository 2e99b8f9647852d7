//! Core types for Trellis.
//!
//! This module contains the fundamental curriculum and learner types: the
//! learning objective graph nodes, the content items that teach them, and
//! the per-learner profile record with its mastery state machine statuses.

pub mod content;
pub mod objective;
pub mod profile;

pub use content::ContentItem;
pub use objective::{Difficulty, LearningObjective, MasteryStatus, Modality};
pub use profile::{LearnerProfile, OutcomeRecord, PROFILE_SCHEMA_VERSION};
