//! Trellis - Adaptive Learning Pathway Engine
//!
//! Trellis decides, for a learner with a given mastery history and
//! preference profile, which learning objectives are currently eligible to
//! be taught and which content items should represent each objective,
//! balancing difficulty progression, modality variety, and learner
//! preference. A feedback loop updates per-objective mastery from activity
//! outcomes and feeds back into subsequent selections.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod pathway;
pub mod storage;

pub use catalog::{CatalogSource, CurriculumCatalog, JsonCatalogSource};
pub use config::{Config, MasteryConfig, SelectionConfig};
pub use core::{
    ContentItem, Difficulty, LearnerProfile, LearningObjective, MasteryStatus, Modality,
    OutcomeRecord,
};
pub use error::{Result, TrellisError};
pub use pathway::{
    ContentSelector, EligibilityResolver, FeedbackProcessor, GenerateOptions, Outcome,
    PathwayEngine, PathwaySegment, SegmentEntry, SegmentReason, SelectorConfig,
};
pub use storage::{FileProfileStore, MemoryProfileStore, ProfileStore};

// CLI commands
pub use cli::{CatalogCommand, GenerateCommand, InitCommand, OutcomeCommand, ProfileCommand};
