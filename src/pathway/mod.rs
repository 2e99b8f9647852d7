//! Pathway generation and adaptation for Trellis.
//!
//! This module contains the sequencing engine proper: the eligibility
//! resolver over the prerequisite graph, the content-selection heuristic,
//! the mastery feedback state machine, and the `PathwayEngine` façade that
//! wires them to a catalog and a profile store.

pub mod eligibility;
pub mod engine;
pub mod feedback;
pub mod selector;

pub use eligibility::EligibilityResolver;
pub use engine::{GenerateOptions, PathwayEngine, PathwaySegment, SegmentEntry, SegmentReason};
pub use feedback::{FeedbackProcessor, Outcome};
pub use selector::{ContentSelector, SelectorConfig};
