//! Content item types for Trellis.
//!
//! A `ContentItem` is a concrete learning resource (game, video, worksheet,
//! text, quiz) teaching one or more learning objectives. Items are immutable
//! after catalog load; the catalog rejects items covering no objectives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::objective::{Difficulty, Modality};

/// A concrete learning resource teaching one or more objectives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItem {
    /// Unique identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Modality of the resource.
    pub modality: Modality,
    /// Ordinal difficulty.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Objectives this item teaches. Must be non-empty; the catalog rejects
    /// items with an empty set at build time.
    pub covered_los: BTreeSet<String>,
    /// Preference tags this item serves (e.g. "visual"). May be empty.
    #[serde(default)]
    pub target_preferences: BTreeSet<String>,
}

impl ContentItem {
    /// Create a new content item covering the given objectives.
    pub fn new<I, S>(
        id: impl Into<String>,
        title: impl Into<String>,
        modality: Modality,
        difficulty: Difficulty,
        covered_los: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            title: title.into(),
            modality,
            difficulty,
            covered_los: covered_los.into_iter().map(Into::into).collect(),
            target_preferences: BTreeSet::new(),
        }
    }

    /// Set the preference tags this item serves.
    pub fn with_target_preferences<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_preferences = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Check if this item covers the given objective.
    pub fn covers(&self, lo_id: &str) -> bool {
        self.covered_los.contains(lo_id)
    }

    /// Check if this item is tagged for the given preference value.
    pub fn targets_preference(&self, tag: &str) -> bool {
        self.target_preferences.contains(tag)
    }
}
