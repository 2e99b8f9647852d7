//! Pathway engine façade.
//!
//! Wires a validated catalog, a profile store, and the configuration into
//! the two operations callers consume: `generate_segment` (next pathway
//! segment for a learner) and `submit_outcome` (apply an activity outcome
//! and persist the updated profile).
//!
//! Generation is read-only: it runs against one immutable snapshot of the
//! profile and mutates nothing. Outcome submission performs the
//! load → process → save cycle; a conflict error from the store means a
//! concurrent submission won the race, and the caller retries.

use serde::{Deserialize, Serialize};

use crate::catalog::CurriculumCatalog;
use crate::config::Config;
use crate::core::{ContentItem, LearnerProfile, LearningObjective, MasteryStatus};
use crate::error::{Result, TrellisError};
use crate::pathway::eligibility::EligibilityResolver;
use crate::pathway::feedback::{FeedbackProcessor, Outcome};
use crate::pathway::selector::{ContentSelector, SelectorConfig};
use crate::storage::{validate_learner_id, ProfileStore};

/// One (objective, activities) entry of a generated segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentEntry {
    /// The objective to teach.
    pub objective: LearningObjective,
    /// Selected content items, in presentation order.
    pub items: Vec<ContentItem>,
    /// True when the objective has no content at all: an authoring gap.
    /// The pathway still advances past the objective.
    pub content_gap: bool,
}

/// Reason code attached to an empty segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SegmentReason {
    /// Every objective is mastered or blocked: pathway complete or
    /// curriculum exhausted. A normal end-state, not an error.
    NoEligibleObjectives,
}

/// An ordered sequence of (objective, activities) pairs for a learner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathwaySegment {
    /// The learner this segment was generated for.
    pub learner_id: String,
    /// Entries in teaching order.
    pub entries: Vec<SegmentEntry>,
    /// Set when `entries` is empty for a structural reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SegmentReason>,
}

impl PathwaySegment {
    /// Check whether any entry flags a content gap.
    pub fn has_content_gaps(&self) -> bool {
        self.entries.iter().any(|e| e.content_gap)
    }
}

/// Options for segment generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// Maximum objectives in the segment.
    pub max_los: usize,
    /// Maximum content items per objective.
    pub max_items_per_lo: usize,
    /// Offer mastered objectives as enrichment instead of the ordinary
    /// eligibility ordering.
    pub enrichment: bool,
}

impl GenerateOptions {
    /// Derive defaults from the selection config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_los: config.selection.max_los_per_segment as usize,
            max_items_per_lo: config.selection.max_items_per_lo as usize,
            enrichment: false,
        }
    }
}

/// The pathway engine: catalog + store + configuration.
pub struct PathwayEngine<S: ProfileStore> {
    catalog: CurriculumCatalog,
    store: S,
    config: Config,
    selector: ContentSelector,
    processor: FeedbackProcessor,
}

impl<S: ProfileStore> PathwayEngine<S> {
    /// Create an engine over a validated catalog and a profile store.
    pub fn new(catalog: CurriculumCatalog, store: S, config: Config) -> Self {
        let selector = ContentSelector::new(SelectorConfig::default());
        let processor = FeedbackProcessor::new(config.mastery.clone());
        Self {
            catalog,
            store,
            config,
            selector,
            processor,
        }
    }

    /// Replace the selector tables.
    pub fn with_selector_config(mut self, selector_config: SelectorConfig) -> Self {
        self.selector = ContentSelector::new(selector_config);
        self
    }

    /// The engine's catalog.
    pub fn catalog(&self) -> &CurriculumCatalog {
        &self.catalog
    }

    /// Load a learner's profile, or a fresh one on first encounter.
    ///
    /// Does not persist the fresh profile; only outcome submission writes.
    pub fn profile(&self, learner_id: &str) -> Result<LearnerProfile> {
        validate_learner_id(learner_id)?;
        Ok(self
            .store
            .load(learner_id)?
            .unwrap_or_else(|| LearnerProfile::new(learner_id)))
    }

    /// Generate the next pathway segment for a learner.
    ///
    /// Read-only: the profile snapshot is loaded once and nothing is
    /// persisted. Identical catalog and profile state yield identical
    /// segments.
    pub fn generate_segment(
        &self,
        learner_id: &str,
        options: GenerateOptions,
    ) -> Result<PathwaySegment> {
        if options.max_los == 0 || options.max_items_per_lo == 0 {
            return Err(TrellisError::validation(
                "segment sizing options must be at least 1",
            ));
        }

        let profile = self.profile(learner_id)?;
        let resolver = EligibilityResolver::new(&self.catalog);

        let candidates = if options.enrichment {
            resolver.enrichment_candidates(&profile)
        } else {
            resolver.eligible(&profile)
        };
        let chosen: Vec<&LearningObjective> =
            candidates.into_iter().take(options.max_los).collect();

        if chosen.is_empty() {
            return Ok(PathwaySegment {
                learner_id: learner_id.to_string(),
                entries: Vec::new(),
                reason: Some(SegmentReason::NoEligibleObjectives),
            });
        }

        let entries = chosen
            .into_iter()
            .map(|lo| {
                let items =
                    self.selector
                        .select(&self.catalog, &profile, &lo.id, options.max_items_per_lo);
                let content_gap = items.is_empty();
                if content_gap {
                    tracing::warn!(lo_id = %lo.id, "objective has no content items");
                }
                SegmentEntry {
                    objective: lo.clone(),
                    items,
                    content_gap,
                }
            })
            .collect();

        Ok(PathwaySegment {
            learner_id: learner_id.to_string(),
            entries,
            reason: None,
        })
    }

    /// Submit an activity outcome for a learner.
    ///
    /// Loads (or creates) the profile, applies the feedback state machine,
    /// and persists the result. Validation failures mutate nothing; a
    /// conflict error means a concurrent submission advanced the stored
    /// profile, and the caller should retry.
    pub fn submit_outcome(&self, learner_id: &str, outcome: &Outcome) -> Result<MasteryStatus> {
        let mut profile = self.profile(learner_id)?;
        let status = self.processor.process(&self.catalog, &mut profile, outcome)?;
        self.store.save(&mut profile)?;
        Ok(status)
    }

    /// Explicitly re-open a mastered objective and persist the change.
    pub fn reteach(&self, learner_id: &str, lo_id: &str) -> Result<MasteryStatus> {
        if !self.catalog.contains_lo(lo_id) {
            return Err(TrellisError::validation(format!(
                "unknown objective: {lo_id}"
            )));
        }
        let mut profile = self.profile(learner_id)?;
        profile.reteach(lo_id);
        let status = profile.status_of(lo_id);
        self.store.save(&mut profile)?;
        Ok(status)
    }

    /// The effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Difficulty, Modality};
    use crate::storage::MemoryProfileStore;

    fn lo(id: &str, prereqs: &[&str]) -> LearningObjective {
        LearningObjective::new(id, "math", "fractions", format!("objective {id}"))
            .with_prerequisites(prereqs.iter().copied())
    }

    fn item(id: &str, modality: Modality, difficulty: Difficulty, lo: &str) -> ContentItem {
        ContentItem::new(id, format!("item {id}"), modality, difficulty, [lo])
    }

    /// The worked example: a ← b ← c, video+game for a, worksheet for b.
    fn example_engine() -> PathwayEngine<MemoryProfileStore> {
        let catalog = CurriculumCatalog::build(
            vec![lo("lo_a", &[]), lo("lo_b", &["lo_a"]), lo("lo_c", &["lo_a", "lo_b"])],
            vec![
                item("video_a", Modality::Video, Difficulty::Easy, "lo_a"),
                item("game_a", Modality::Game, Difficulty::Medium, "lo_a"),
                item("ws_b", Modality::Worksheet, Difficulty::Easy, "lo_b"),
            ],
        )
        .unwrap();
        PathwayEngine::new(catalog, MemoryProfileStore::new(), Config::default())
    }

    fn options(max_los: usize, max_items: usize) -> GenerateOptions {
        GenerateOptions {
            max_los,
            max_items_per_lo: max_items,
            enrichment: false,
        }
    }

    #[test]
    fn test_end_to_end_worked_example() {
        let engine = example_engine();

        // Set up the visual preference before any outcomes
        let mut profile = LearnerProfile::new("l1");
        profile.set_preference("modality", "visual");
        engine.store.save(&mut profile).unwrap();

        // Fresh profile: only lo_a is eligible; visual preference picks the
        // easy video, variety fills with the medium game.
        let segment = engine.generate_segment("l1", options(1, 2)).unwrap();
        assert_eq!(segment.entries.len(), 1);
        assert_eq!(segment.entries[0].objective.id, "lo_a");
        let ids: Vec<&str> = segment.entries[0].items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["video_a", "game_a"]);
        assert!(segment.reason.is_none());

        // Master lo_a → lo_b unlocks
        let status = engine
            .submit_outcome("l1", &Outcome::new("video_a", "lo_a", 0.9, true))
            .unwrap();
        assert_eq!(status, MasteryStatus::Mastered);

        let segment = engine.generate_segment("l1", options(1, 2)).unwrap();
        assert_eq!(segment.entries[0].objective.id, "lo_b");
        let ids: Vec<&str> = segment.entries[0].items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ws_b"]);

        // Struggle on lo_b: it stays eligible ahead of anything fresh, and
        // lo_c remains blocked.
        let status = engine
            .submit_outcome("l1", &Outcome::new("ws_b", "lo_b", 0.3, true))
            .unwrap();
        assert_eq!(status, MasteryStatus::Struggling);

        let segment = engine.generate_segment("l1", options(3, 2)).unwrap();
        let lo_ids: Vec<&str> = segment
            .entries
            .iter()
            .map(|e| e.objective.id.as_str())
            .collect();
        assert_eq!(lo_ids, vec!["lo_b"]);

        // Mastering lo_b unlocks lo_c
        engine
            .submit_outcome("l1", &Outcome::new("ws_b", "lo_b", 0.95, true))
            .unwrap();
        let segment = engine.generate_segment("l1", options(1, 2)).unwrap();
        assert_eq!(segment.entries[0].objective.id, "lo_c");
        // lo_c has no content: flagged, not fatal
        assert!(segment.entries[0].content_gap);
        assert!(segment.has_content_gaps());
    }

    #[test]
    fn test_generation_is_read_only() {
        let engine = example_engine();

        engine.generate_segment("fresh", options(1, 2)).unwrap();
        // Nothing persisted for a fresh learner
        assert!(engine.store.load("fresh").unwrap().is_none());
    }

    #[test]
    fn test_generation_deterministic() {
        let engine = example_engine();
        let first = engine.generate_segment("l1", options(2, 2)).unwrap();
        let second = engine.generate_segment("l1", options(2, 2)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_eligible_objectives_reason() {
        let engine = example_engine();

        for lo_id in ["lo_a", "lo_b", "lo_c"] {
            engine
                .submit_outcome("l1", &Outcome::new("x", lo_id, 0.9, true))
                .unwrap();
        }

        let segment = engine.generate_segment("l1", options(1, 2)).unwrap();
        assert!(segment.entries.is_empty());
        assert_eq!(segment.reason, Some(SegmentReason::NoEligibleObjectives));
    }

    #[test]
    fn test_enrichment_offers_mastered() {
        let engine = example_engine();

        engine
            .submit_outcome("l1", &Outcome::new("video_a", "lo_a", 0.9, true))
            .unwrap();

        let segment = engine
            .generate_segment(
                "l1",
                GenerateOptions {
                    max_los: 2,
                    max_items_per_lo: 2,
                    enrichment: true,
                },
            )
            .unwrap();
        assert_eq!(segment.entries.len(), 1);
        assert_eq!(segment.entries[0].objective.id, "lo_a");
    }

    #[test]
    fn test_submit_outcome_persists_and_versions() {
        let engine = example_engine();

        engine
            .submit_outcome("l1", &Outcome::new("video_a", "lo_a", 0.6, true))
            .unwrap();

        let stored = engine.store.load("l1").unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.status_of("lo_a"), MasteryStatus::Partial);
        assert_eq!(stored.performance_history.len(), 1);
    }

    #[test]
    fn test_invalid_outcome_persists_nothing() {
        let engine = example_engine();

        let err = engine
            .submit_outcome("l1", &Outcome::new("x", "lo_a", 2.0, true))
            .unwrap_err();
        assert!(matches!(err, TrellisError::Validation { .. }));
        assert!(engine.store.load("l1").unwrap().is_none());
    }

    #[test]
    fn test_invalid_sizing_rejected() {
        let engine = example_engine();
        let err = engine.generate_segment("l1", options(0, 2)).unwrap_err();
        assert!(matches!(err, TrellisError::Validation { .. }));
    }

    #[test]
    fn test_invalid_learner_id_rejected() {
        let engine = example_engine();
        let err = engine.generate_segment("../etc", options(1, 2)).unwrap_err();
        assert!(matches!(err, TrellisError::Validation { .. }));
    }

    #[test]
    fn test_reteach_via_engine() {
        let engine = example_engine();

        engine
            .submit_outcome("l1", &Outcome::new("video_a", "lo_a", 0.9, true))
            .unwrap();
        let status = engine.reteach("l1", "lo_a").unwrap();
        assert_eq!(status, MasteryStatus::InProgress);

        // lo_a is back in the ordinary pathway
        let segment = engine.generate_segment("l1", options(1, 2)).unwrap();
        assert_eq!(segment.entries[0].objective.id, "lo_a");
    }

    #[test]
    fn test_reteach_unknown_objective_rejected() {
        let engine = example_engine();
        let err = engine.reteach("l1", "ghost").unwrap_err();
        assert!(matches!(err, TrellisError::Validation { .. }));
    }

    #[test]
    fn test_segment_serializes_to_json() {
        let engine = example_engine();
        let segment = engine.generate_segment("l1", options(1, 2)).unwrap();

        let json = serde_json::to_string(&segment).unwrap();
        let back: PathwaySegment = serde_json::from_str(&json).unwrap();
        assert_eq!(segment, back);
        // reason is omitted when None
        assert!(!json.contains("reason"));
    }

    #[test]
    fn test_options_from_config() {
        let opts = GenerateOptions::from_config(&Config::default());
        assert_eq!(opts.max_los, 1);
        assert_eq!(opts.max_items_per_lo, 2);
        assert!(!opts.enrichment);
    }
}
