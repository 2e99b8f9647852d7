//! Content selection heuristic.
//!
//! For one eligible objective, the selector picks an ordered, size-bounded
//! set of distinct content items balancing preference match, modality
//! variety, and difficulty progression. Selection is fully deterministic:
//! candidates are swept easiest-first with declaration order as the
//! tie-break, and the preference and variety tables are explicit
//! configuration rather than process-wide constants.
//!
//! Three passes run over the candidate pool:
//! 1. Preference: the learner's modality preference maps to an ordered
//!    modality list; the first listed modality with a candidate contributes
//!    its easiest unused item.
//! 2. Variety: a general modality-priority list fills remaining slots with
//!    modalities not yet represented.
//! 3. Fallback: easiest remaining items, modality repeats allowed.
//!
//! Remediation modifiers apply before the passes: a struggling objective
//! restricts the pool to easy/medium and avoids the most recently attempted
//! modality; a partial objective re-ranks medium items first as practice.

use std::collections::{HashMap, HashSet};

use crate::catalog::CurriculumCatalog;
use crate::core::{ContentItem, Difficulty, LearnerProfile, MasteryStatus, Modality};

/// Preference category consulted for the primary pass.
pub const PREFERENCE_CATEGORY: &str = "modality";

/// Configuration tables for the selector.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Preference tag → ordered modality list for the primary pass.
    pub preference_orderings: HashMap<String, Vec<Modality>>,
    /// General modality-priority list for the variety pass. Deliberately
    /// distinct from any preference ordering to maximize modality spread.
    pub variety_priority: Vec<Modality>,
    /// Hardest difficulty offered to a struggling objective.
    pub remediation_max_difficulty: Difficulty,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        let mut preference_orderings = HashMap::new();
        preference_orderings.insert(
            "visual".to_string(),
            vec![Modality::Video, Modality::Quiz, Modality::Game],
        );
        preference_orderings.insert(
            "textual".to_string(),
            vec![Modality::Text, Modality::Worksheet, Modality::Quiz],
        );
        preference_orderings.insert(
            "interactive".to_string(),
            vec![Modality::Game, Modality::Quiz, Modality::Video],
        );
        preference_orderings.insert(
            "auditory".to_string(),
            vec![Modality::Video, Modality::Text],
        );

        Self {
            preference_orderings,
            variety_priority: vec![
                Modality::Game,
                Modality::Worksheet,
                Modality::Video,
                Modality::Quiz,
                Modality::Text,
            ],
            remediation_max_difficulty: Difficulty::Medium,
        }
    }
}

/// Deterministic content selector.
#[derive(Debug, Clone, Default)]
pub struct ContentSelector {
    config: SelectorConfig,
}

impl ContentSelector {
    /// Create a selector with the given configuration tables.
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Select up to `max_items` distinct content items for an objective.
    ///
    /// Returns an empty list only when the objective has no content at all;
    /// callers surface that as a content gap, not an error.
    pub fn select(
        &self,
        catalog: &CurriculumCatalog,
        profile: &LearnerProfile,
        lo_id: &str,
        max_items: usize,
    ) -> Vec<ContentItem> {
        let pool = catalog.content_for_lo(lo_id);
        if pool.is_empty() || max_items == 0 {
            return Vec::new();
        }

        let status = profile.status_of(lo_id);

        // Base deterministic order: ascending difficulty, declaration order
        // as tie-break. content_for_lo yields declaration order; the stable
        // sort preserves it within each difficulty.
        let mut candidates: Vec<&ContentItem> = pool;
        candidates.sort_by_key(|c| c.difficulty);

        // Remediation modifiers run before the passes.
        let mut avoid: Option<Modality> = None;
        match status {
            MasteryStatus::Struggling => {
                let restricted: Vec<&ContentItem> = candidates
                    .iter()
                    .copied()
                    .filter(|c| c.difficulty <= self.config.remediation_max_difficulty)
                    .collect();
                if restricted.is_empty() {
                    // Nothing at or below the cap; serving hard content
                    // beats serving nothing.
                    tracing::warn!(
                        lo_id,
                        "struggling objective has no content at remediation difficulty"
                    );
                } else {
                    candidates = restricted;
                }
                avoid = self.last_attempted_modality(catalog, profile, lo_id);
            }
            MasteryStatus::Partial => {
                // Practice framing: medium first, then the usual ascending
                // order. Stable, so declaration order still breaks ties.
                candidates.sort_by_key(|c| match c.difficulty {
                    Difficulty::Medium => 0,
                    Difficulty::Easy => 1,
                    Difficulty::Hard => 2,
                });
            }
            _ => {}
        }

        let mut selected: Vec<&ContentItem> = Vec::new();
        let mut used: HashSet<&str> = HashSet::new();

        self.preference_pass(&candidates, profile, avoid, &mut selected, &mut used);
        self.variety_pass(&candidates, avoid, max_items, &mut selected, &mut used);
        self.fallback_pass(&candidates, max_items, &mut selected, &mut used);

        selected.truncate(max_items);
        selected.into_iter().cloned().collect()
    }

    /// Pass 1: pick the easiest unused item of the first preferred modality
    /// with any candidate. Items tagged for the learner's preference rank
    /// ahead of untagged ones within that modality.
    fn preference_pass<'a>(
        &self,
        candidates: &[&'a ContentItem],
        profile: &LearnerProfile,
        avoid: Option<Modality>,
        selected: &mut Vec<&'a ContentItem>,
        used: &mut HashSet<&'a str>,
    ) {
        let Some(tag) = profile.preference(PREFERENCE_CATEGORY) else {
            return;
        };
        let Some(ordering) = self.config.preference_orderings.get(tag) else {
            return;
        };

        for &modality in ordering {
            if avoid == Some(modality) {
                continue;
            }
            let pick = candidates
                .iter()
                .find(|c| c.modality == modality && !used.contains(c.id.as_str()) && c.targets_preference(tag))
                .or_else(|| {
                    candidates
                        .iter()
                        .find(|c| c.modality == modality && !used.contains(c.id.as_str()))
                });
            if let Some(&item) = pick {
                used.insert(item.id.as_str());
                selected.push(item);
                return;
            }
        }
    }

    /// Pass 2: walk the variety priority list, adding the easiest unused
    /// item of each modality not yet represented.
    fn variety_pass<'a>(
        &self,
        candidates: &[&'a ContentItem],
        avoid: Option<Modality>,
        max_items: usize,
        selected: &mut Vec<&'a ContentItem>,
        used: &mut HashSet<&'a str>,
    ) {
        let mut priority = self.config.variety_priority.clone();
        if let Some(avoided) = avoid {
            // Avoidance, not prohibition: the modality moves to the end of
            // the sweep and stays reachable in the fallback pass.
            priority.retain(|m| *m != avoided);
            priority.push(avoided);
        }

        let mut represented: HashSet<Modality> = selected.iter().map(|c| c.modality).collect();

        for modality in priority {
            if selected.len() >= max_items {
                return;
            }
            if represented.contains(&modality) {
                continue;
            }
            if let Some(&item) = candidates
                .iter()
                .find(|c| c.modality == modality && !used.contains(c.id.as_str()))
            {
                used.insert(item.id.as_str());
                represented.insert(modality);
                selected.push(item);
            }
        }
    }

    /// Pass 3: fill remaining slots with the easiest unused items, modality
    /// repeats allowed.
    fn fallback_pass<'a>(
        &self,
        candidates: &[&'a ContentItem],
        max_items: usize,
        selected: &mut Vec<&'a ContentItem>,
        used: &mut HashSet<&'a str>,
    ) {
        for &item in candidates {
            if selected.len() >= max_items {
                return;
            }
            if used.contains(item.id.as_str()) {
                continue;
            }
            used.insert(item.id.as_str());
            selected.push(item);
        }
    }

    /// The modality of the most recently attempted activity for an
    /// objective, resolved through the catalog. Unknown activity ids
    /// resolve to nothing.
    fn last_attempted_modality(
        &self,
        catalog: &CurriculumCatalog,
        profile: &LearnerProfile,
        lo_id: &str,
    ) -> Option<Modality> {
        profile
            .last_outcome_for(lo_id)
            .and_then(|record| catalog.content_by_id(&record.activity_id))
            .map(|item| item.modality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LearningObjective, OutcomeRecord};

    fn lo(id: &str) -> LearningObjective {
        LearningObjective::new(id, "math", "fractions", format!("objective {id}"))
    }

    fn item(id: &str, modality: Modality, difficulty: Difficulty, lo: &str) -> ContentItem {
        ContentItem::new(id, format!("item {id}"), modality, difficulty, [lo])
    }

    fn selector() -> ContentSelector {
        ContentSelector::new(SelectorConfig::default())
    }

    #[test]
    fn test_visual_preference_worked_example() {
        // Easy video + medium game for "a"
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("video-a", Modality::Video, Difficulty::Easy, "a"),
                item("game-a", Modality::Game, Difficulty::Medium, "a"),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_preference("modality", "visual");

        let picked = selector().select(&catalog, &profile, "a", 2);
        let ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();

        // Preference pass takes the video, variety pass fills with the game
        assert_eq!(ids, vec!["video-a", "game-a"]);
    }

    #[test]
    fn test_no_preference_match_falls_through() {
        let catalog = CurriculumCatalog::build(
            vec![lo("b")],
            vec![item("ws-b", Modality::Worksheet, Difficulty::Easy, "b")],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_preference("modality", "visual");

        // No video/quiz/game content; variety pass still finds the worksheet
        let picked = selector().select(&catalog, &profile, "b", 2);
        let ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ws-b"]);
    }

    #[test]
    fn test_no_preference_set_uses_variety_order() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("text-1", Modality::Text, Difficulty::Easy, "a"),
                item("game-1", Modality::Game, Difficulty::Easy, "a"),
                item("video-1", Modality::Video, Difficulty::Easy, "a"),
            ],
        )
        .unwrap();

        let profile = LearnerProfile::new("l1");
        let picked = selector().select(&catalog, &profile, "a", 2);
        let ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();

        // Variety priority: game, worksheet, video, quiz, text
        assert_eq!(ids, vec!["game-1", "video-1"]);
    }

    #[test]
    fn test_easiest_selected_within_modality() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("video-hard", Modality::Video, Difficulty::Hard, "a"),
                item("video-easy", Modality::Video, Difficulty::Easy, "a"),
                item("video-medium", Modality::Video, Difficulty::Medium, "a"),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_preference("modality", "visual");

        let picked = selector().select(&catalog, &profile, "a", 1);
        assert_eq!(picked[0].id, "video-easy");
    }

    #[test]
    fn test_target_preference_ranks_ahead_within_modality() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("video-plain", Modality::Video, Difficulty::Easy, "a"),
                item("video-tagged", Modality::Video, Difficulty::Medium, "a")
                    .with_target_preferences(["visual"]),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_preference("modality", "visual");

        // The tagged item wins the preference pass despite being harder
        let picked = selector().select(&catalog, &profile, "a", 1);
        assert_eq!(picked[0].id, "video-tagged");
    }

    #[test]
    fn test_declaration_order_breaks_difficulty_ties() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("q-first", Modality::Quiz, Difficulty::Easy, "a"),
                item("q-second", Modality::Quiz, Difficulty::Easy, "a"),
            ],
        )
        .unwrap();

        let profile = LearnerProfile::new("l1");
        let picked = selector().select(&catalog, &profile, "a", 1);
        assert_eq!(picked[0].id, "q-first");
    }

    #[test]
    fn test_fallback_allows_modality_repeats() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("q1", Modality::Quiz, Difficulty::Easy, "a"),
                item("q2", Modality::Quiz, Difficulty::Medium, "a"),
                item("q3", Modality::Quiz, Difficulty::Hard, "a"),
            ],
        )
        .unwrap();

        let profile = LearnerProfile::new("l1");
        let picked = selector().select(&catalog, &profile, "a", 3);
        let ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_bound_and_no_duplicates() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("v1", Modality::Video, Difficulty::Easy, "a"),
                item("g1", Modality::Game, Difficulty::Easy, "a"),
                item("w1", Modality::Worksheet, Difficulty::Easy, "a"),
                item("t1", Modality::Text, Difficulty::Easy, "a"),
            ],
        )
        .unwrap();

        let profile = LearnerProfile::new("l1");
        let picked = selector().select(&catalog, &profile, "a", 2);

        assert_eq!(picked.len(), 2);
        let mut ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_empty_content_returns_empty() {
        let catalog = CurriculumCatalog::build(vec![lo("a")], vec![]).unwrap();
        let profile = LearnerProfile::new("l1");
        assert!(selector().select(&catalog, &profile, "a", 2).is_empty());
    }

    #[test]
    fn test_struggling_excludes_hard() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("hard-1", Modality::Video, Difficulty::Hard, "a"),
                item("easy-1", Modality::Worksheet, Difficulty::Easy, "a"),
                item("medium-1", Modality::Quiz, Difficulty::Medium, "a"),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_status("a", MasteryStatus::Struggling);

        let picked = selector().select(&catalog, &profile, "a", 3);
        assert!(picked.iter().all(|c| c.difficulty <= Difficulty::Medium));
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_struggling_avoids_last_attempted_modality() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("ws-1", Modality::Worksheet, Difficulty::Easy, "a"),
                item("ws-2", Modality::Worksheet, Difficulty::Easy, "a"),
                item("video-1", Modality::Video, Difficulty::Easy, "a"),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_status("a", MasteryStatus::Struggling);
        // The failing attempt was the worksheet
        profile.record_outcome(OutcomeRecord::new("ws-1", "a", 0.2, true));

        let picked = selector().select(&catalog, &profile, "a", 1);
        // A different modality than the failing one leads the selection
        assert_eq!(picked[0].id, "video-1");
    }

    #[test]
    fn test_struggling_avoided_modality_still_reachable() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("ws-1", Modality::Worksheet, Difficulty::Easy, "a"),
                item("ws-2", Modality::Worksheet, Difficulty::Medium, "a"),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_status("a", MasteryStatus::Struggling);
        profile.record_outcome(OutcomeRecord::new("ws-1", "a", 0.2, true));

        // Only the avoided modality exists; selection still proceeds
        let picked = selector().select(&catalog, &profile, "a", 2);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_struggling_with_only_hard_content_serves_hard() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![item("hard-1", Modality::Quiz, Difficulty::Hard, "a")],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_status("a", MasteryStatus::Struggling);

        // The difficulty cap never empties a non-empty pool
        let picked = selector().select(&catalog, &profile, "a", 1);
        assert_eq!(picked.len(), 1);
    }

    #[test]
    fn test_partial_prefers_medium_practice() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("easy-1", Modality::Quiz, Difficulty::Easy, "a"),
                item("medium-1", Modality::Quiz, Difficulty::Medium, "a"),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_status("a", MasteryStatus::Partial);

        let picked = selector().select(&catalog, &profile, "a", 1);
        assert_eq!(picked[0].id, "medium-1");
    }

    #[test]
    fn test_determinism() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![
                item("v1", Modality::Video, Difficulty::Easy, "a"),
                item("g1", Modality::Game, Difficulty::Medium, "a"),
                item("q1", Modality::Quiz, Difficulty::Easy, "a"),
            ],
        )
        .unwrap();

        let mut profile = LearnerProfile::new("l1");
        profile.set_preference("modality", "visual");

        let first = selector().select(&catalog, &profile, "a", 2);
        let second = selector().select(&catalog, &profile, "a", 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_items_zero_yields_empty() {
        let catalog = CurriculumCatalog::build(
            vec![lo("a")],
            vec![item("v1", Modality::Video, Difficulty::Easy, "a")],
        )
        .unwrap();
        let profile = LearnerProfile::new("l1");
        assert!(selector().select(&catalog, &profile, "a", 0).is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_modality() -> impl Strategy<Value = Modality> {
            prop_oneof![
                Just(Modality::Game),
                Just(Modality::Video),
                Just(Modality::Worksheet),
                Just(Modality::Text),
                Just(Modality::Quiz),
            ]
        }

        fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
            prop_oneof![
                Just(Difficulty::Easy),
                Just(Difficulty::Medium),
                Just(Difficulty::Hard),
            ]
        }

        fn arb_status() -> impl Strategy<Value = MasteryStatus> {
            prop_oneof![
                Just(MasteryStatus::NotStarted),
                Just(MasteryStatus::InProgress),
                Just(MasteryStatus::Struggling),
                Just(MasteryStatus::Partial),
            ]
        }

        proptest! {
            // Selection bound: never more than max_items, never a duplicate,
            // and empty only when the pool is empty.
            #[test]
            fn prop_selection_bound(
                shapes in proptest::collection::vec((arb_modality(), arb_difficulty()), 0..12),
                status in arb_status(),
                max_items in 1usize..5,
                tag in prop_oneof![
                    Just(None),
                    Just(Some("visual")),
                    Just(Some("textual")),
                    Just(Some("unknown-tag")),
                ],
            ) {
                let content: Vec<ContentItem> = shapes
                    .iter()
                    .enumerate()
                    .map(|(i, (m, d))| item(&format!("ci-{i}"), *m, *d, "a"))
                    .collect();
                let pool_size = content.len();
                let catalog = CurriculumCatalog::build(vec![lo("a")], content).unwrap();

                let mut profile = LearnerProfile::new("l1");
                profile.set_status("a", status);
                if let Some(tag) = tag {
                    profile.set_preference("modality", tag);
                }

                let picked = selector().select(&catalog, &profile, "a", max_items);

                prop_assert!(picked.len() <= max_items);
                let mut ids: Vec<&str> = picked.iter().map(|c| c.id.as_str()).collect();
                ids.sort_unstable();
                let before = ids.len();
                ids.dedup();
                prop_assert_eq!(before, ids.len());
                prop_assert_eq!(picked.is_empty(), pool_size == 0);
            }
        }
    }
}
