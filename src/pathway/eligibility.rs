//! Eligibility resolution over the prerequisite graph.
//!
//! An objective is eligible for new pathway content iff it is not yet
//! mastered and every prerequisite is mastered. Among eligible objectives,
//! remediation candidates (struggling or partial) come first, ordered by
//! the recency of the history entry that flagged them. Fresh objectives
//! follow in catalog declaration order. Ordering is never randomized, so
//! identical inputs always yield identical pathways.

use crate::catalog::CurriculumCatalog;
use crate::core::{LearnerProfile, LearningObjective, MasteryStatus};

/// Resolves which objectives may currently be selected for new content.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityResolver<'a> {
    catalog: &'a CurriculumCatalog,
}

impl<'a> EligibilityResolver<'a> {
    /// Create a resolver over a catalog.
    pub fn new(catalog: &'a CurriculumCatalog) -> Self {
        Self { catalog }
    }

    /// Check the eligibility predicate for a single objective.
    pub fn is_eligible(&self, profile: &LearnerProfile, lo: &LearningObjective) -> bool {
        profile.status_of(&lo.id).is_open()
            && lo
                .prerequisites
                .iter()
                .all(|p| profile.status_of(p) == MasteryStatus::Mastered)
    }

    /// All currently eligible objectives, in selection order.
    ///
    /// Remediation candidates first (most recently attempted first), then
    /// fresh objectives in declaration order. An empty result is a normal
    /// end-state (pathway complete or curriculum exhausted), not an error.
    pub fn eligible(&self, profile: &LearnerProfile) -> Vec<&'a LearningObjective> {
        let mut remediation: Vec<(&LearningObjective, Option<usize>)> = Vec::new();
        let mut fresh: Vec<&LearningObjective> = Vec::new();

        for lo in self.catalog.all_los() {
            if !self.is_eligible(profile, lo) {
                continue;
            }
            if profile.status_of(&lo.id).needs_remediation() {
                remediation.push((lo, profile.last_outcome_index(&lo.id)));
            } else {
                fresh.push(lo);
            }
        }

        // Most recent triggering entry first; candidates with no history
        // (profile edits) sort last. The stable sort preserves declaration
        // order among ties.
        remediation.sort_by(|a, b| b.1.cmp(&a.1));

        remediation
            .into_iter()
            .map(|(lo, _)| lo)
            .chain(fresh)
            .collect()
    }

    /// Eligible objectives currently flagged struggling or partial.
    ///
    /// Ordered by recency of the triggering history entry, most recent
    /// first.
    pub fn remediation_candidates(&self, profile: &LearnerProfile) -> Vec<&'a LearningObjective> {
        self.eligible(profile)
            .into_iter()
            .filter(|lo| profile.status_of(&lo.id).needs_remediation())
            .collect()
    }

    /// Mastered objectives, offered as optional enrichment.
    ///
    /// Declaration order; mastered objectives never appear in ordinary
    /// pathway generation.
    pub fn enrichment_candidates(&self, profile: &LearnerProfile) -> Vec<&'a LearningObjective> {
        self.catalog
            .all_los()
            .iter()
            .filter(|lo| profile.status_of(&lo.id) == MasteryStatus::Mastered)
            .collect()
    }
}
