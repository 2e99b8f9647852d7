//! Curriculum catalog for Trellis.
//!
//! The catalog is an immutable-per-load repository of learning objectives
//! and content items. `build` validates the input (unique ids, non-empty
//! coverage, no dangling references, an acyclic prerequisite graph) and
//! and then freezes id and membership indexes for O(1)-ish lookups. A new
//! curriculum version means a fresh build and a fresh validation pass.

pub mod source;

use std::collections::HashMap;

use crate::core::{ContentItem, LearningObjective};
use crate::error::{Result, TrellisError};

pub use source::{CatalogSource, JsonCatalogSource};

/// Immutable repository of objectives and content, indexed for lookup.
#[derive(Debug, Clone)]
pub struct CurriculumCatalog {
    /// Objectives in declaration order.
    los: Vec<LearningObjective>,
    /// Content items in declaration order.
    content: Vec<ContentItem>,
    /// Objective id → index into `los`.
    lo_index: HashMap<String, usize>,
    /// Content id → index into `content`.
    content_index: HashMap<String, usize>,
    /// Objective id → indexes of covering content, in declaration order.
    coverage: HashMap<String, Vec<usize>>,
}

impl CurriculumCatalog {
    /// Build and validate a catalog.
    ///
    /// Fails with `CycleDetected` if the prerequisite graph has a cycle,
    /// with `DanglingReference` if a prerequisite or coverage entry names
    /// an unknown objective, and with a validation error on duplicate ids
    /// or content items covering nothing.
    pub fn build(los: Vec<LearningObjective>, content: Vec<ContentItem>) -> Result<Self> {
        let mut lo_index = HashMap::with_capacity(los.len());
        for (i, lo) in los.iter().enumerate() {
            if lo.id.is_empty() {
                return Err(TrellisError::validation("objective with empty id"));
            }
            if lo_index.insert(lo.id.clone(), i).is_some() {
                return Err(TrellisError::validation(format!(
                    "duplicate objective id: {}",
                    lo.id
                )));
            }
        }

        // Prerequisites must reference declared objectives
        for lo in &los {
            for prereq in &lo.prerequisites {
                if !lo_index.contains_key(prereq) {
                    return Err(TrellisError::dangling(lo.id.clone(), prereq.clone()));
                }
            }
        }

        detect_cycles(&los, &lo_index)?;

        let mut content_index = HashMap::with_capacity(content.len());
        let mut coverage: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, item) in content.iter().enumerate() {
            if item.id.is_empty() {
                return Err(TrellisError::validation("content item with empty id"));
            }
            if content_index.insert(item.id.clone(), i).is_some() {
                return Err(TrellisError::validation(format!(
                    "duplicate content id: {}",
                    item.id
                )));
            }
            if item.covered_los.is_empty() {
                return Err(TrellisError::validation(format!(
                    "content item {} covers no objectives",
                    item.id
                )));
            }
            for lo_id in &item.covered_los {
                if !lo_index.contains_key(lo_id) {
                    return Err(TrellisError::dangling(item.id.clone(), lo_id.clone()));
                }
                coverage.entry(lo_id.clone()).or_default().push(i);
            }
        }

        Ok(Self {
            los,
            content,
            lo_index,
            content_index,
            coverage,
        })
    }

    /// Look up an objective by id.
    pub fn lo_by_id(&self, lo_id: &str) -> Option<&LearningObjective> {
        self.lo_index.get(lo_id).map(|&i| &self.los[i])
    }

    /// Look up a content item by id.
    pub fn content_by_id(&self, content_id: &str) -> Option<&ContentItem> {
        self.content_index.get(content_id).map(|&i| &self.content[i])
    }

    /// Content items covering an objective, in declaration order.
    ///
    /// Unknown ids yield an empty slice-equivalent; callers distinguish
    /// "unknown objective" through `lo_by_id`.
    pub fn content_for_lo(&self, lo_id: &str) -> Vec<&ContentItem> {
        self.coverage
            .get(lo_id)
            .map(|idxs| idxs.iter().map(|&i| &self.content[i]).collect())
            .unwrap_or_default()
    }

    /// All objectives in declaration order.
    pub fn all_los(&self) -> &[LearningObjective] {
        &self.los
    }

    /// All content items in declaration order.
    pub fn all_content(&self) -> &[ContentItem] {
        &self.content
    }

    /// Check if an objective id exists.
    pub fn contains_lo(&self, lo_id: &str) -> bool {
        self.lo_index.contains_key(lo_id)
    }

    /// Declaration index of an objective; the deterministic tie-break for
    /// ordering eligible objectives.
    pub fn declaration_index(&self, lo_id: &str) -> Option<usize> {
        self.lo_index.get(lo_id).copied()
    }

    /// Number of objectives.
    pub fn lo_count(&self) -> usize {
        self.los.len()
    }

    /// Number of content items.
    pub fn content_count(&self) -> usize {
        self.content.len()
    }
}

/// Depth-first cycle detection with a recursion-stack marker.
fn detect_cycles(los: &[LearningObjective], lo_index: &HashMap<String, usize>) -> Result<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; los.len()];

    // Iterative DFS; an explicit stack keeps deep chains off the call stack.
    // Each frame is (node, position in its prerequisite list).
    for start in 0..los.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        let mut stack: Vec<(usize, std::vec::IntoIter<usize>)> = Vec::new();
        marks[start] = Mark::OnStack;
        stack.push((start, prereq_indexes(&los[start], lo_index)));

        while !stack.is_empty() {
            // The frame borrow ends here so the stack can grow or shrink below.
            let advanced = {
                let frame = stack.last_mut().expect("stack checked non-empty");
                frame.1.next()
            };
            match advanced {
                Some(next) => match marks[next] {
                    Mark::OnStack => {
                        return Err(TrellisError::cycle(los[next].id.clone()));
                    }
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        stack.push((next, prereq_indexes(&los[next], lo_index)));
                    }
                    Mark::Done => {}
                },
                None => {
                    let (node, _) = stack.pop().expect("stack checked non-empty");
                    marks[node] = Mark::Done;
                }
            }
        }
    }

    Ok(())
}

/// Resolve an objective's prerequisites to declaration indexes.
///
/// References are validated before cycle detection runs, so the lookups
/// cannot miss.
fn prereq_indexes(
    lo: &LearningObjective,
    lo_index: &HashMap<String, usize>,
) -> std::vec::IntoIter<usize> {
    lo.prerequisites
        .iter()
        .map(|p| lo_index[p])
        .collect::<Vec<_>>()
        .into_iter()
}
