//! Generate command for Trellis.
//!
//! Generates the next pathway segment for a learner: the eligible
//! objectives in selection order, each with its selected content items.

use serde::{Deserialize, Serialize};

use crate::pathway::{GenerateOptions, PathwayEngine, PathwaySegment, SegmentReason};
use crate::storage::ProfileStore;

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateCmdOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum objectives in the segment (defaults to config).
    pub max_los: Option<usize>,
    /// Maximum content items per objective (defaults to config).
    pub max_items: Option<usize>,
    /// Offer mastered objectives as enrichment.
    pub enrichment: bool,
}

/// Output format for the generate command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The generated segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<PathwaySegment>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateOutput {
    /// Create a successful output.
    pub fn success(segment: PathwaySegment) -> Self {
        Self {
            success: true,
            segment: Some(segment),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            segment: None,
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Generate failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let Some(segment) = &self.segment else {
            return String::new();
        };

        if segment.entries.is_empty() {
            return match segment.reason {
                Some(SegmentReason::NoEligibleObjectives) => format!(
                    "No eligible objectives for {} (pathway complete or prerequisites unmet).",
                    segment.learner_id
                ),
                None => format!("Empty segment for {}.", segment.learner_id),
            };
        }

        let mut lines = vec![format!("Pathway segment for {}:", segment.learner_id)];
        for entry in &segment.entries {
            lines.push(String::new());
            lines.push(format!(
                "  {} - {} ({}/{})",
                entry.objective.id,
                entry.objective.description,
                entry.objective.subject,
                entry.objective.strand
            ));
            if entry.content_gap {
                lines.push("    (no content available for this objective)".to_string());
            }
            for item in &entry.items {
                lines.push(format!(
                    "    [{} / {}] {} - {}",
                    item.modality.display_name(),
                    item.difficulty.display_name(),
                    item.id,
                    item.title
                ));
            }
        }

        lines.join("\n")
    }
}

/// The generate command implementation.
pub struct GenerateCommand<S: ProfileStore> {
    engine: PathwayEngine<S>,
}

impl<S: ProfileStore> GenerateCommand<S> {
    /// Create a new generate command.
    pub fn new(engine: PathwayEngine<S>) -> Self {
        Self { engine }
    }

    /// Run the generate command.
    pub fn run(&self, learner_id: &str, options: &GenerateCmdOptions) -> GenerateOutput {
        let mut generate = GenerateOptions::from_config(self.engine.config());
        if let Some(max_los) = options.max_los {
            generate.max_los = max_los;
        }
        if let Some(max_items) = options.max_items {
            generate.max_items_per_lo = max_items;
        }
        generate.enrichment = options.enrichment;

        match self.engine.generate_segment(learner_id, generate) {
            Ok(segment) => GenerateOutput::success(segment),
            Err(e) => GenerateOutput::failure(e.to_string()),
        }
    }

    /// Format the output according to the options.
    pub fn format_output(&self, output: &GenerateOutput, options: &GenerateCmdOptions) -> String {
        if options.quiet {
            return String::new();
        }
        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|e| {
                format!("{{\"success\":false,\"error\":\"serialization failed: {e}\"}}")
            })
        } else {
            output.format_text()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CurriculumCatalog;
    use crate::config::Config;
    use crate::core::{ContentItem, Difficulty, LearningObjective, Modality};
    use crate::storage::MemoryProfileStore;

    fn command() -> GenerateCommand<MemoryProfileStore> {
        let catalog = CurriculumCatalog::build(
            vec![
                LearningObjective::new("a", "math", "fractions", "Recognize fractions"),
                LearningObjective::new("b", "math", "fractions", "Compare fractions")
                    .with_prerequisites(["a"]),
            ],
            vec![ContentItem::new(
                "v1",
                "Fractions video",
                Modality::Video,
                Difficulty::Easy,
                ["a"],
            )],
        )
        .unwrap();
        let engine = PathwayEngine::new(catalog, MemoryProfileStore::new(), Config::default());
        GenerateCommand::new(engine)
    }

    #[test]
    fn test_generate_fresh_learner() {
        let cmd = command();
        let output = cmd.run("l1", &GenerateCmdOptions::default());

        assert!(output.success);
        let segment = output.segment.unwrap();
        assert_eq!(segment.entries.len(), 1);
        assert_eq!(segment.entries[0].objective.id, "a");
    }

    #[test]
    fn test_generate_option_overrides() {
        let cmd = command();
        let output = cmd.run(
            "l1",
            &GenerateCmdOptions {
                max_los: Some(2),
                max_items: Some(1),
                ..Default::default()
            },
        );

        assert!(output.success);
        // Only "a" is eligible regardless of the higher cap
        assert_eq!(output.segment.unwrap().entries.len(), 1);
    }

    #[test]
    fn test_generate_invalid_learner_id() {
        let cmd = command();
        let output = cmd.run("../escape", &GenerateCmdOptions::default());
        assert!(!output.success);
        assert!(output.error.unwrap().contains("validation"));
    }

    #[test]
    fn test_format_text_lists_items() {
        let cmd = command();
        let output = cmd.run("l1", &GenerateCmdOptions::default());
        let text = cmd.format_output(&output, &GenerateCmdOptions::default());

        assert!(text.contains("Pathway segment for l1"));
        assert!(text.contains("v1"));
        assert!(text.contains("Video"));
    }

    #[test]
    fn test_format_json() {
        let cmd = command();
        let options = GenerateCmdOptions {
            json: true,
            ..Default::default()
        };
        let output = cmd.run("l1", &options);
        let json = cmd.format_output(&output, &options);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["success"], true);
    }

    #[test]
    fn test_quiet_suppresses_output() {
        let cmd = command();
        let options = GenerateCmdOptions {
            quiet: true,
            ..Default::default()
        };
        let output = cmd.run("l1", &options);
        assert!(cmd.format_output(&output, &options).is_empty());
    }

    #[test]
    fn test_format_text_no_eligible() {
        let cmd = command();

        // Master everything reachable to exhaust the pathway
        cmd.engine
            .submit_outcome("l1", &crate::pathway::Outcome::new("v1", "a", 0.9, true))
            .unwrap();
        cmd.engine
            .submit_outcome("l1", &crate::pathway::Outcome::new("x", "b", 0.9, true))
            .unwrap();

        let output = cmd.run("l1", &GenerateCmdOptions::default());
        let text = output.format_text();
        assert!(text.contains("No eligible objectives"));
    }
}
