//! Init command for Trellis.
//!
//! Scaffolds a `.trellis/` directory with a default config and a small
//! sample catalog, so a new project has something runnable to edit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::source::CatalogDocument;
use crate::config::Config;
use crate::core::{ContentItem, Difficulty, LearningObjective, Modality};
use crate::error::{Result, TrellisError};

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Force overwrite existing files.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Files that were created.
    pub created: Vec<String>,
    /// Files that were skipped because they already exist.
    pub skipped: Vec<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Init failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        for file in &self.created {
            lines.push(format!("created {file}"));
        }
        for file in &self.skipped {
            lines.push(format!("skipped {file} (already exists, use --force)"));
        }
        if lines.is_empty() {
            lines.push("nothing to do".to_string());
        }
        lines.join("\n")
    }
}

/// The init command implementation.
pub struct InitCommand {
    cwd: PathBuf,
}

impl InitCommand {
    /// Create a new init command for a working directory.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        match self.scaffold(options.force) {
            Ok((created, skipped)) => InitOutput {
                success: true,
                created,
                skipped,
                error: None,
            },
            Err(e) => InitOutput {
                success: false,
                created: vec![],
                skipped: vec![],
                error: Some(e.to_string()),
            },
        }
    }

    fn scaffold(&self, force: bool) -> Result<(Vec<String>, Vec<String>)> {
        let trellis_dir = self.cwd.join(".trellis");
        if !trellis_dir.exists() {
            fs::create_dir_all(&trellis_dir)
                .map_err(|e| TrellisError::storage(&trellis_dir, e))?;
        }

        let mut created = Vec::new();
        let mut skipped = Vec::new();

        let config_path = trellis_dir.join("config.toml");
        if config_path.exists() && !force {
            skipped.push(display_relative(&config_path, &self.cwd));
        } else {
            Config::default().save_project(&self.cwd)?;
            created.push(display_relative(&config_path, &self.cwd));
        }

        let catalog_path = trellis_dir.join("catalog.json");
        if catalog_path.exists() && !force {
            skipped.push(display_relative(&catalog_path, &self.cwd));
        } else {
            let content = serde_json::to_string_pretty(&sample_catalog())?;
            fs::write(&catalog_path, content)
                .map_err(|e| TrellisError::storage(&catalog_path, e))?;
            created.push(display_relative(&catalog_path, &self.cwd));
        }

        Ok((created, skipped))
    }

    /// Format the output according to the options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
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

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// A minimal but runnable sample curriculum.
fn sample_catalog() -> CatalogDocument {
    CatalogDocument {
        los: vec![
            LearningObjective::new(
                "frac-recognize",
                "math",
                "fractions",
                "Recognize unit fractions",
            ),
            LearningObjective::new(
                "frac-compare",
                "math",
                "fractions",
                "Compare fractions with like denominators",
            )
            .with_prerequisites(["frac-recognize"]),
        ],
        content: vec![
            ContentItem::new(
                "frac-video-1",
                "What is a fraction?",
                Modality::Video,
                Difficulty::Easy,
                ["frac-recognize"],
            )
            .with_target_preferences(["visual"]),
            ContentItem::new(
                "frac-game-1",
                "Pizza slicer",
                Modality::Game,
                Difficulty::Medium,
                ["frac-recognize"],
            )
            .with_target_preferences(["interactive"]),
            ContentItem::new(
                "frac-ws-1",
                "Comparing fractions worksheet",
                Modality::Worksheet,
                Difficulty::Easy,
                ["frac-compare"],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSource, JsonCatalogSource};
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_files() {
        let dir = TempDir::new().unwrap();
        let cmd = InitCommand::new(dir.path());

        let output = cmd.run(&InitOptions::default());

        assert!(output.success);
        assert_eq!(output.created.len(), 2);
        assert!(output.skipped.is_empty());
        assert!(dir.path().join(".trellis/config.toml").exists());
        assert!(dir.path().join(".trellis/catalog.json").exists());
    }

    #[test]
    fn test_init_skips_existing() {
        let dir = TempDir::new().unwrap();
        let cmd = InitCommand::new(dir.path());

        cmd.run(&InitOptions::default());
        let output = cmd.run(&InitOptions::default());

        assert!(output.success);
        assert!(output.created.is_empty());
        assert_eq!(output.skipped.len(), 2);
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let cmd = InitCommand::new(dir.path());

        cmd.run(&InitOptions::default());
        let output = cmd.run(&InitOptions {
            force: true,
            ..Default::default()
        });

        assert!(output.success);
        assert_eq!(output.created.len(), 2);
    }

    #[test]
    fn test_sample_catalog_validates() {
        let dir = TempDir::new().unwrap();
        let cmd = InitCommand::new(dir.path());
        cmd.run(&InitOptions::default());

        let source = JsonCatalogSource::new(dir.path().join(".trellis/catalog.json"));
        let catalog = source.load_catalog().unwrap();
        assert_eq!(catalog.lo_count(), 2);
        assert_eq!(catalog.content_count(), 3);
    }

    #[test]
    fn test_format_text() {
        let dir = TempDir::new().unwrap();
        let cmd = InitCommand::new(dir.path());
        let output = cmd.run(&InitOptions::default());

        let text = output.format_text();
        assert!(text.contains("created"));
    }
}
