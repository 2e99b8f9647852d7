//! Catalog command for Trellis.
//!
//! Validates a curriculum catalog file and summarizes its contents:
//! objective count, content count, root objectives, and objectives with no
//! content (authoring gaps). Validation failures here are the same ones
//! that would halt engine startup, so curriculum authors can check a
//! catalog before deploying it.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSource, CurriculumCatalog};

/// Options for the catalog command.
#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the catalog command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOutput {
    /// Whether validation passed.
    pub success: bool,
    /// Number of objectives.
    pub lo_count: usize,
    /// Number of content items.
    pub content_count: usize,
    /// Objectives with no prerequisites.
    pub roots: Vec<String>,
    /// Objectives with no content items (authoring gaps).
    pub uncovered: Vec<String>,
    /// Error message if validation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CatalogOutput {
    /// Create a successful output from a validated catalog.
    pub fn from_catalog(catalog: &CurriculumCatalog) -> Self {
        let roots = catalog
            .all_los()
            .iter()
            .filter(|lo| lo.is_root())
            .map(|lo| lo.id.clone())
            .collect();
        let uncovered = catalog
            .all_los()
            .iter()
            .filter(|lo| catalog.content_for_lo(&lo.id).is_empty())
            .map(|lo| lo.id.clone())
            .collect();

        Self {
            success: true,
            lo_count: catalog.lo_count(),
            content_count: catalog.content_count(),
            roots,
            uncovered,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            lo_count: 0,
            content_count: 0,
            roots: vec![],
            uncovered: vec![],
            error: Some(error.into()),
        }
    }

    /// Format as human-readable text.
    pub fn format_text(&self) -> String {
        if !self.success {
            return format!(
                "Catalog invalid: {}",
                self.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = vec![format!(
            "Catalog valid: {} objectives, {} content items",
            self.lo_count, self.content_count
        )];
        lines.push(format!("  roots: {}", join_or_dash(&self.roots)));
        if !self.uncovered.is_empty() {
            lines.push(format!(
                "  objectives with no content: {}",
                self.uncovered.join(", ")
            ));
        }
        lines.join("\n")
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// The catalog command implementation.
pub struct CatalogCommand<C: CatalogSource> {
    source: C,
}

impl<C: CatalogSource> CatalogCommand<C> {
    /// Create a new catalog command.
    pub fn new(source: C) -> Self {
        Self { source }
    }

    /// Run the catalog command.
    pub fn run(&self, _options: &CatalogOptions) -> CatalogOutput {
        match self.source.load_catalog() {
            Ok(catalog) => CatalogOutput::from_catalog(&catalog),
            Err(e) => CatalogOutput::failure(e.to_string()),
        }
    }

    /// Format the output according to the options.
    pub fn format_output(&self, output: &CatalogOutput, options: &CatalogOptions) -> String {
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
