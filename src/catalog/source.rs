//! Catalog source contract for Trellis.
//!
//! The engine never reads curriculum data itself; it consumes a
//! `CatalogSource` and validates whatever comes back through
//! `CurriculumCatalog::build`. The shipped implementation reads a JSON
//! document with `los` and `content` arrays.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::CurriculumCatalog;
use crate::core::{ContentItem, LearningObjective};
use crate::error::{Result, TrellisError};

/// Read contract for curriculum data.
pub trait CatalogSource {
    /// Load the raw objective and content lists.
    fn load(&self) -> Result<(Vec<LearningObjective>, Vec<ContentItem>)>;

    /// Load and validate into a catalog.
    fn load_catalog(&self) -> Result<CurriculumCatalog> {
        let (los, content) = self.load()?;
        CurriculumCatalog::build(los, content)
    }
}

/// On-disk JSON catalog document.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Objectives in declaration order.
    #[serde(default)]
    pub los: Vec<LearningObjective>,
    /// Content items in declaration order.
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

/// Catalog source reading a JSON document from disk.
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    /// Create a source for the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonCatalogSource {
    fn load(&self) -> Result<(Vec<LearningObjective>, Vec<ContentItem>)> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| TrellisError::storage(&self.path, e))?;
        let doc: CatalogDocument = serde_json::from_str(&raw)?;
        Ok((doc.los, doc.content))
    }
}

/// In-memory catalog source for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    los: Vec<LearningObjective>,
    content: Vec<ContentItem>,
}

impl StaticCatalogSource {
    /// Create a source over the given lists.
    pub fn new(los: Vec<LearningObjective>, content: Vec<ContentItem>) -> Self {
        Self { los, content }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn load(&self) -> Result<(Vec<LearningObjective>, Vec<ContentItem>)> {
        Ok((self.los.clone(), self.content.clone()))
    }
}
