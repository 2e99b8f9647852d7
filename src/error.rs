//! Unified error types for Trellis.
//!
//! Catalog errors (`CycleDetected`, `DanglingReference`) are fatal at load
//! time and must halt startup. Validation errors reject the offending request
//! without mutating state. Conflict errors are recoverable: the caller
//! reloads the profile, reapplies the change, and retries the save.
//!
//! "No eligible objectives" and "no content available" are not errors; they
//! are reason codes on pathway results (see `pathway::engine`).

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Trellis operations.
#[derive(Error, Debug)]
pub enum TrellisError {
    /// The prerequisite graph contains a cycle through the named objective.
    #[error("prerequisite cycle detected through objective {lo_id}")]
    CycleDetected { lo_id: String },

    /// A prerequisite or coverage entry references a non-existent objective.
    #[error("dangling reference: {from} references unknown objective {missing}")]
    DanglingReference { from: String, missing: String },

    /// Malformed input: bad outcome score, unknown id, invalid catalog entry.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Stale profile version on save; reload and retry.
    #[error("version conflict for learner {learner_id}: expected {expected}, store has {found}")]
    Conflict {
        learner_id: String,
        expected: u64,
        found: u64,
    },

    /// I/O errors from profile or catalog file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for Trellis operations.
pub type Result<T> = std::result::Result<T, TrellisError>;

impl TrellisError {
    /// Create a cycle-detected error.
    pub fn cycle(lo_id: impl Into<String>) -> Self {
        Self::CycleDetected {
            lo_id: lo_id.into(),
        }
    }

    /// Create a dangling-reference error.
    pub fn dangling(from: impl Into<String>, missing: impl Into<String>) -> Self {
        Self::DanglingReference {
            from: from.into(),
            missing: missing.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a version-conflict error.
    pub fn conflict(learner_id: impl Into<String>, expected: u64, found: u64) -> Self {
        Self::Conflict {
            learner_id: learner_id.into(),
            expected,
            found,
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check whether this error is fatal at catalog-load time.
    ///
    /// Cycle and dangling-reference errors mean the curriculum itself is
    /// broken; callers should halt startup rather than serve pathways from
    /// an invalid graph.
    pub fn is_catalog_fatal(&self) -> bool {
        matches!(
            self,
            Self::CycleDetected { .. } | Self::DanglingReference { .. }
        )
    }

    /// Check whether the caller can recover by reloading and retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<io::Error> for TrellisError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for TrellisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}
