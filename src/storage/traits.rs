//! Profile storage traits for Trellis.
//!
//! This module defines the `ProfileStore` trait for learner profile
//! persistence. Stores implement optimistic concurrency: each profile
//! carries a monotonically increasing `version`, and `save` rejects a
//! profile whose version no longer matches the stored one. Callers recover
//! from a conflict by reloading, reapplying their change, and retrying.

use std::sync::Arc;

use crate::core::LearnerProfile;
use crate::error::{Result, TrellisError};

/// Validate a learner id before it is used as a storage key.
///
/// Ids key file names in the file-backed store, so path separators and
/// parent references are rejected up front.
pub fn validate_learner_id(learner_id: &str) -> Result<()> {
    if learner_id.is_empty() {
        return Err(TrellisError::validation("learner id must not be empty"));
    }
    if learner_id.contains('/') || learner_id.contains('\\') || learner_id.contains("..") {
        return Err(TrellisError::validation(format!(
            "learner id {learner_id:?} contains path characters"
        )));
    }
    Ok(())
}

/// Trait for learner profile storage backends.
///
/// Implementations provide versioned persistence for learner profiles,
/// keyed by learner id. Learners are independent; no cross-learner
/// coordination is required of implementations.
pub trait ProfileStore: Send + Sync {
    /// Retrieve a profile by learner id.
    ///
    /// Returns `Ok(None)` if the learner has never been saved.
    fn load(&self, learner_id: &str) -> Result<Option<LearnerProfile>>;

    /// Save a profile, enforcing the optimistic version check.
    ///
    /// Fails with a conflict error if the stored version has advanced
    /// since this profile was loaded. On success the profile's `version`
    /// is bumped in place to the newly stored value.
    fn save(&self, profile: &mut LearnerProfile) -> Result<()>;

    /// List up to `limit` profiles, ordered by most recently updated.
    fn list(&self, limit: usize) -> Result<Vec<LearnerProfile>>;

    /// Delete a profile.
    ///
    /// Returns `Ok(())` even if the learner doesn't exist.
    fn delete(&self, learner_id: &str) -> Result<()>;

    /// Check if a profile exists.
    fn exists(&self, learner_id: &str) -> Result<bool> {
        Ok(self.load(learner_id)?.is_some())
    }
}

/// Blanket implementation of ProfileStore for Arc-wrapped stores.
///
/// This allows using `Arc<T>` where `T: ProfileStore` is expected, which
/// is useful for sharing stores between tests and the engine.
impl<T: ProfileStore + ?Sized> ProfileStore for Arc<T> {
    fn load(&self, learner_id: &str) -> Result<Option<LearnerProfile>> {
        (**self).load(learner_id)
    }

    fn save(&self, profile: &mut LearnerProfile) -> Result<()> {
        (**self).save(profile)
    }

    fn list(&self, limit: usize) -> Result<Vec<LearnerProfile>> {
        (**self).list(limit)
    }

    fn delete(&self, learner_id: &str) -> Result<()> {
        (**self).delete(learner_id)
    }
}
