//! In-memory learner profile storage.
//!
//! This module provides a thread-safe in-memory implementation of the
//! ProfileStore trait, for unit tests and for embedding the engine without
//! a filesystem. The version check and the insert happen under one write
//! lock, so this store's conflict detection is race-free.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::LearnerProfile;
use crate::error::{Result, TrellisError};
use crate::storage::{validate_learner_id, ProfileStore};

/// In-memory profile store.
///
/// Thread-safe implementation using `RwLock<HashMap>`. Profiles are lost
/// when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, LearnerProfile>>,
}

impl MemoryProfileStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of profiles in the store.
    pub fn len(&self) -> usize {
        self.profiles.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.profiles.read().unwrap().is_empty()
    }

    /// Clear all profiles from the store.
    pub fn clear(&self) {
        self.profiles.write().unwrap().clear();
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, learner_id: &str) -> Result<Option<LearnerProfile>> {
        validate_learner_id(learner_id)?;
        let profiles = self.profiles.read().unwrap();
        Ok(profiles.get(learner_id).cloned())
    }

    fn save(&self, profile: &mut LearnerProfile) -> Result<()> {
        validate_learner_id(&profile.learner_id)?;
        let mut profiles = self.profiles.write().unwrap();

        if let Some(stored) = profiles.get(&profile.learner_id) {
            if stored.version != profile.version {
                return Err(TrellisError::conflict(
                    profile.learner_id.clone(),
                    profile.version,
                    stored.version,
                ));
            }
        }

        profile.version += 1;
        profiles.insert(profile.learner_id.clone(), profile.clone());
        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<LearnerProfile>> {
        let profiles = self.profiles.read().unwrap();
        let mut result: Vec<LearnerProfile> = profiles.values().cloned().collect();

        // Sort by updated_at descending (most recent first)
        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        result.truncate(limit);

        Ok(result)
    }

    fn delete(&self, learner_id: &str) -> Result<()> {
        validate_learner_id(learner_id)?;
        let mut profiles = self.profiles.write().unwrap();
        profiles.remove(learner_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::{test_profile_store_conflict, test_profile_store_contract};

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryProfileStore::new();
        test_profile_store_contract(&store);
    }

    #[test]
    fn test_memory_store_conflict() {
        let store = MemoryProfileStore::new();
        test_profile_store_conflict(&store);
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryProfileStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_len_and_clear() {
        let store = MemoryProfileStore::new();

        let mut p1 = LearnerProfile::new("l1");
        let mut p2 = LearnerProfile::new("l2");
        store.save(&mut p1).unwrap();
        store.save(&mut p2).unwrap();
        assert_eq!(store.len(), 2);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_does_not_share_mutations() {
        let store = MemoryProfileStore::new();

        let mut profile = LearnerProfile::new("l1");
        store.save(&mut profile).unwrap();

        // Mutating the local copy after save must not affect the store
        profile.set_preference("modality", "visual");
        let loaded = store.load("l1").unwrap().unwrap();
        assert!(loaded.preference("modality").is_none());
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryProfileStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                let mut profile = LearnerProfile::new(format!("l{i}"));
                store_clone.save(&mut profile).unwrap();
                store_clone.load(&format!("l{i}")).unwrap();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_concurrent_stale_saves_one_wins() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryProfileStore::new());
        let mut seed = LearnerProfile::new("contended");
        store.save(&mut seed).unwrap();

        // Every thread starts from the same loaded version; the lock-guarded
        // version check admits exactly one of them.
        let mut handles = vec![];
        for _ in 0..8 {
            let store_clone = Arc::clone(&store);
            let mut stale = store.load("contended").unwrap().unwrap();
            handles.push(thread::spawn(move || store_clone.save(&mut stale).is_ok()));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.load("contended").unwrap().unwrap().version, 2);
    }
}
