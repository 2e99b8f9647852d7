//! File-based learner profile storage for Trellis.
//!
//! Profiles are stored as JSON files in `~/.trellis/profiles/`, one file
//! per learner. Atomic writes are achieved via temp file + rename; the
//! version check rereads the stored file immediately before the rename.
//!
//! The version check and the rename are not a single atomic unit, so two
//! writers in the same window can still race; the check narrows the window
//! to microseconds, which is the contract this store offers for the
//! single-machine deployments it targets.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::config::profiles_dir;
use crate::core::LearnerProfile;
use crate::error::{Result, TrellisError};
use crate::storage::{validate_learner_id, ProfileStore};

/// File-based profile storage.
///
/// Stores profiles as JSON files in a configurable directory.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    /// Directory where profile files are stored.
    profiles_dir: PathBuf,
}

impl FileProfileStore {
    /// Create a new file profile store with the default directory.
    ///
    /// Uses `~/.trellis/profiles/` or `$TRELLIS_HOME/profiles/`.
    pub fn new() -> Result<Self> {
        let dir = profiles_dir().ok_or_else(|| {
            TrellisError::config("Could not determine profiles directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a new file profile store with a custom directory.
    pub fn with_dir(profiles_dir: impl Into<PathBuf>) -> Result<Self> {
        let profiles_dir = profiles_dir.into();

        if !profiles_dir.exists() {
            fs::create_dir_all(&profiles_dir)
                .map_err(|e| TrellisError::storage(&profiles_dir, e))?;
        }

        Ok(Self { profiles_dir })
    }

    /// Get the path for a profile file.
    fn profile_path(&self, learner_id: &str) -> PathBuf {
        self.profiles_dir.join(format!("{}.json", learner_id))
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, learner_id: &str) -> PathBuf {
        self.profiles_dir.join(format!(".{}.json.tmp", learner_id))
    }

    fn read_profile(&self, path: &PathBuf) -> Result<LearnerProfile> {
        let content = fs::read_to_string(path).map_err(|e| TrellisError::storage(path, e))?;
        let profile: LearnerProfile = serde_json::from_str(&content)?;
        Ok(profile)
    }

    /// Write a profile atomically using temp file + rename.
    fn atomic_write(&self, profile: &LearnerProfile) -> Result<()> {
        let final_path = self.profile_path(&profile.learner_id);
        let temp_path = self.temp_path(&profile.learner_id);

        let json = serde_json::to_string_pretty(profile)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| TrellisError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| TrellisError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| TrellisError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| TrellisError::storage(&final_path, e))?;

        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self, learner_id: &str) -> Result<Option<LearnerProfile>> {
        validate_learner_id(learner_id)?;
        let path = self.profile_path(learner_id);

        if !path.exists() {
            return Ok(None);
        }

        Ok(Some(self.read_profile(&path)?))
    }

    fn save(&self, profile: &mut LearnerProfile) -> Result<()> {
        validate_learner_id(&profile.learner_id)?;
        let path = self.profile_path(&profile.learner_id);

        if path.exists() {
            let stored = self.read_profile(&path)?;
            if stored.version != profile.version {
                return Err(TrellisError::conflict(
                    profile.learner_id.clone(),
                    profile.version,
                    stored.version,
                ));
            }
        }

        profile.version += 1;
        if let Err(e) = self.atomic_write(profile) {
            profile.version -= 1;
            return Err(e);
        }
        Ok(())
    }

    fn list(&self, limit: usize) -> Result<Vec<LearnerProfile>> {
        if !self.profiles_dir.exists() {
            return Ok(Vec::new());
        }

        let mut profiles: Vec<LearnerProfile> = Vec::new();

        let entries = fs::read_dir(&self.profiles_dir)
            .map_err(|e| TrellisError::storage(&self.profiles_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| TrellisError::storage(&self.profiles_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            // Unreadable or malformed files are skipped, not fatal to a listing
            match self.read_profile(&path) {
                Ok(profile) => profiles.push(profile),
                Err(e) => {
                    tracing::warn!("skipping unreadable profile {}: {}", path.display(), e);
                }
            }
        }

        profiles.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        profiles.truncate(limit);

        Ok(profiles)
    }

    fn delete(&self, learner_id: &str) -> Result<()> {
        validate_learner_id(learner_id)?;
        let path = self.profile_path(learner_id);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| TrellisError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(learner_id);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MasteryStatus;
    use crate::storage::traits::tests::{test_profile_store_conflict, test_profile_store_contract};
    use tempfile::TempDir;

    fn create_test_store() -> (FileProfileStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::with_dir(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_file_store_contract() {
        let (store, _dir) = create_test_store();
        test_profile_store_contract(&store);
    }

    #[test]
    fn test_file_store_conflict() {
        let (store, _dir) = create_test_store();
        test_profile_store_conflict(&store);
    }

    #[test]
    fn test_with_dir_creates_directory() {
        let dir = TempDir::new().unwrap();
        let profiles_path = dir.path().join("profiles");

        assert!(!profiles_path.exists());

        let _store = FileProfileStore::with_dir(&profiles_path).unwrap();

        assert!(profiles_path.exists());
        assert!(profiles_path.is_dir());
    }

    #[test]
    fn test_load_nonexistent() {
        let (store, _dir) = create_test_store();
        assert!(store.load("nobody").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let (store, _dir) = create_test_store();

        let mut profile = LearnerProfile::new("learner-1");
        profile.set_preference("modality", "visual");
        store.save(&mut profile).unwrap();

        let loaded = store.load("learner-1").unwrap().unwrap();
        assert_eq!(loaded.learner_id, "learner-1");
        assert_eq!(loaded.preference("modality"), Some("visual"));
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_save_rejects_bad_learner_id() {
        let (store, _dir) = create_test_store();
        let mut profile = LearnerProfile::new("../escape");
        let err = store.save(&mut profile).unwrap_err();
        assert!(matches!(err, TrellisError::Validation { .. }));
        // Version untouched on rejection
        assert_eq!(profile.version, 0);
    }

    #[test]
    fn test_stale_save_leaves_version_untouched() {
        let (store, _dir) = create_test_store();

        let mut profile = LearnerProfile::new("learner-1");
        store.save(&mut profile).unwrap();

        let mut stale = store.load("learner-1").unwrap().unwrap();
        let mut current = store.load("learner-1").unwrap().unwrap();
        store.save(&mut current).unwrap();

        stale.set_status("lo-1", MasteryStatus::Partial);
        let err = store.save(&mut stale).unwrap_err();
        assert!(matches!(err, TrellisError::Conflict { .. }));
        assert_eq!(stale.version, 1);
    }

    #[test]
    fn test_atomic_write_creates_valid_json() {
        let (store, _dir) = create_test_store();

        let mut profile = LearnerProfile::new("learner-atomic");
        store.save(&mut profile).unwrap();

        let path = store.profile_path("learner-atomic");
        let content = fs::read_to_string(&path).unwrap();
        let parsed: LearnerProfile = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.learner_id, "learner-atomic");
    }

    #[test]
    fn test_temp_file_cleaned_up() {
        let (store, _dir) = create_test_store();

        let mut profile = LearnerProfile::new("learner-temp");
        store.save(&mut profile).unwrap();

        assert!(!store.temp_path("learner-temp").exists());
    }

    #[test]
    fn test_list_ordering_and_limit() {
        let (store, _dir) = create_test_store();

        for i in 0..5 {
            let mut profile = LearnerProfile::new(format!("learner-{i}"));
            store.save(&mut profile).unwrap();
        }

        // updated_at drives the ordering; the last-created profile is newest
        let listed = store.list(3).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].learner_id, "learner-4");
    }

    #[test]
    fn test_list_ignores_invalid_json() {
        let (store, dir) = create_test_store();

        let mut profile = LearnerProfile::new("valid");
        store.save(&mut profile).unwrap();

        fs::write(dir.path().join("broken.json"), "not valid json").unwrap();

        let listed = store.list(10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].learner_id, "valid");
    }

    #[test]
    fn test_delete_nonexistent() {
        let (store, _dir) = create_test_store();
        store.delete("nobody").unwrap();
    }
}
