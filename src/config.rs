//! Configuration loading for Trellis.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.trellis/config.toml`)
//! 3. User config (`~/.trellis/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The engine runs with sensible defaults
//! when no config exists. Invalid values are warned about and ignored
//! rather than failing the load.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TrellisError};

/// Main configuration struct for Trellis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Mastery threshold configuration.
    pub mastery: MasteryConfig,
    /// Pathway segment sizing configuration.
    pub selection: SelectionConfig,
}

/// Mastery threshold configuration.
///
/// A completed outcome scoring at or above `mastered_threshold` masters the
/// objective; below `struggling_threshold` marks it struggling; anything in
/// between is partial understanding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MasteryConfig {
    /// Score at or above which an objective is mastered.
    pub mastered_threshold: f64,
    /// Score below which an objective is struggling.
    pub struggling_threshold: f64,
}

impl MasteryConfig {
    /// Check if a threshold value is valid (finite, in [0.0, 1.0]).
    pub fn is_valid_threshold(value: f64) -> bool {
        value.is_finite() && (0.0..=1.0).contains(&value)
    }

    /// Check if the pair is coherent (struggling strictly below mastered).
    pub fn is_coherent(&self) -> bool {
        Self::is_valid_threshold(self.mastered_threshold)
            && Self::is_valid_threshold(self.struggling_threshold)
            && self.struggling_threshold < self.mastered_threshold
    }
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            mastered_threshold: 0.85,
            struggling_threshold: 0.50,
        }
    }
}

/// Pathway segment sizing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum objectives per generated segment.
    pub max_los_per_segment: u32,
    /// Maximum content items selected per objective.
    pub max_items_per_lo: u32,
}

/// Minimum valid segment sizing value (a zero-sized segment is useless).
pub const MIN_SEGMENT_SIZE: u32 = 1;

impl SelectionConfig {
    /// Check if a sizing value is valid (must be >= 1).
    pub fn is_valid_size(value: u32) -> bool {
        value >= MIN_SEGMENT_SIZE
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_los_per_segment: 1,
            max_items_per_lo: 2,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.trellis/config.toml` in cwd)
    /// 3. User config (`~/.trellis/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        if !config.mastery.is_coherent() {
            eprintln!(
                "Warning: Incoherent mastery thresholds (struggling {} must be below mastered {}). \
                Using defaults.",
                config.mastery.struggling_threshold, config.mastery.mastered_threshold
            );
            config.mastery = MasteryConfig::default();
        }

        config
    }

    /// Load user config from `~/.trellis/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = trellis_home()?;
        let config_path = home.join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load project config from `.trellis/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = project_trellis_dir(cwd).join("config.toml");
        Self::load_from_file(&config_path).ok()
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| TrellisError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| TrellisError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // TRELLIS_MASTERED_THRESHOLD
        if let Ok(val) = env::var("TRELLIS_MASTERED_THRESHOLD") {
            match val.parse::<f64>() {
                Ok(n) => {
                    if MasteryConfig::is_valid_threshold(n) {
                        self.mastery.mastered_threshold = n;
                    } else {
                        eprintln!(
                            "Warning: Invalid TRELLIS_MASTERED_THRESHOLD value '{}'. \
                            Must be in range [0.0, 1.0]. Using default '{}'.",
                            n, self.mastery.mastered_threshold
                        );
                    }
                }
                Err(_) => eprintln!(
                    "Warning: Invalid TRELLIS_MASTERED_THRESHOLD value '{}'. \
                    Expected a decimal number. Using default '{}'.",
                    val, self.mastery.mastered_threshold
                ),
            }
        }

        // TRELLIS_STRUGGLING_THRESHOLD
        if let Ok(val) = env::var("TRELLIS_STRUGGLING_THRESHOLD") {
            match val.parse::<f64>() {
                Ok(n) => {
                    if MasteryConfig::is_valid_threshold(n) {
                        self.mastery.struggling_threshold = n;
                    } else {
                        eprintln!(
                            "Warning: Invalid TRELLIS_STRUGGLING_THRESHOLD value '{}'. \
                            Must be in range [0.0, 1.0]. Using default '{}'.",
                            n, self.mastery.struggling_threshold
                        );
                    }
                }
                Err(_) => eprintln!(
                    "Warning: Invalid TRELLIS_STRUGGLING_THRESHOLD value '{}'. \
                    Expected a decimal number. Using default '{}'.",
                    val, self.mastery.struggling_threshold
                ),
            }
        }

        // TRELLIS_MAX_LOS
        if let Ok(val) = env::var("TRELLIS_MAX_LOS") {
            match val.parse::<u32>() {
                Ok(n) if SelectionConfig::is_valid_size(n) => {
                    self.selection.max_los_per_segment = n;
                }
                Ok(n) => eprintln!(
                    "Warning: Invalid TRELLIS_MAX_LOS value '{}'. \
                    Must be >= {}. Using default '{}'.",
                    n, MIN_SEGMENT_SIZE, self.selection.max_los_per_segment
                ),
                Err(_) => eprintln!(
                    "Warning: Invalid TRELLIS_MAX_LOS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.selection.max_los_per_segment
                ),
            }
        }

        // TRELLIS_MAX_ITEMS
        if let Ok(val) = env::var("TRELLIS_MAX_ITEMS") {
            match val.parse::<u32>() {
                Ok(n) if SelectionConfig::is_valid_size(n) => {
                    self.selection.max_items_per_lo = n;
                }
                Ok(n) => eprintln!(
                    "Warning: Invalid TRELLIS_MAX_ITEMS value '{}'. \
                    Must be >= {}. Using default '{}'.",
                    n, MIN_SEGMENT_SIZE, self.selection.max_items_per_lo
                ),
                Err(_) => eprintln!(
                    "Warning: Invalid TRELLIS_MAX_ITEMS value '{}'. \
                    Expected a positive integer. Using default '{}'.",
                    val, self.selection.max_items_per_lo
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence: non-default fields from `other`
    /// are applied to `self`, enabling additive layering of the precedence
    /// chain. A config cannot explicitly set a value back to the default to
    /// mask a non-default value from a lower layer; each layer only needs
    /// to specify its customizations.
    fn merge(mut self, other: Config) -> Self {
        let default_mastery = MasteryConfig::default();
        if (other.mastery.mastered_threshold - default_mastery.mastered_threshold).abs()
            > f64::EPSILON
        {
            self.mastery.mastered_threshold = other.mastery.mastered_threshold;
        }
        if (other.mastery.struggling_threshold - default_mastery.struggling_threshold).abs()
            > f64::EPSILON
        {
            self.mastery.struggling_threshold = other.mastery.struggling_threshold;
        }

        let default_selection = SelectionConfig::default();
        if other.selection.max_los_per_segment != default_selection.max_los_per_segment {
            self.selection.max_los_per_segment = other.selection.max_los_per_segment;
        }
        if other.selection.max_items_per_lo != default_selection.max_items_per_lo {
            self.selection.max_items_per_lo = other.selection.max_items_per_lo;
        }

        self
    }

    /// Save configuration to the project config file.
    ///
    /// Writes to `.trellis/config.toml` in the given directory, creating
    /// the `.trellis` directory if needed. Uses atomic write (temp file,
    /// then rename).
    pub fn save_project(&self, cwd: &Path) -> Result<()> {
        let trellis_dir = cwd.join(".trellis");

        if !trellis_dir.exists() {
            fs::create_dir_all(&trellis_dir).map_err(|e| TrellisError::storage(&trellis_dir, e))?;
        }

        let config_path = trellis_dir.join("config.toml");

        let content =
            toml::to_string_pretty(self).map_err(|e| TrellisError::config(e.to_string()))?;

        let temp_path = trellis_dir.join(".config.toml.tmp");
        fs::write(&temp_path, &content).map_err(|e| TrellisError::storage(&temp_path, e))?;

        let file = fs::File::open(&temp_path).map_err(|e| TrellisError::storage(&temp_path, e))?;
        file.sync_all()
            .map_err(|e| TrellisError::storage(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &config_path).map_err(|e| TrellisError::storage(&config_path, e))?;

        Ok(())
    }
}

/// Get the Trellis home directory.
///
/// Checks `TRELLIS_HOME` environment variable first, then falls back to
/// `~/.trellis`.
pub fn trellis_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("TRELLIS_HOME") {
        if home.is_empty() {
            tracing::warn!("TRELLIS_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("TRELLIS_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".trellis"));
    }

    // Fallback for containerized/minimal environments without HOME
    let fallback = std::env::temp_dir().join("trellis");
    tracing::warn!("HOME not set, using fallback location: {}", fallback.display());
    Some(fallback)
}

/// Get the profiles directory.
///
/// Returns `<trellis_home>/profiles/`.
pub fn profiles_dir() -> Option<PathBuf> {
    trellis_home().map(|h| h.join("profiles"))
}

/// Find the project root for a given working directory.
///
/// Walks up the directory tree looking for an existing `.trellis/`
/// directory; falls back to the original working directory if none is
/// found.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    for ancestor in cwd.ancestors() {
        if ancestor.join(".trellis").is_dir() {
            return ancestor.to_path_buf();
        }
    }
    cwd.to_path_buf()
}

/// Get the project trellis directory for a given working directory.
pub fn project_trellis_dir(cwd: &Path) -> PathBuf {
    find_project_root(cwd).join(".trellis")
}

/// Get the project catalog file path.
///
/// Returns `<project_root>/.trellis/catalog.json`.
pub fn project_catalog_path(cwd: &Path) -> PathBuf {
    project_trellis_dir(cwd).join("catalog.json")
}
