//! Game settings
//!
//! Loaded from an optional JSON file; every field falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::level::{BundledLevels, DirectoryLevels, LevelSource};

/// How freezing animations get completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    /// The simulation counts the animation down itself (headless)
    #[default]
    Timer,
    /// The renderer reports back through `complete_animation`
    External,
}

impl AnimationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationMode::Timer => "timer",
            AnimationMode::External => "external",
        }
    }
}

/// Error type for settings loading
#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    Invalid(String),
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::IoError(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::JsonError(e)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {}", e),
            SettingsError::JsonError(e) => write!(f, "JSON error: {}", e),
            SettingsError::Invalid(msg) => write!(f, "invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Levels ===
    /// Number of level files; the level index wraps after this
    pub total_levels: u32,
    /// First level played (1-based)
    pub start_level: u32,
    /// Directory with `level{N}.txt` files; bundled levels when unset
    pub level_dir: Option<PathBuf>,

    // === Physics ===
    /// Velocity fraction lost per second
    pub linear_damping: f32,
    /// Gravity magnitude cap (points/s²)
    pub max_gravity: f32,
    /// Player speed cap (points/s)
    pub max_speed: f32,
    pub player_radius: f32,

    // === Presentation ===
    pub animation_mode: AnimationMode,

    // === Headless demo ===
    pub demo_ticks: u32,
    pub demo_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_levels: TOTAL_LEVELS,
            start_level: START_LEVEL,
            level_dir: None,

            linear_damping: LINEAR_DAMPING,
            max_gravity: MAX_GRAVITY,
            max_speed: MAX_SPEED,
            player_radius: PLAYER_RADIUS,

            animation_mode: AnimationMode::Timer,

            demo_ticks: 60 * 60,
            demo_seed: 26,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Reject settings the game cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.total_levels == 0 {
            return Err(SettingsError::Invalid("total_levels must be at least 1".into()));
        }
        if self.start_level == 0 || self.start_level > self.total_levels {
            return Err(SettingsError::Invalid(format!(
                "start_level {} outside 1..={}",
                self.start_level, self.total_levels
            )));
        }
        let physics = [
            ("linear_damping", self.linear_damping),
            ("max_gravity", self.max_gravity),
            ("max_speed", self.max_speed),
            ("player_radius", self.player_radius),
        ];
        for (name, value) in physics {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Invalid(format!("{} must be finite and >= 0", name)));
            }
        }
        if self.player_radius == 0.0 {
            return Err(SettingsError::Invalid("player_radius must be > 0".into()));
        }
        // Substepping only keeps walls solid while one clamped step fits the substep budget
        let reach = MAX_PHYSICS_SUBSTEPS as f32 * self.player_radius * 0.5;
        if self.max_speed * MAX_STEP_DT > reach {
            return Err(SettingsError::Invalid(format!(
                "max_speed {} too high for player_radius {} (at most {})",
                self.max_speed,
                self.player_radius,
                reach / MAX_STEP_DT
            )));
        }
        Ok(())
    }

    /// Level source these settings point at
    pub fn level_source(&self) -> Box<dyn LevelSource> {
        match &self.level_dir {
            Some(dir) => Box::new(DirectoryLevels::new(dir)),
            None => Box::new(BundledLevels),
        }
    }
}
