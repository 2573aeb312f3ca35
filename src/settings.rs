//! Game settings
//!
//! Read once at startup from a JSON file; never written back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::LevelLayout;

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "PIKA_RUN_SETTINGS";
/// Settings file used when the variable is unset
pub const DEFAULT_SETTINGS_FILE: &str = "pika_run_settings.json";

/// How the camera follows the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// Exponential approach to the target
    #[default]
    Smooth,
    /// Snap to the target every tick
    Instant,
}

impl CameraMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMode::Smooth => "smooth",
            CameraMode::Instant => "instant",
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub camera: CameraMode,
    /// Lives at the start of each game
    pub start_lives: u8,
    /// Countdown at the start of each game (and after a timeout death)
    pub time_limit: u32,
    /// Grace period after respawning, in ticks
    pub respawn_invincibility_ticks: u32,
    /// Optional JSON level layout; the built-in level is used when unset
    pub level_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera: CameraMode::Smooth,
            start_lives: START_LIVES,
            time_limit: START_TIME,
            respawn_invincibility_ticks: RESPAWN_INVINCIBILITY_TICKS,
            level_path: None,
        }
    }
}

impl Settings {
    /// Path from `PIKA_RUN_SETTINGS`, or the default file name
    pub fn path() -> PathBuf {
        std::env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Parse settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load() -> Self {
        let path = Self::path();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(settings) => {
                log::info!(
                    "Loaded settings from {} (camera: {})",
                    path.display(),
                    settings.camera.as_str()
                );
                settings
            }
            Err(err) => {
                log::warn!("Ignoring settings: {err:#}");
                Self::default()
            }
        }
    }

    /// Level layout to play: the configured file, or the built-in level
    pub fn level_layout(&self) -> Result<LevelLayout> {
        match &self.level_path {
            None => Ok(LevelLayout::world_1_1()),
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading level from {}", path.display()))?;
                let layout = serde_json::from_str(&json)
                    .with_context(|| format!("parsing level in {}", path.display()))?;
                log::info!("Loaded level layout from {}", path.display());
                Ok(layout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"camera": "instant"}"#).unwrap();
        assert_eq!(settings.camera, CameraMode::Instant);
        assert_eq!(settings.start_lives, START_LIVES);
        assert_eq!(settings.time_limit, START_TIME);
        assert!(settings.level_path.is_none());
    }

    #[test]
    fn test_unknown_camera_mode_is_an_error() {
        assert!(serde_json::from_str::<Settings>(r#"{"camera": "cinematic"}"#).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Settings::from_file(Path::new("/nonexistent/pika.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/pika.json"));
    }

    #[test]
    fn test_builtin_level_when_no_path() {
        let layout = Settings::default().level_layout().unwrap();
        assert_eq!(layout.width, 6400.0);
        assert!(layout.goal.is_some());
    }

    #[test]
    fn test_level_file_round_trip() {
        let path = std::env::temp_dir().join(format!("pika_run_level_{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string(&LevelLayout::world_1_1()).unwrap()).unwrap();

        let settings = Settings {
            level_path: Some(path.clone()),
            ..Settings::default()
        };
        let layout = settings.level_layout().unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(layout.platforms.len(), LevelLayout::world_1_1().platforms.len());
    }
}
