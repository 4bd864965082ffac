use crate::playback::InitialConditions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

const APP_DIR: &str = "harmonic-viz";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration directory available")]
    NoConfigDir,
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub show_scene: bool,
    pub show_charts: bool,
    pub show_controls: bool,
    pub show_shortcuts: bool,
    pub initial: InitialConditions,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_scene: true,
            show_charts: true,
            show_controls: true,
            show_shortcuts: false,
            initial: InitialConditions::default(),
        }
    }
}

/// Directory holding settings and the imgui layout
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

impl AppSettings {
    fn config_path() -> Result<PathBuf, SettingsError> {
        config_dir()
            .map(|dir| dir.join("settings.json"))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Load from the user config directory, falling back to defaults
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{e}; using default settings");
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => {
                info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), "failed to load settings: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&contents)?;
        Ok(Self {
            initial: settings.initial.clamped(),
            ..settings
        })
    }

    /// Save to the user config directory, logging any failure
    pub fn save(&self) {
        let result = Self::config_path().and_then(|path| self.save_to(&path));
        if let Err(e) = result {
            error!("failed to save settings: {e}");
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("harmonic-viz-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip/settings.json");
        let settings = AppSettings {
            show_scene: false,
            show_shortcuts: true,
            initial: InitialConditions { position: 15.0, velocity: -2.5 },
            ..AppSettings::default()
        };

        settings.save_to(&path).unwrap();
        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"show_charts": false}"#).unwrap();
        assert!(!settings.show_charts);
        assert!(settings.show_scene);
        assert_eq!(settings.initial, InitialConditions::default());
    }

    #[test]
    fn test_out_of_range_initial_conditions_are_clamped() {
        let path = temp_path("clamp/settings.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"initial": {"position": 90.0, "velocity": -9.0}}"#).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded.initial, InitialConditions { position: 40.0, velocity: -5.0 });

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_is_a_json_error() {
        let path = temp_path("malformed/settings.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(AppSettings::load_from(&path), Err(SettingsError::Json(_))));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let path = temp_path("does-not-exist/settings.json");
        assert!(matches!(AppSettings::load_from(&path), Err(SettingsError::Io(_))));
    }
}
