//! JSON configuration parsing for headless mode
//!
//! Parses JSON run configurations and validates them before the
//! simulation is built.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::world::AreaId;

/// Headless run configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessRunConfig {
    /// Area to run in ("village", "castle", "wilderness", "dungeon")
    #[serde(default = "default_area")]
    pub area: String,
    /// Player level at run start (default: 1)
    #[serde(default = "default_player_level")]
    pub player_level: u32,
    /// Random seed for deterministic run reproduction
    ///
    /// If provided, the run will use a seeded RNG for reproducible results
    #[serde(default)]
    pub seed: Option<u64>,
    /// Maximum run duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Custom output path for the run log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_area() -> String {
    "wilderness".to_string()
}

fn default_player_level() -> u32 {
    1
}

fn default_max_duration() -> f32 {
    300.0
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            area: default_area(),
            player_level: default_player_level(),
            seed: None,
            max_duration_secs: default_max_duration(),
            output_path: None,
        }
    }
}

impl HeadlessRunConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessRunConfig =
            serde_json::from_str(&contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.area_id()?;

        if self.player_level == 0 {
            return Err("player_level must be at least 1".to_string());
        }

        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        Ok(())
    }

    /// Parse the configured area name
    pub fn area_id(&self) -> Result<AreaId, String> {
        AreaId::from_slug(&self.area).ok_or_else(|| {
            format!(
                "Unknown area: '{}'. Valid areas: village, castle, wilderness, dungeon",
                self.area
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HeadlessRunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.area_id().unwrap(), AreaId::Wilderness);
    }

    #[test]
    fn test_unknown_area_is_rejected() {
        let config = HeadlessRunConfig {
            area: "moon_base".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_fills_missing_fields_with_defaults() {
        let config: HeadlessRunConfig = serde_json::from_str(r#"{"seed": 42}"#).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.player_level, 1);
        assert_eq!(config.max_duration_secs, 300.0);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let config = HeadlessRunConfig {
            max_duration_secs: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
