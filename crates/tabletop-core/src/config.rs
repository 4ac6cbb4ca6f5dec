//! Engine configuration.

use crate::camera::{MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_FACTOR};
use crate::tools::FreehandLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How reloads that race each other are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Every reload for the active scene replaces the model, in arrival order.
    #[default]
    AlwaysAccept,
    /// Drop a reload issued before the last one applied.
    LatestRequestWins,
}

/// Tunables for the canvas engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub wheel_zoom_factor: f64,
    /// Zoom change per zoom button press.
    pub zoom_step: f64,
    /// Erase hit radius in cell units.
    pub erase_radius: f64,
    pub max_freehand_points: Option<usize>,
    pub freehand_simplify_tolerance: Option<f64>,
    pub reload_policy: ReloadPolicy,
    pub notice_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            wheel_zoom_factor: WHEEL_ZOOM_FACTOR,
            zoom_step: 0.1,
            erase_radius: 3.0,
            max_freehand_points: None,
            freehand_simplify_tolerance: None,
            reload_policy: ReloadPolicy::AlwaysAccept,
            notice_ttl_secs: 4,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// `<config_dir>/tabletop/engine.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tabletop").join("engine.json"))
    }

    /// Load from the default path, falling back to defaults when the file is
    /// absent or invalid.
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded engine config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring engine config: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty or non-positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.erase_radius < 0.0 {
            return Err(ConfigError::Invalid("erase_radius must not be negative".to_string()));
        }
        if self.max_freehand_points.is_some_and(|n| n < 2) {
            return Err(ConfigError::Invalid("max_freehand_points must be at least 2".to_string()));
        }
        Ok(())
    }

    pub fn freehand_limits(&self) -> FreehandLimits {
        FreehandLimits {
            max_points: self.max_freehand_points,
            tolerance: self.freehand_simplify_tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.min_zoom, 0.25);
        assert_eq!(config.max_zoom, 3.0);
        assert_eq!(config.erase_radius, 3.0);
        assert_eq!(config.reload_policy, ReloadPolicy::AlwaysAccept);
        assert!(config.max_freehand_points.is_none());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"reload_policy":"latest_request_wins","max_freehand_points":500}"#)
            .unwrap();
        assert_eq!(config.reload_policy, ReloadPolicy::LatestRequestWins);
        assert_eq!(config.max_freehand_points, Some(500));
        assert_eq!(config.zoom_step, 0.1);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let result = EngineConfig::from_json(r#"{"min_zoom":2.0,"max_zoom":1.0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert!(matches!(EngineConfig::from_json("[1,2]"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load(&dir.path().join("engine.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
