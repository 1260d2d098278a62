// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration, stored as RON.

use crate::interaction::ModifierKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor-wide tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smallest allowed zoom (pixels per world unit)
    pub zoom_min: f32,
    /// Largest allowed zoom
    pub zoom_max: f32,
    /// Zoom at startup
    pub default_zoom: f32,
    /// Wheel delta is multiplied by the zoom and divided by this
    pub wheel_divisor: f32,
    /// Grid quantum nodes snap to when a drag ends
    pub grid_quantum: f32,
    /// Spacing between drawn grid lines, world units
    pub grid_spacing: f32,
    /// Draw the background grid
    pub show_grid: bool,
    /// Let a node output to itself
    pub allow_self_connection: bool,
    /// Held while dragging to pan instead of moving the node
    pub pan_modifier: ModifierKey,
    /// Held on secondary click to add a node's panel instead of replacing
    pub add_select_modifier: ModifierKey,
    /// Node label font size, world units
    pub label_font_size: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_min: 8.0,
            zoom_max: 400.0,
            default_zoom: 100.0,
            wheel_divisor: 50.0,
            grid_quantum: 0.25,
            grid_spacing: 1.0,
            show_grid: true,
            allow_self_connection: false,
            pan_modifier: ModifierKey::Alt,
            add_select_modifier: ModifierKey::Alt,
            label_font_size: crate::node::DEFAULT_FONT_SIZE,
        }
    }
}

impl EditorConfig {
    /// Parse from a RON string
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(content)?;
        Ok(config.normalized())
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default editor config ({:?}): {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Repair values that would break the camera or grid
    fn normalized(mut self) -> Self {
        if !self.zoom_max.is_finite() {
            tracing::warn!("zoom_max {} in config is not finite, using default", self.zoom_max);
            self.zoom_max = Self::default().zoom_max;
        }
        if self.zoom_min > self.zoom_max {
            tracing::warn!("zoom_min > zoom_max in config, swapping");
            std::mem::swap(&mut self.zoom_min, &mut self.zoom_max);
        }
        if self.zoom_min.is_nan() || self.zoom_min <= 0.0 {
            self.zoom_min = Self::default().zoom_min.min(self.zoom_max);
        }
        self.default_zoom = crate::geometry::clamp(self.default_zoom, self.zoom_min, self.zoom_max);
        if self.wheel_divisor.is_nan() || self.wheel_divisor <= 0.0 {
            self.wheel_divisor = Self::default().wheel_divisor;
        }
        self
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for this config
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing failed
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.zoom_min, 8.0);
        assert_eq!(config.zoom_max, 400.0);
        assert_eq!(config.grid_quantum, 0.25);
        assert!(!config.allow_self_connection);
    }

    #[test]
    fn test_serialization() {
        let mut config = EditorConfig::default();
        config.allow_self_connection = true;
        config.pan_modifier = ModifierKey::Shift;
        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = EditorConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let loaded = EditorConfig::from_ron("(grid_quantum: 0.5)").unwrap();
        assert_eq!(loaded.grid_quantum, 0.5);
        assert_eq!(loaded.zoom_max, 400.0);
    }

    #[test]
    fn test_inverted_zoom_range_is_swapped() {
        let loaded = EditorConfig::from_ron("(zoom_min: 500.0, zoom_max: 10.0)").unwrap();
        assert_eq!(loaded.zoom_min, 10.0);
        assert_eq!(loaded.zoom_max, 500.0);
        assert_eq!(loaded.default_zoom, 100.0);
    }

    #[test]
    fn test_infinite_zoom_max_falls_back() {
        let loaded = EditorConfig::from_ron("(zoom_max: inf)").unwrap();
        assert_eq!(loaded.zoom_max, 400.0);

        let mut camera = Camera::new(&loaded);
        camera.set_zoom(1.0e9);
        assert_eq!(camera.zoom(), 400.0);
    }

    #[test]
    fn test_invalid_ron() {
        assert!(matches!(
            EditorConfig::from_ron("(grid_quantum: \"big\")"),
            Err(ConfigError::Parse(_))
        ));
    }
}
