//! Pipeline configuration.

use glam::Vec3;
use parallax_data::DepthGradient;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable pipeline parameters, loadable from a JSON file.
///
/// Missing fields fall back to the defaults, so a config file only needs
/// to name what it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model input/output grid width.
    pub model_width: u32,
    /// Model input/output grid height.
    pub model_height: u32,
    /// Gradient color for the nearest points (linear RGB).
    pub near_color: [f32; 3],
    /// Gradient color at the middle of the range.
    pub mid_color: [f32; 3],
    /// Gradient color for the farthest points.
    pub far_color: [f32; 3],
    /// Render size of the nearest points, world units.
    pub max_point_size: f32,
    /// Render size of the farthest points, world units.
    pub min_point_size: f32,
    /// Depth ranges below this are treated as constant frames.
    pub range_epsilon: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_width: 224,
            model_height: 224,
            near_color: [1.0, 0.0, 0.0],
            mid_color: [1.0, 1.0, 0.0],
            far_color: [0.0, 0.0, 1.0],
            max_point_size: 0.04,
            min_point_size: 0.005,
            range_epsilon: 1e-6,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Build the depth gradient described by this config.
    pub fn gradient(&self) -> DepthGradient {
        DepthGradient::new(
            Vec3::from_array(self.near_color),
            Vec3::from_array(self.mid_color),
            Vec3::from_array(self.far_color),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.model_width, 224);
        assert_eq!(config.model_height, 224);
        assert!(config.max_point_size > config.min_point_size);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"model_width": 256, "model_height": 192}"#).unwrap();
        assert_eq!(config.model_width, 256);
        assert_eq!(config.model_height, 192);
        assert_eq!(config.near_color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_roundtrip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.model_width, config.model_width);
        assert_eq!(back.far_color, config.far_color);
    }

    #[test]
    fn test_gradient_from_config() {
        let config = PipelineConfig::default();
        let gradient = config.gradient();
        assert_eq!(gradient.near, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(gradient.far, Vec3::new(0.0, 0.0, 1.0));
    }
}
