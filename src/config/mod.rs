//! Configuration types for the accident analysis pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for hotspot clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotConfig {
    /// Number of clusters (hotspots) to find
    #[serde(default = "default_k")]
    pub k: usize,

    /// Seed for the pseudo-random centroid initialization
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of independent restarts; the run with the lowest inertia wins
    #[serde(default = "default_restarts")]
    pub restarts: usize,

    /// Iteration cap per run of Lloyd's algorithm
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_k() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_restarts() -> usize {
    10
}

fn default_max_iterations() -> usize {
    300
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            seed: default_seed(),
            restarts: default_restarts(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Configuration for PNG rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Plot width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Plot height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Maximum points to plot (subsamples if exceeded)
    #[serde(default = "default_max_plot_points")]
    pub max_points: usize,

    /// Alpha/transparency for scatter points (0.0 to 1.0)
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

fn default_max_plot_points() -> usize {
    1_000_000
}

fn default_alpha() -> f64 {
    0.6
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            max_points: default_max_plot_points(),
            alpha: default_alpha(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub clustering: HotspotConfig,

    #[serde(default)]
    pub rendering: RenderConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hotspot_config() {
        let config = HotspotConfig::default();
        assert_eq!(config.k, 5);
        assert_eq!(config.seed, 42);
        assert_eq!(config.restarts, 10);
        assert_eq!(config.max_iterations, 300);
    }

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.clustering.k, 5);
        assert_eq!(config.rendering.width, 1920);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: PipelineConfig = serde_yaml::from_str("clustering:\n  k: 8\n").unwrap();
        assert_eq!(config.clustering.k, 8);
        assert_eq!(config.clustering.restarts, 10);
        assert_eq!(config.rendering.max_points, 1_000_000);
    }
}
