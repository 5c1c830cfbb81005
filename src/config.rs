use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/placement.toml";

/// Tunable placement parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Fade transition length in milliseconds.
    pub fade_duration_ms: f32,
    /// Fraction of bounding-box overlap above which identical point labels
    /// are merged (0.0 to 1.0).
    pub dedup_overlap_threshold: f32,
    /// Whether duplicate point labels are merged at all.
    pub dedup_enabled: bool,
    /// Reuse the previous frame's candidate order while the camera moves.
    pub defer_while_moving: bool,
    /// Collision grid cell edge in pixels.
    pub collision_cell_size: f32,
    /// Capacity of the bounded text-measurement cache.
    pub measurement_cache_size: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            fade_duration_ms: 800.0,
            dedup_overlap_threshold: 0.5,
            dedup_enabled: true,
            defer_while_moving: true,
            collision_cell_size: 128.0,
            measurement_cache_size: 2048,
        }
    }
}

impl PlacementConfig {
    /// Load placement configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<PlacementConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    PlacementConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                PlacementConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("serializing placement config")?;
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
