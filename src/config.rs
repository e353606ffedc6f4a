use anyhow::{Context, Result};
use bevy::prelude::*;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Controls how the [`TerrainFillPlugin`](crate::plugin::TerrainFillPlugin) maintains the
/// fill meshes.
///
/// Usually stored next to the terrain as a `fill.ron` file.
#[derive(Serialize, Deserialize, Resource, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FillConfig {
    /// Whether fill meshes are updated at all.
    pub enabled: bool,
    /// Whether rendered tiles, that are not connected to any loaded tile, receive a flat
    /// fill mesh.
    pub fill_orphans: bool,
    /// Whether the changes of every frame are logged.
    pub log_statistics: bool,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fill_orphans: true,
            log_statistics: false,
        }
    }
}

impl FillConfig {
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).context("Failed to parse the fill config.")
    }

    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, PrettyConfig::default())
            .context("Failed to serialize the fill config.")
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read the fill config {}.", path.display()))?;
        Self::from_ron(&source)
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_ron()?)
            .with_context(|| format!("Failed to write the fill config {}.", path.display()))?;
        Ok(())
    }
}
