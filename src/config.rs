//! Viewer configuration file
//!
//! Everything the viewer can be told at startup lives in one JSON document.
//! Missing fields fall back to the demo defaults, so `{}` is a valid file.

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraView, ControllerChain, ControllerKind};
use crate::layers::LayerSettings;
use crate::rings::{RingConfig, RingRng};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "GLOBE_RINGS_CONFIG";
const CONFIG_FILE: &str = "viewer.json";

/// Globe-wide presentation switches
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Drive the sun from the simulation clock instead of a fixed direction.
    pub clock: bool,
    /// Simulated seconds per real second.
    pub clock_speed: f64,
    pub shadows: bool,
    /// Axes gizmos on the globe and layer anchors.
    pub debug: bool,
    pub sun: bool,
    /// Black space background instead of the default clear colour.
    pub space: bool,
    /// Globe tessellation relative to the default (1.0).
    pub detail_multiplier: f32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            clock: true,
            clock_speed: 1.0,
            shadows: false,
            debug: false,
            sun: true,
            space: true,
            detail_multiplier: 1.0,
        }
    }
}

impl MapOptions {
    /// Icosphere subdivision level: 5 at the default detail, one level per doubling.
    pub fn globe_subdivisions(&self) -> u32 {
        let detail = if self.detail_multiplier > 0.0 && self.detail_multiplier.is_finite() {
            self.detail_multiplier
        } else {
            1.0
        };
        (5.0 + detail.log2()).round().clamp(1.0, 7.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub map: MapOptions,
    pub view: CameraView,
    pub controllers: Vec<ControllerKind>,
    pub rings: RingConfig,
    pub layers: LayerSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            map: MapOptions::default(),
            view: CameraView::default(),
            controllers: ControllerChain::default().kinds().to_vec(),
            rings: RingConfig::default(),
            layers: LayerSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Resolve the config path: `GLOBE_RINGS_CONFIG`, else the platform config dir
    /// (`~/.config/globe-rings/viewer.json` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "globe-rings").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load from the default path; any problem leaves the defaults in place.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Ok(None) => {
                debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Returns Ok(None) when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, anyhow::Error> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&contents)?;
        Ok(Some(config))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), anyhow::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Hand every section to the app as its own resource.
    pub fn insert_into(self, app: &mut App) {
        let rng = RingRng::new(self.rings.seed);
        app.insert_resource(self.map)
            .insert_resource(self.view)
            .insert_resource(ControllerChain::from_kinds(&self.controllers))
            .insert_resource(self.rings)
            .insert_resource(rng)
            .insert_resource(self.layers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rings::SeamPolicy;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path(test_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir()
            .join(format!(
                "globe-rings-config-{}-{}-{}",
                test_name,
                std::process::id(),
                nanos
            ))
            .join(CONFIG_FILE)
    }

    #[test]
    fn test_missing_file_is_none() {
        let path = unique_temp_path("missing");
        assert!(ViewerConfig::load_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let path = unique_temp_path("save_and_load");
        let mut config = ViewerConfig::default();
        config.rings.instance_count = 12;
        config.rings.seam = SeamPolicy::Resample;
        config.map.debug = true;
        config.controllers = vec![ControllerKind::Zoom];

        config.save_to(&path).expect("save");
        let loaded = ViewerConfig::load_from(&path)
            .expect("load")
            .expect("file exists");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_empty_object_is_defaults() {
        let config: ViewerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config: ViewerConfig = serde_json::from_str(
            r#"{ "map": { "shadows": true }, "rings": { "latitude_deg": 45.0 } }"#,
        )
        .unwrap();
        assert!(config.map.shadows);
        assert!(config.map.sun);
        assert_eq!(config.map.clock_speed, 1.0);
        assert_eq!(config.rings.latitude_deg, 45.0);
        assert_eq!(config.rings.sample_count, 201);
        assert_eq!(config.layers.layers.len(), 4);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let path = unique_temp_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(ViewerConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_globe_subdivisions() {
        let mut options = MapOptions::default();
        assert_eq!(options.globe_subdivisions(), 5);
        options.detail_multiplier = 2.0;
        assert_eq!(options.globe_subdivisions(), 6);
        options.detail_multiplier = 0.5;
        assert_eq!(options.globe_subdivisions(), 4);
        options.detail_multiplier = 1000.0;
        assert_eq!(options.globe_subdivisions(), 7);
        options.detail_multiplier = 0.0;
        assert_eq!(options.globe_subdivisions(), 5);
        options.detail_multiplier = 1e-6;
        assert_eq!(options.globe_subdivisions(), 1);
    }
}
