//! Viewer configuration
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```json
//! { "fade_duration": 1.2, "textures": [{ "id": "oak", "name": "Oak", "url": "assets/oak.jpg" }] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;

/// Window configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Facet".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// A built-in asset listed in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl CatalogEntry {
    pub fn new(id: &str, name: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}

/// Tunables for the material pipeline and the built-in catalogs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    /// Cross-fade duration in seconds
    pub fade_duration: f32,
    /// Largest extent of a model after auto-framing, in world units
    pub normalize_size: f32,
    /// Idle rotation about +Y in radians per second
    pub idle_spin: f32,
    /// Resolution of the square dissolve noise image
    pub noise_size: u32,
    pub noise_seed: u32,
    /// Linear RGB clear colour
    pub background: [f32; 3],
    pub models: Vec<CatalogEntry>,
    pub textures: Vec<CatalogEntry>,
    /// Stickers offered by the sticker toggle binding
    pub stickers: Vec<CatalogEntry>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            fade_duration: 0.8,
            normalize_size: 2.4,
            idle_spin: 0.15,
            noise_size: 64,
            noise_seed: 7,
            background: [0.06, 0.07, 0.09],
            models: vec![
                CatalogEntry::new("cube", "Cube", "builtin:cube"),
                CatalogEntry::new("sphere", "Sphere", "builtin:sphere"),
            ],
            textures: vec![
                CatalogEntry::new("uv-grid", "UV Grid", "builtin:uv-grid"),
                CatalogEntry::new("brushed-metal", "Brushed Metal", "builtin:brushed-metal"),
                CatalogEntry::new("checker", "Checker", "builtin:checker"),
            ],
            stickers: vec![
                CatalogEntry::new("star", "Star", "builtin:sticker-star"),
            ],
        }
    }
}

impl ViewerConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&json)?;
        Ok(config.sanitized())
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.fade_duration.is_finite() && self.fade_duration >= 0.0) {
            log::warn!("fade_duration {} is invalid, using {}", self.fade_duration, defaults.fade_duration);
            self.fade_duration = defaults.fade_duration;
        }
        if !(self.normalize_size.is_finite() && self.normalize_size > 0.0) {
            log::warn!("normalize_size {} is invalid, using {}", self.normalize_size, defaults.normalize_size);
            self.normalize_size = defaults.normalize_size;
        }
        if !self.idle_spin.is_finite() {
            self.idle_spin = defaults.idle_spin;
        }
        if self.noise_size == 0 {
            self.noise_size = defaults.noise_size;
        }
        if self.models.is_empty() {
            log::warn!("Config lists no models, keeping the built-in set");
            self.models = defaults.models;
        }
        self
    }
}
