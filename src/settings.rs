//! Scene tunables and viewer preferences
//!
//! Persisted as JSON: LocalStorage on the web, an optional file on native.
//! Missing fields fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Spawn policy for transient objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Per-frame probability of spawning anything
    pub probability: f32,
    /// Kind draw below this yields a shooting star
    pub shooting_star_threshold: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Objects closer than this to the camera are removed
    pub camera_proximity: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            probability: SPAWN_PROBABILITY,
            shooting_star_threshold: SHOOTING_STAR_THRESHOLD,
            min_radius: SPAWN_MIN_RADIUS,
            max_radius: SPAWN_MAX_RADIUS,
            camera_proximity: CAMERA_PROXIMITY,
        }
    }
}

/// Lifetime and motion of one transient kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientConfig {
    /// Seconds before the object is removed
    pub travel_budget: f32,
    /// Distance moved per frame
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub fixed_dt: f32,
    pub max_substeps: u32,
    pub gravity: f32,
    /// Impacts above this speed are reported as [`crate::sim::SceneEvent::PieceImpact`]
    pub impact_sound_threshold: f32,
    pub drop_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: PHYSICS_DT,
            max_substeps: PHYSICS_MAX_SUBSTEPS,
            gravity: GRAVITY,
            impact_sound_threshold: IMPACT_SOUND_THRESHOLD,
            drop_height: PIECE_DROP_HEIGHT,
        }
    }
}

/// Everything the frame driver is tuned by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub spawn: SpawnConfig,
    pub spaceship: TransientConfig,
    pub shooting_star: TransientConfig,
    pub physics: PhysicsConfig,
    pub tile_base_color: u32,
    pub tile_highlight_color: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            spawn: SpawnConfig::default(),
            spaceship: TransientConfig {
                travel_budget: SPACESHIP_TRAVEL_BUDGET,
                speed: SPACESHIP_SPEED,
            },
            shooting_star: TransientConfig {
                travel_budget: SHOOTING_STAR_TRAVEL_BUDGET,
                speed: SHOOTING_STAR_SPEED,
            },
            physics: PhysicsConfig::default(),
            tile_base_color: TILE_BASE_COLOR,
            tile_highlight_color: TILE_HIGHLIGHT_COLOR,
        }
    }
}

/// Viewer preferences plus scene tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scene: SceneConfig,

    // === Debug panel ===
    /// Show the debug control panel
    pub show_debug_panel: bool,
    /// Spawn spaceships and shooting stars
    pub spawning: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    /// RNG seed; `None` picks one from the clock at startup
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            show_debug_panel: true,
            spawning: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            seed: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "yut_scene_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Failed to serialize settings: {}", e),
            }
        }
    }

    /// Load settings from a JSON file (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
