//! Yut Scene - an interactive 3D Yut board floating in space
//!
//! Core modules:
//! - `sim`: Per-frame scene logic (transient objects, piece sync, picking, frame driver)
//! - `physics`: Rigid-body world driving the four yut pieces
//! - `scene`: Render graph, camera and orbit controls
//! - `renderer`: WebGPU rendering of the projected scene
//! - `settings`: Tunables and preferences (JSON)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod physics;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use settings::{SceneConfig, Settings, SettingsError};

use glam::Vec3;

/// Scene configuration constants
pub mod consts {
    /// Fixed physics timestep (60 Hz)
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;
    /// Maximum physics substeps per frame
    pub const PHYSICS_MAX_SUBSTEPS: u32 = 3;
    /// Gravity along Y (units/s²)
    pub const GRAVITY: f32 = -9.82;
    /// Impacts faster than this play a sound (units/s)
    pub const IMPACT_SOUND_THRESHOLD: f32 = 3.0;

    /// Per-frame probability of spawning a transient object
    pub const SPAWN_PROBABILITY: f32 = 0.015;
    /// Second draw below this yields a shooting star, otherwise a spaceship
    pub const SHOOTING_STAR_THRESHOLD: f32 = 0.2;
    /// Transient objects spawn at least this far from the origin
    pub const SPAWN_MIN_RADIUS: f32 = 30.0;
    /// ...and at most this far
    pub const SPAWN_MAX_RADIUS: f32 = 100.0;
    /// Transient objects closer than this to the camera are removed
    pub const CAMERA_PROXIMITY: f32 = 10.0;

    pub const SPACESHIP_TRAVEL_BUDGET: f32 = 10.0;
    pub const SPACESHIP_SPEED: f32 = 0.4;
    pub const SHOOTING_STAR_TRAVEL_BUDGET: f32 = 3.0;
    pub const SHOOTING_STAR_SPEED: f32 = 1.0;

    /// Board ring radius (outer stations)
    pub const BOARD_RADIUS: f32 = 20.0;
    /// Stations on the outer ring
    pub const OUTER_STATIONS: usize = 20;
    /// Stations on each half-diagonal between a corner and the centre
    pub const DIAGONAL_STATIONS: usize = 2;

    /// Tile colour restored every frame before highlighting
    pub const TILE_BASE_COLOR: u32 = 0xff0000;
    /// Colour of the tile under the pointer
    pub const TILE_HIGHLIGHT_COLOR: u32 = 0x0000ff;

    /// Number of yut pieces
    pub const PIECE_COUNT: usize = 4;
    /// Height pieces are dropped from
    pub const PIECE_DROP_HEIGHT: f32 = 12.0;
}

/// Point on the board plane (y = 0) at polar (r, theta)
#[inline]
pub fn board_point(r: f32, theta: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
}

/// Spherical (yaw, pitch, radius) to cartesian, Y up
#[inline]
pub fn spherical_to_cartesian(yaw: f32, pitch: f32, radius: f32) -> Vec3 {
    Vec3::new(
        radius * pitch.cos() * yaw.sin(),
        radius * pitch.sin(),
        radius * pitch.cos() * yaw.cos(),
    )
}

/// Cartesian to spherical (yaw, pitch, radius), inverse of [`spherical_to_cartesian`]
#[inline]
pub fn cartesian_to_spherical(v: Vec3) -> (f32, f32, f32) {
    let radius = v.length();
    if radius == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let pitch = (v.y / radius).clamp(-1.0, 1.0).asin();
    let yaw = v.x.atan2(v.z);
    (yaw, pitch, radius)
}
