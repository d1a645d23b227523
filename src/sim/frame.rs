//! Per-frame driver
//!
//! One call per display refresh. The steps run in a fixed order:
//! tile rotation, spawn, spaceship sweep, shooting-star sweep, picking,
//! physics, piece sync, camera controls, render.

use glam::Vec2;

use super::picking::pick_and_highlight;
use super::pieces::PieceId;
use super::state::SceneState;
use super::transient::{ExpiryReason, TransientKind, roll_spawn, sweep};
use crate::physics::RigidBodySim;
use crate::renderer::RenderTarget;
use crate::scene::Color;

/// Clock readings for one frame (seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Monotonic time since the scene started
    pub elapsed: f32,
    /// Time since the previous frame
    pub delta: f32,
}

/// Actions from the debug control panel, applied at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugAction {
    /// Remove one piece from physics and the scene together
    DetachPiece(PieceId),
    /// Lift and drop every remaining piece
    ThrowPieces,
    SetSpawning(bool),
    ResetCamera,
}

/// Input gathered since the previous frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Pointer in normalized device coordinates, [-1, 1]²
    pub pointer_ndc: Vec2,
    /// Orbit drag accumulated since the last frame (NDC units)
    pub orbit_drag: Vec2,
    /// Zoom steps accumulated since the last frame
    pub zoom: f32,
    pub actions: Vec<DebugAction>,
}

impl FrameInput {
    /// Clear per-frame accumulators, keep the pointer position
    pub fn consume(&mut self) {
        self.orbit_drag = Vec2::ZERO;
        self.zoom = 0.0;
        self.actions.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    Spawned(TransientKind),
    Expired { kind: TransientKind, reason: ExpiryReason },
    /// A piece hit the floor, or another piece when `other` is set, faster
    /// than the impact threshold
    PieceImpact {
        piece: PieceId,
        other: Option<PieceId>,
        speed: f32,
    },
    PieceDetached(PieceId),
    PiecesThrown,
}

/// What happened during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub events: Vec<SceneEvent>,
    /// Tile highlighted by this frame's picking pass
    pub highlighted: Option<usize>,
}

impl FrameReport {
    pub fn impacts(&self) -> impl Iterator<Item = (PieceId, f32)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            SceneEvent::PieceImpact { piece, speed, .. } => Some((piece, speed)),
            _ => None,
        })
    }
}

/// Advance the scene by one frame
pub fn frame<P, T>(
    state: &mut SceneState,
    physics: &mut P,
    input: &FrameInput,
    time: FrameTime,
    renderer: &mut T,
) -> FrameReport
where
    P: RigidBodySim + ?Sized,
    T: RenderTarget + ?Sized,
{
    let mut report = FrameReport::default();
    state.elapsed = time.elapsed;
    state.frame_count += 1;

    apply_actions(state, physics, &input.actions, &mut report);

    // 1. Tile rotation
    state.tiles.rotate(&mut state.graph, time.delta);

    // 2. Spawn decision
    if state.spawning {
        if let Some(object) = roll_spawn(&mut state.rng, &state.config.spawn, time.elapsed) {
            log::debug!("Spawned {:?} at {:?}", object.kind, object.position);
            report.events.push(SceneEvent::Spawned(object.kind));
            state.collection_mut(object.kind).push(object);
        }
    }

    // 3-4. Expiry sweeps
    let camera_position = state.camera.position;
    let proximity = state.config.spawn.camera_proximity;
    let sweeps = [
        (&mut state.spaceships, &state.config.spaceship),
        (&mut state.shooting_stars, &state.config.shooting_star),
    ];
    for (collection, params) in sweeps {
        for (object, reason) in sweep(collection, params, time.elapsed, camera_position, proximity) {
            report.events.push(SceneEvent::Expired {
                kind: object.kind,
                reason,
            });
        }
    }

    // 5. Picking
    report.highlighted = pick_and_highlight(
        &state.tiles,
        &mut state.graph,
        &state.camera,
        input.pointer_ndc,
        Color(state.config.tile_highlight_color),
    );
    state.highlighted = report.highlighted;

    // 6. Physics
    let physics_config = &state.config.physics;
    let collisions = physics.step(physics_config.fixed_dt, time.delta, physics_config.max_substeps);
    for collision in collisions {
        if collision.impact_speed <= physics_config.impact_sound_threshold {
            continue;
        }
        if let Some(piece) = state.pieces.id_at(collision.body) {
            report.events.push(SceneEvent::PieceImpact {
                piece,
                other: collision.other.and_then(|i| state.pieces.id_at(i)),
                speed: collision.impact_speed,
            });
        }
    }

    // 7. Sync
    state.pieces.sync(&mut state.graph, physics.bodies());

    // 8. Camera controls
    state.controls.rotate(input.orbit_drag);
    state.controls.zoom(input.zoom);
    state.controls.update(&mut state.camera);

    // 9. Render
    renderer.render(state);

    report
}

fn apply_actions<P: RigidBodySim + ?Sized>(
    state: &mut SceneState,
    physics: &mut P,
    actions: &[DebugAction],
    report: &mut FrameReport,
) {
    for &action in actions {
        match action {
            DebugAction::DetachPiece(id) => {
                if state.pieces.detach(id, &mut state.graph, &mut *physics) {
                    report.events.push(SceneEvent::PieceDetached(id));
                } else {
                    log::warn!("Detach requested for unknown piece {:?}", id);
                }
            }
            DebugAction::ThrowPieces => {
                let drop_height = state.config.physics.drop_height;
                state.pieces.throw(&mut *physics, &mut state.rng, drop_height);
                report.events.push(SceneEvent::PiecesThrown);
            }
            DebugAction::SetSpawning(enabled) => {
                log::info!("Spawning {}", if enabled { "enabled" } else { "disabled" });
                state.spawning = enabled;
            }
            DebugAction::ResetCamera => state.controls.reset(),
        }
    }
}
