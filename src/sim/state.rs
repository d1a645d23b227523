//! Scene state and board construction
//!
//! Everything the frame driver mutates lives in [`SceneState`]; the physics
//! world is owned separately and passed alongside it.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::pieces::PieceSet;
use super::tiles::{Tile, TileSet, TileShape, TileStyle};
use super::transient::{TransientKind, TransientObject};
use crate::board_point;
use crate::consts::*;
use crate::physics::{RigidBody, RigidBodySim};
use crate::scene::{Camera, Color, Node, OrbitControls, SceneGraph, Shape};
use crate::settings::SceneConfig;

/// Half extents of a yut stick
pub const PIECE_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.15, 2.0);
const PIECE_COLOR: Color = Color(0xd8b27a);
const FLOOR_COLOR: Color = Color(0x1a1a33);
/// Height of the tiles above the floor
const TILE_HEIGHT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct SceneState {
    pub config: SceneConfig,
    pub graph: SceneGraph,
    pub tiles: TileSet,
    pub pieces: PieceSet,
    pub spaceships: Vec<TransientObject>,
    pub shooting_stars: Vec<TransientObject>,
    pub camera: Camera,
    pub controls: OrbitControls,
    /// Whether the spawn decision runs
    pub spawning: bool,
    /// Tile under the pointer after the last picking pass
    pub highlighted: Option<usize>,
    /// Scene time at the last frame (seconds)
    pub elapsed: f32,
    pub frame_count: u64,
    pub seed: u64,
    pub(crate) rng: Pcg32,
}

impl SceneState {
    /// Empty scene: camera only, no board, no pieces
    pub fn new(config: SceneConfig, seed: u64) -> Self {
        let camera = Camera::default();
        let controls = OrbitControls::from_camera(&camera);
        Self {
            config,
            graph: SceneGraph::new(),
            tiles: TileSet::new(),
            pieces: PieceSet::new(),
            spaceships: Vec::new(),
            shooting_stars: Vec::new(),
            camera,
            controls,
            spawning: true,
            highlighted: None,
            elapsed: 0.0,
            frame_count: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Full scene: floor, board tiles and the four pieces ready to drop
    pub fn build<P: RigidBodySim + ?Sized>(config: SceneConfig, seed: u64, physics: &mut P) -> Self {
        let mut state = Self::new(config, seed);
        state.build_board();
        state.add_pieces(physics, PIECE_COUNT);
        let drop_height = state.config.physics.drop_height;
        state.pieces.throw(physics, &mut state.rng, drop_height);
        log::info!(
            "Scene built: {} tiles, {} pieces, seed {}",
            state.tiles.len(),
            state.pieces.len(),
            seed
        );
        state
    }

    pub fn collection(&self, kind: TransientKind) -> &[TransientObject] {
        match kind {
            TransientKind::Spaceship => &self.spaceships,
            TransientKind::ShootingStar => &self.shooting_stars,
        }
    }

    pub fn collection_mut(&mut self, kind: TransientKind) -> &mut Vec<TransientObject> {
        match kind {
            TransientKind::Spaceship => &mut self.spaceships,
            TransientKind::ShootingStar => &mut self.shooting_stars,
        }
    }

    pub fn transient_count(&self) -> usize {
        self.spaceships.len() + self.shooting_stars.len()
    }

    fn add_pieces<P: RigidBodySim + ?Sized>(&mut self, physics: &mut P, count: usize) {
        for i in 0..count {
            let body = RigidBody::new_box(PIECE_HALF_EXTENTS, 1.0)
                .at(Vec3::new(i as f32 * 2.0, self.config.physics.drop_height, 0.0));
            let node = Node::new(format!("yut-{i}"), Shape::Box(PIECE_HALF_EXTENTS)).colored(PIECE_COLOR);
            self.pieces.spawn(&mut self.graph, physics, body, node);
        }
    }

    /// Floor plus the 29 stations of the Yut board
    fn build_board(&mut self) {
        self.graph.add(
            Node::new("floor", Shape::Floor)
                .scaled(BOARD_RADIUS * 1.5)
                .colored(FLOOR_COLOR),
        );

        let base = Color(self.config.tile_base_color);
        let step = TAU / OUTER_STATIONS as f32;
        let corner_every = OUTER_STATIONS / 4;

        for i in 0..OUTER_STATIONS {
            let theta = i as f32 * step;
            let position = board_point(BOARD_RADIUS, theta) + Vec3::Y * TILE_HEIGHT;
            let style = if i % corner_every == 0 {
                match i / corner_every {
                    0 => TileStyle::Earth,
                    1 => TileStyle::Mars,
                    2 => TileStyle::Neptune,
                    _ => TileStyle::Saturn,
                }
            } else {
                TileStyle::Star
            };
            self.add_tile(style, position, base);
        }

        // Diagonals from each corner toward the centre
        for corner in 0..4 {
            let theta = (corner * corner_every) as f32 * step;
            for k in (1..=DIAGONAL_STATIONS).rev() {
                let r = BOARD_RADIUS * k as f32 / (DIAGONAL_STATIONS + 1) as f32;
                let position = board_point(r, theta) + Vec3::Y * TILE_HEIGHT;
                self.add_tile(TileStyle::Star, position, base);
            }
        }

        self.add_tile(TileStyle::Polaris, Vec3::Y * TILE_HEIGHT, base);
    }

    fn add_tile(&mut self, style: TileStyle, position: Vec3, base_color: Color) -> usize {
        let name = style.as_str();
        let (shape, spin) = match style {
            TileStyle::Earth | TileStyle::Mars => {
                let root = self.graph.add(Node::new(name, Shape::Group).at(position).pickable(2.5));
                let ring = self.graph.add(
                    Node::new(format!("{name}-ring"), Shape::Ring)
                        .scaled(2.2)
                        .colored(base_color)
                        .child_of(root),
                );
                let planet = self.graph.add(
                    Node::new(format!("{name}-planet"), Shape::Disc)
                        .scaled(1.5)
                        .colored(base_color)
                        .child_of(root),
                );
                (TileShape::Grouped { root, parts: vec![ring, planet] }, 0.5)
            }
            TileStyle::Neptune | TileStyle::Saturn => {
                let node = self.graph.add(
                    Node::new(name, Shape::Disc)
                        .at(position)
                        .scaled(1.5)
                        .colored(base_color)
                        .pickable(1.1),
                );
                (TileShape::Simple(node), 0.5)
            }
            TileStyle::Polaris => {
                let node = self.graph.add(
                    Node::new(name, Shape::Disc)
                        .at(position)
                        .scaled(1.2)
                        .colored(base_color)
                        .pickable(1.1),
                );
                (TileShape::Simple(node), 0.2)
            }
            TileStyle::Star => {
                let node = self.graph.add(
                    Node::new(name, Shape::Disc)
                        .at(position)
                        .scaled(0.6)
                        .colored(base_color)
                        .pickable(1.3),
                );
                (TileShape::Simple(node), 0.0)
            }
        };
        self.tiles.push(Tile {
            style,
            shape,
            base_color,
            spin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BoxWorld;

    #[test]
    fn test_board_has_yut_layout() {
        let mut physics = BoxWorld::default();
        let state = SceneState::build(SceneConfig::default(), 1, &mut physics);

        // 20 outer + 4 diagonals of 2 + centre
        assert_eq!(state.tiles.len(), 29);
        let count = |style| state.tiles.tiles.iter().filter(|t| t.style == style).count();
        assert_eq!(count(TileStyle::Earth), 1);
        assert_eq!(count(TileStyle::Mars), 1);
        assert_eq!(count(TileStyle::Neptune), 1);
        assert_eq!(count(TileStyle::Saturn), 1);
        assert_eq!(count(TileStyle::Polaris), 1);
        assert_eq!(count(TileStyle::Star), 24);

        // Earth and mars are ring + planet groups
        for style in [TileStyle::Earth, TileStyle::Mars] {
            let tile = &state.tiles.tiles[state.tiles.find(style).unwrap()];
            assert!(matches!(&tile.shape, TileShape::Grouped { parts, .. } if parts.len() == 2));
        }
    }

    #[test]
    fn test_pieces_match_physics_bodies() {
        let mut physics = BoxWorld::default();
        let state = SceneState::build(SceneConfig::default(), 1, &mut physics);

        assert_eq!(state.pieces.len(), PIECE_COUNT);
        assert_eq!(physics.bodies().len(), PIECE_COUNT);
        for body in physics.bodies() {
            assert!(body.position.y >= PIECE_DROP_HEIGHT);
        }
    }

    #[test]
    fn test_every_tile_starts_at_base_color() {
        let mut physics = BoxWorld::default();
        let state = SceneState::build(SceneConfig::default(), 1, &mut physics);
        for tile in &state.tiles.tiles {
            for &handle in tile.shape.color_handles() {
                assert_eq!(state.graph.get(handle).unwrap().color, tile.base_color);
            }
        }
    }

    #[test]
    fn test_same_seed_same_throw() {
        let mut a = BoxWorld::default();
        let mut b = BoxWorld::default();
        SceneState::build(SceneConfig::default(), 77, &mut a);
        SceneState::build(SceneConfig::default(), 77, &mut b);
        assert_eq!(a.bodies(), b.bodies());
    }
}
