//! CPU projection of the scene into coloured NDC triangles
//!
//! Every drawable is projected through the camera and painted back to front,
//! so the GPU side needs no depth buffer.

use glam::{Quat, Vec2, Vec3};

use super::RenderTarget;
use super::shapes;
use super::vertex::{Vertex, colors};
use crate::board_point;
use crate::scene::{Camera, Shape};
use crate::sim::SceneState;

const DISC_SEGMENTS: u32 = 24;
const FLOOR_SEGMENTS: usize = 48;
const SPACESHIP_SIZE: f32 = 1.2;
const SHOOTING_STAR_TAIL: f32 = 6.0;

/// Projected geometry of the last rendered frame
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    vertices: Vec<Vertex>,
}

struct Item {
    depth: f32,
    vertices: Vec<Vertex>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Project the whole scene, back to front
    pub fn build(state: &SceneState) -> Vec<Vertex> {
        let camera = &state.camera;
        let mut items = Vec::new();

        for (id, node) in state.graph.iter() {
            if !node.visible {
                continue;
            }
            let (Some(world), Some(scale)) = (state.graph.world_position(id), state.graph.world_scale(id))
            else {
                continue;
            };
            let color = node.color.to_rgba();
            let item = match node.shape {
                Shape::Group => None,
                Shape::Floor => floor(camera, world, scale, color),
                Shape::Disc => billboard(camera, world, scale, |c, r| {
                    shapes::circle(c, r, color, DISC_SEGMENTS)
                }),
                Shape::Ring => billboard(camera, world, scale, |c, r| {
                    shapes::ring(c, r * 0.75, r, color, DISC_SEGMENTS)
                }),
                Shape::Box(half_extents) => {
                    let orientation = state.graph.world_orientation(id).unwrap_or(Quat::IDENTITY);
                    solid_box(camera, world, orientation, half_extents * scale, color)
                }
            };
            items.extend(item);
        }

        for ship in &state.spaceships {
            items.extend(billboard(camera, ship.position, SPACESHIP_SIZE, |c, r| {
                let mut v = shapes::circle(c, r, colors::SPACESHIP, 12);
                v.extend(shapes::circle(c, r * 0.4, colors::SPACESHIP_WINDOW, 8));
                v
            }));
        }

        for star in &state.shooting_stars {
            let tail_world = star.position - star.direction * SHOOTING_STAR_TAIL;
            if let (Some((head, depth)), Some((tail, _))) = (camera.project(star.position), camera.project(tail_world)) {
                let width = 0.3 * camera.ndc_scale_at(depth);
                items.push(Item {
                    depth,
                    vertices: shapes::streak(head, tail, width, colors::SHOOTING_STAR_HEAD, colors::SHOOTING_STAR_TAIL),
                });
            }
        }

        // Farthest first
        items.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        items.into_iter().flat_map(|item| item.vertices).collect()
    }
}

impl RenderTarget for DrawList {
    fn render(&mut self, state: &SceneState) {
        self.vertices = Self::build(state);
    }
}

/// Camera-facing shape of world radius `radius` centred on `world`
fn billboard(
    camera: &Camera,
    world: Vec3,
    radius: f32,
    draw: impl FnOnce(Vec2, Vec2) -> Vec<Vertex>,
) -> Option<Item> {
    let (center, depth) = camera.project(world)?;
    let r = radius * camera.ndc_scale_at(depth);
    Some(Item {
        depth,
        vertices: draw(center, Vec2::new(r / camera.aspect, r)),
    })
}

/// Faces of an oriented box that point towards the camera, shaded per axis.
/// Culled faces of a convex box never overlap, so they need no sorting.
fn solid_box(camera: &Camera, center: Vec3, orientation: Quat, half_extents: Vec3, color: [f32; 4]) -> Option<Item> {
    let (_, depth) = camera.project(center)?;
    let axes = [
        orientation * Vec3::X * half_extents.x,
        orientation * Vec3::Y * half_extents.y,
        orientation * Vec3::Z * half_extents.z,
    ];

    let mut vertices = Vec::new();
    for (axis, shade) in [(0, 0.8), (1, 1.0), (2, 0.65)] {
        for sign in [1.0, -1.0] {
            let normal = axes[axis] * sign;
            let face = center + normal;
            if normal.dot(camera.position - face) <= 0.0 {
                continue;
            }
            let (u, v) = (axes[(axis + 1) % 3], axes[(axis + 2) % 3]);
            let outline: Option<Vec<Vec2>> = [face + u + v, face - u + v, face - u - v, face + u - v]
                .into_iter()
                .map(|corner| camera.project(corner).map(|(p, _)| p))
                .collect();
            let Some(outline) = outline else {
                continue;
            };
            let shaded = [color[0] * shade, color[1] * shade, color[2] * shade, color[3]];
            vertices.extend(shapes::fan(&outline, shaded));
        }
    }
    Some(Item { depth, vertices })
}

/// Floor disc on the board plane; drawn behind everything standing on it
fn floor(camera: &Camera, center: Vec3, radius: f32, color: [f32; 4]) -> Option<Item> {
    let outline: Option<Vec<Vec2>> = (0..FLOOR_SEGMENTS)
        .map(|i| {
            let theta = i as f32 / FLOOR_SEGMENTS as f32 * std::f32::consts::TAU;
            camera.project(center + board_point(radius, theta)).map(|(p, _)| p)
        })
        .collect();
    Some(Item {
        depth: f32::INFINITY,
        vertices: shapes::fan(&outline?, color),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BoxWorld;
    use crate::scene::Node;
    use crate::settings::SceneConfig;
    use crate::sim::{TransientKind, TransientObject};

    #[test]
    fn test_empty_scene_draws_nothing() {
        let state = SceneState::new(SceneConfig::default(), 1);
        assert!(DrawList::build(&state).is_empty());
    }

    #[test]
    fn test_board_projects_on_screen() {
        let mut physics = BoxWorld::default();
        let state = SceneState::build(SceneConfig::default(), 1, &mut physics);
        let vertices = DrawList::build(&state);
        assert!(!vertices.is_empty());

        // The floor is painted first, in its own colour
        let floor = crate::scene::Color(0x1a1a33).to_rgba();
        assert_eq!(vertices[0].color, floor);
    }

    #[test]
    fn test_transients_are_drawn() {
        let mut state = SceneState::new(SceneConfig::default(), 1);
        state.spaceships.push(TransientObject::new(
            TransientKind::Spaceship,
            Vec3::ZERO,
            Vec3::X,
            0.0,
        ));
        let mut list = DrawList::new();
        list.render(&state);
        assert!(list.vertices().iter().any(|v| v.color == colors::SPACESHIP));

        state.spaceships.clear();
        state.shooting_stars.push(TransientObject::new(
            TransientKind::ShootingStar,
            Vec3::ZERO,
            Vec3::X,
            0.0,
        ));
        list.render(&state);
        assert_eq!(list.vertices().len(), 3);
    }

    #[test]
    fn test_box_follows_node_orientation() {
        let mut state = SceneState::new(SceneConfig::default(), 1);
        let stick = state
            .graph
            .add(Node::new("stick", Shape::Box(Vec3::new(0.4, 0.15, 2.0))).at(state.controls.target));

        let flat = DrawList::build(&state);
        // One to three faces, each a four-triangle fan
        assert!(!flat.is_empty() && flat.len() <= 36);
        assert_eq!(flat.len() % 12, 0);

        state.graph.get_mut(stick).unwrap().orientation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let turned = DrawList::build(&state);
        assert_ne!(flat, turned);
    }
}
