//! Board tiles: single meshes or grouped parts (ring + planet)

use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::scene::{Color, NodeId, SceneGraph};

/// What a tile shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileStyle {
    Star,
    Earth,
    Mars,
    Neptune,
    Saturn,
    Polaris,
}

impl TileStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileStyle::Star => "star",
            TileStyle::Earth => "earth",
            TileStyle::Mars => "mars",
            TileStyle::Neptune => "neptune",
            TileStyle::Saturn => "saturn",
            TileStyle::Polaris => "polaris",
        }
    }
}

/// Node layout of a tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TileShape {
    /// One mesh: picked and coloured as itself
    Simple(NodeId),
    /// A group picked as a whole; every part carries a colour
    Grouped { root: NodeId, parts: Vec<NodeId> },
}

impl TileShape {
    /// Node tested by ray queries
    pub fn pick_node(&self) -> NodeId {
        match self {
            TileShape::Simple(node) => *node,
            TileShape::Grouped { root, .. } => *root,
        }
    }

    /// Nodes whose colour the tile controls
    pub fn color_handles(&self) -> &[NodeId] {
        match self {
            TileShape::Simple(node) => std::slice::from_ref(node),
            TileShape::Grouped { parts, .. } => parts,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub style: TileStyle,
    pub shape: TileShape,
    /// Colour restored every frame before highlighting
    pub base_color: Color,
    /// Rotation about Y (radians/s)
    pub spin: f32,
}

impl Tile {
    pub fn name(&self) -> &'static str {
        self.style.as_str()
    }

    pub fn paint(&self, graph: &mut SceneGraph, color: Color) {
        for &handle in self.shape.color_handles() {
            graph.set_color(handle, color);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileSet {
    pub tiles: Vec<Tile>,
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tile: Tile) -> usize {
        self.tiles.push(tile);
        self.tiles.len() - 1
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// First tile with the given style
    pub fn find(&self, style: TileStyle) -> Option<usize> {
        self.tiles.iter().position(|t| t.style == style)
    }

    /// Top-level nodes to hand to ray queries, in tile order
    pub fn pick_targets(&self) -> Vec<NodeId> {
        self.tiles.iter().map(|t| t.shape.pick_node()).collect()
    }

    /// Spin every tile about its Y axis
    pub fn rotate(&self, graph: &mut SceneGraph, dt: f32) {
        for tile in &self.tiles {
            if tile.spin == 0.0 {
                continue;
            }
            if let Some(node) = graph.get_mut(tile.shape.pick_node()) {
                node.orientation = (Quat::from_rotation_y(tile.spin * dt) * node.orientation).normalize();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node, Shape};
    use glam::Vec3;

    #[test]
    fn test_grouped_tile_paints_every_part() {
        let mut graph = SceneGraph::new();
        let root = graph.add(Node::new("earth", Shape::Group));
        let ring = graph.add(Node::new("ring", Shape::Ring).child_of(root));
        let planet = graph.add(Node::new("planet", Shape::Disc).child_of(root));
        let tile = Tile {
            style: TileStyle::Earth,
            shape: TileShape::Grouped { root, parts: vec![ring, planet] },
            base_color: Color(0xff0000),
            spin: 0.0,
        };

        tile.paint(&mut graph, Color(0x00ff00));
        assert_eq!(graph.get(ring).unwrap().color, Color(0x00ff00));
        assert_eq!(graph.get(planet).unwrap().color, Color(0x00ff00));
        // The group itself has no colour of its own to manage
        assert_eq!(graph.get(root).unwrap().color, Color::WHITE);
        assert_eq!(tile.shape.pick_node(), root);
    }

    #[test]
    fn test_rotate_spins_only_spinning_tiles() {
        let mut graph = SceneGraph::new();
        let spinning = graph.add(Node::new("saturn", Shape::Disc));
        let still = graph.add(Node::new("star", Shape::Disc));
        let mut tiles = TileSet::new();
        tiles.push(Tile {
            style: TileStyle::Saturn,
            shape: TileShape::Simple(spinning),
            base_color: Color(0xff0000),
            spin: 1.0,
        });
        tiles.push(Tile {
            style: TileStyle::Star,
            shape: TileShape::Simple(still),
            base_color: Color(0xff0000),
            spin: 0.0,
        });

        tiles.rotate(&mut graph, 0.5);

        let rotated = graph.get(spinning).unwrap().orientation * Vec3::X;
        assert!((rotated - Quat::from_rotation_y(0.5) * Vec3::X).length() < 1e-5);
        assert_eq!(graph.get(still).unwrap().orientation, Quat::IDENTITY);
        assert_eq!(tiles.find(TileStyle::Star), Some(1));
        assert_eq!(tiles.pick_targets(), vec![spinning, still]);
    }
}
