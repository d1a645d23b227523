//! Render graph: named nodes with transform, colour and a pick sphere
//!
//! Nodes are stored in a slot vector; removed slots are never reused so a
//! stale `NodeId` simply resolves to `None`.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::camera::Ray;

/// Handle to a node in the [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// 0xRRGGBB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    pub fn to_rgba(self) -> [f32; 4] {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        [r, g, b, 1.0]
    }
}

/// What a node draws as
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Container only, draws nothing itself
    Group,
    /// Filled disc billboard (planets, stars)
    Disc,
    /// Solid box with these half extents, turned by the node orientation
    Box(Vec3),
    /// Hollow ring billboard (planet rings)
    Ring,
    /// Flat floor quad
    Floor,
}

/// A node of the render graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub shape: Shape,
    /// Position relative to the parent (or world if no parent)
    pub position: Vec3,
    pub orientation: Quat,
    /// Uniform scale; also the drawn radius
    pub scale: f32,
    pub color: Color,
    /// Radius of the sphere used by ray queries (0 = not pickable)
    pub pick_radius: f32,
    pub parent: Option<NodeId>,
    pub visible: bool,
}

impl Node {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: 1.0,
            color: Color::WHITE,
            pick_radius: 0.0,
            parent: None,
            visible: true,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn pickable(mut self, radius: f32) -> Self {
        self.pick_radius = radius;
        self
    }

    pub fn child_of(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Result of a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    /// Distance along the ray to the entry point
    pub distance: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    nodes: Vec<Option<Node>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    /// Remove a node and every descendant
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let removed = self.nodes.get_mut(id.0 as usize)?.take()?;
        let children: Vec<NodeId> = self
            .iter()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(child, _)| child)
            .collect();
        for child in children {
            self.remove(child);
        }
        Some(removed)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Live nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i as u32), n)))
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_color(&mut self, id: NodeId, color: Color) {
        if let Some(node) = self.get_mut(id) {
            node.color = color;
        }
    }

    /// World-space position, composing parent transforms
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        let node = self.get(id)?;
        match node.parent.and_then(|p| self.get(p).map(|parent| (p, parent))) {
            Some((parent_id, parent)) => {
                let origin = self.world_position(parent_id)?;
                Some(origin + parent.orientation * (node.position * parent.scale))
            }
            None => Some(node.position),
        }
    }

    /// World-space orientation, composing parent rotations
    pub fn world_orientation(&self, id: NodeId) -> Option<Quat> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_orientation(parent).unwrap_or(Quat::IDENTITY) * node.orientation),
            None => Some(node.orientation),
        }
    }

    /// World-space scale, composing parent scales
    pub fn world_scale(&self, id: NodeId) -> Option<f32> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => Some(node.scale * self.world_scale(parent).unwrap_or(1.0)),
            None => Some(node.scale),
        }
    }

    /// Intersect `ray` with the pick spheres of `targets`, nearest first.
    ///
    /// Only the listed nodes are tested; children are not visited.
    pub fn intersect(&self, ray: &Ray, targets: &[NodeId]) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = targets
            .iter()
            .filter_map(|&id| {
                let node = self.get(id)?;
                if !node.visible || node.pick_radius <= 0.0 {
                    return None;
                }
                let center = self.world_position(id)?;
                let radius = node.pick_radius * self.world_scale(id)?;
                ray.intersect_sphere(center, radius)
                    .map(|distance| Intersection { node: id, distance })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(Color(0xff0000).to_rgba(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(Color(0x0000ff).to_rgba(), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_remove_takes_children() {
        let mut graph = SceneGraph::new();
        let group = graph.add(Node::new("earth", Shape::Group));
        let ring = graph.add(Node::new("ring", Shape::Ring).child_of(group));
        let other = graph.add(Node::new("star", Shape::Disc));

        assert!(graph.remove(group).is_some());
        assert!(!graph.contains(group));
        assert!(!graph.contains(ring));
        assert!(graph.contains(other));
        assert_eq!(graph.len(), 1);

        // Removing twice is a no-op
        assert!(graph.remove(group).is_none());
    }

    #[test]
    fn test_world_position_composes_parent() {
        let mut graph = SceneGraph::new();
        let parent = graph.add(
            Node::new("group", Shape::Group)
                .at(Vec3::new(10.0, 0.0, 0.0))
                .scaled(2.0),
        );
        let child = graph.add(
            Node::new("planet", Shape::Disc)
                .at(Vec3::new(0.0, 1.0, 0.0))
                .child_of(parent),
        );

        let pos = graph.world_position(child).unwrap();
        assert!((pos - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);
        assert_eq!(graph.world_scale(child), Some(2.0));
    }

    #[test]
    fn test_intersect_sorted_nearest_first() {
        let mut graph = SceneGraph::new();
        let far = graph.add(Node::new("far", Shape::Disc).at(Vec3::new(0.0, 0.0, -20.0)).pickable(1.0));
        let near = graph.add(Node::new("near", Shape::Disc).at(Vec3::new(0.0, 0.0, -5.0)).pickable(1.0));
        let off = graph.add(Node::new("off", Shape::Disc).at(Vec3::new(8.0, 0.0, -5.0)).pickable(1.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hits = graph.intersect(&ray, &[far, near, off]);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert_eq!(hits[1].node, far);
        assert!((hits[0].distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_intersect_skips_unpickable() {
        let mut graph = SceneGraph::new();
        let floor = graph.add(Node::new("floor", Shape::Floor).at(Vec3::new(0.0, 0.0, -5.0)));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(graph.intersect(&ray, &[floor]).is_empty());
    }
}
