//! Yut pieces: rigid bodies paired with visual nodes
//!
//! Piece `i` is body `i` in the physics world and `nodes[i]` in the render
//! graph. Pieces are only created and removed through [`PieceSet`], which
//! always touches both owners, so the two lists never drift apart.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::vector::random_direction;
use crate::physics::{RigidBody, RigidBodySim};
use crate::scene::{Node, NodeId, SceneGraph};

/// Stable identity of a piece, unaffected by removals of other pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PieceSet {
    ids: Vec<PieceId>,
    nodes: Vec<NodeId>,
    next_id: u32,
}

impl PieceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a piece to both the physics world and the render graph.
    ///
    /// The world must hold no bodies other than pieces.
    pub fn spawn<P: RigidBodySim + ?Sized>(
        &mut self,
        graph: &mut SceneGraph,
        physics: &mut P,
        body: RigidBody,
        mut node: Node,
    ) -> PieceId {
        node.position = body.position;
        node.orientation = body.orientation;

        let index = physics.add_body(body);
        debug_assert_eq!(index, self.nodes.len(), "physics bodies out of step with pieces");

        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.ids.push(id);
        self.nodes.push(graph.add(node));
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[PieceId] {
        &self.ids
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn index_of(&self, id: PieceId) -> Option<usize> {
        self.ids.iter().position(|&p| p == id)
    }

    pub fn id_at(&self, index: usize) -> Option<PieceId> {
        self.ids.get(index).copied()
    }

    /// Remove one piece from physics and the render graph together.
    /// Returns false if the piece is unknown.
    pub fn detach<P: RigidBodySim + ?Sized>(
        &mut self,
        id: PieceId,
        graph: &mut SceneGraph,
        physics: &mut P,
    ) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        physics.remove_body(index);
        graph.remove(self.nodes.remove(index));
        self.ids.remove(index);
        log::info!("Detached piece {:?} ({} left)", id, self.ids.len());
        true
    }

    /// Copy every body's position and orientation onto its node
    pub fn sync(&self, graph: &mut SceneGraph, bodies: &[RigidBody]) {
        debug_assert_eq!(bodies.len(), self.nodes.len(), "physics bodies out of step with pieces");
        for (&node_id, body) in self.nodes.iter().zip(bodies) {
            if let Some(node) = graph.get_mut(node_id) {
                node.position = body.position;
                node.orientation = body.orientation;
            }
        }
    }

    /// Lift every piece above the board and drop it with a random tumble
    pub fn throw<P: RigidBodySim + ?Sized, R: Rng + ?Sized>(
        &self,
        physics: &mut P,
        rng: &mut R,
        drop_height: f32,
    ) {
        let count = self.len() as f32;
        for index in 0..self.len() {
            let Some(body) = physics.body_mut(index) else {
                continue;
            };
            let x = (index as f32 - (count - 1.0) / 2.0) * 2.0;
            let position = Vec3::new(x, drop_height + rng.random_range(0.0..2.0), 0.0);
            let velocity = Vec3::new(rng.random_range(-1.0..1.0), 0.0, rng.random_range(-1.0..1.0));
            let spin = random_direction(rng) * rng.random_range(2.0..6.0);
            body.orientation =
                Quat::from_axis_angle(random_direction(rng), rng.random_range(0.0..std::f32::consts::TAU));
            body.launch(position, velocity, spin);
        }
    }
}
