//! WebGPU rendering module
//!
//! The scene is projected on the CPU into coloured triangles
//! ([`DrawList`]) and drawn by a single flat-colour pipeline.

pub mod draw_list;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use draw_list::DrawList;
pub use pipeline::RenderState;
pub use vertex::Vertex;

use crate::sim::SceneState;

/// Final step of every frame
pub trait RenderTarget {
    fn render(&mut self, state: &SceneState);
}
