//! Vertex types for projected scene rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in normalized device coordinates with colour
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Colours for scene elements without a node colour
pub mod colors {
    pub const SPACESHIP: [f32; 4] = [0.75, 0.78, 0.85, 1.0];
    pub const SPACESHIP_WINDOW: [f32; 4] = [0.3, 0.8, 1.0, 1.0];
    pub const SHOOTING_STAR_HEAD: [f32; 4] = [1.0, 0.95, 0.7, 1.0];
    pub const SHOOTING_STAR_TAIL: [f32; 4] = [1.0, 0.8, 0.4, 0.0];
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.03, 1.0];
}
