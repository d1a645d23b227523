//! Render graph module
//!
//! The scene-side collaborator of the frame driver: nodes the renderer
//! draws, the camera they are seen through, and ray queries for picking.

pub mod camera;
pub mod graph;

pub use camera::{Camera, OrbitControls, Ray};
pub use graph::{Color, Intersection, Node, NodeId, SceneGraph, Shape};
