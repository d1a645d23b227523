//! Shape generation for projected 2D primitives
//!
//! Radii are per-axis so a circle stays round on non-square viewports.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Generate vertices for a filled ellipse
pub fn circle(center: Vec2, radius: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius.x * theta1.cos(),
            center.y + radius.y * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius.x * theta2.cos(),
            center.y + radius.y * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow ellipse)
pub fn ring(center: Vec2, inner: Vec2, outer: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());

        let inner1 = center + inner * dir1;
        let outer1 = center + outer * dir1;
        let inner2 = center + inner * dir2;
        let outer2 = center + outer * dir2;

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Tapered streak from `head` back to `tail`, fading by colour
pub fn streak(head: Vec2, tail: Vec2, width: f32, head_color: [f32; 4], tail_color: [f32; 4]) -> Vec<Vertex> {
    let dir = (head - tail).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * width;
    let a = head + perp;
    let b = head - perp;

    vec![
        Vertex::new(a.x, a.y, head_color),
        Vertex::new(b.x, b.y, head_color),
        Vertex::new(tail.x, tail.y, tail_color),
    ]
}

/// Triangle fan over a convex outline
pub fn fan(outline: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    if outline.len() < 3 {
        return Vec::new();
    }
    let center = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;
    let mut vertices = Vec::with_capacity(outline.len() * 3);
    for i in 0..outline.len() {
        let p1 = outline[i];
        let p2 = outline[(i + 1) % outline.len()];
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_stays_within_radius() {
        let verts = circle(Vec2::new(0.5, 0.0), Vec2::new(0.1, 0.2), [1.0; 4], 16);
        assert_eq!(verts.len(), 48);
        for v in &verts {
            let dx = (v.position[0] - 0.5) / 0.1;
            let dy = v.position[1] / 0.2;
            assert!(dx * dx + dy * dy <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn test_ring_vertex_count() {
        let verts = ring(Vec2::ZERO, Vec2::splat(0.1), Vec2::splat(0.2), [1.0; 4], 8);
        assert_eq!(verts.len(), 48);
    }

    #[test]
    fn test_fan_needs_three_points() {
        assert!(fan(&[Vec2::ZERO, Vec2::X], [1.0; 4]).is_empty());
        assert_eq!(fan(&[Vec2::ZERO, Vec2::X, Vec2::Y], [1.0; 4]).len(), 9);
    }
}
