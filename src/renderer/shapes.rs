//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

fn point_on_circle(center: Vec2, radius: f32, theta: f32) -> Vec2 {
    Vec2::new(center.x + radius * theta.cos(), center.y + radius * theta.sin())
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let edge1 = point_on_circle(center, radius, theta1);
        let edge2 = point_on_circle(center, radius, theta2);

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(edge1.x, edge1.y, color));
        vertices.push(Vertex::new(edge2.x, edge2.y, color));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let inner_radius = inner_radius.max(0.0);
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        let inner1 = point_on_circle(center, inner_radius, theta1);
        let outer1 = point_on_circle(center, outer_radius, theta1);
        let inner2 = point_on_circle(center, inner_radius, theta2);
        let outer2 = point_on_circle(center, outer_radius, theta2);

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

/// Segment count that keeps edges roughly `max_edge` pixels long
pub fn segments_for_radius(radius: f32, max_edge: f32) -> u32 {
    ((TAU * radius / max_edge.max(1.0)).ceil() as u32).clamp(8, 96)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        let verts = circle(Vec2::new(10.0, 10.0), 5.0, [1.0; 4], 16);
        assert_eq!(verts.len(), 48);
        for v in verts.iter().skip(1).step_by(3) {
            let d = Vec2::from(v.position).distance(Vec2::new(10.0, 10.0));
            assert!((d - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ring_vertex_count() {
        assert_eq!(ring(Vec2::ZERO, 8.0, 10.0, [1.0; 4], 12).len(), 72);
    }

    #[test]
    fn test_segments_clamped() {
        assert_eq!(segments_for_radius(0.5, 4.0), 8);
        assert_eq!(segments_for_radius(10_000.0, 4.0), 96);
    }
}
