use crate::{
    collision::{Boundary, HeadVolume},
    config::{Color, SnakeConfig},
    mesh::Mesh,
};
use nalgebra::{Vector2, Vector3};

pub const WALL_COLOR: Color = Color::new(0.6, 0.6, 0.65);

/// Circular arena wall centered on the origin, standing on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingWall {
    pub radius: f32,
    pub thickness: f32,
    pub height: f32,
    pub segment_count: usize,
}

impl RingWall {
    pub fn new(config: &SnakeConfig) -> Self {
        Self {
            radius: config.wall_radius,
            thickness: config.wall_thickness,
            height: config.wall_height,
            segment_count: config.segment_count.max(3),
        }
    }

    pub fn inner_radius(&self) -> f32 {
        self.radius - self.thickness / 2.0
    }

    pub fn outer_radius(&self) -> f32 {
        self.radius + self.thickness / 2.0
    }

    /// Outer and inner faces of the wall. Bottom vertices are laid out
    /// outer, inner per slice, followed by the matching top vertices.
    pub fn mesh(&self) -> Mesh {
        let segments = self.segment_count;
        let per_circle = segments as u32 * 2;
        let mut mesh = Mesh::with_capacity(segments * 4, segments * 12);
        let mut top = Vec::with_capacity(segments * 2);
        for i in 0..segments {
            let angle = std::f32::consts::TAU * i as f32 / segments as f32;
            let (sin, cos) = angle.sin_cos();
            let u = i as f32 / segments as f32;
            let outer = Vector3::new(self.outer_radius() * cos, 0.0, self.outer_radius() * sin);
            let inner = Vector3::new(self.inner_radius() * cos, 0.0, self.inner_radius() * sin);
            mesh.push_vertex(outer, Vector2::new(u, 0.0), WALL_COLOR);
            mesh.push_vertex(inner, Vector2::new(u, 0.2), WALL_COLOR);
            top.push((outer + Vector3::y() * self.height, Vector2::new(u, 1.0)));
            top.push((inner + Vector3::y() * self.height, Vector2::new(u, 0.8)));
        }
        for (position, uv) in top {
            mesh.push_vertex(position, uv, WALL_COLOR);
        }
        for i in 0..segments as u32 {
            let next = (i + 1) % segments as u32;
            mesh.push_triangle(i * 2, next * 2, per_circle + i * 2);
            mesh.push_triangle(next * 2, per_circle + next * 2, per_circle + i * 2);
            mesh.push_triangle(per_circle + i * 2 + 1, per_circle + next * 2 + 1, i * 2 + 1);
            mesh.push_triangle(per_circle + next * 2 + 1, next * 2 + 1, i * 2 + 1);
        }
        mesh
    }
}

impl Boundary for RingWall {
    fn overlaps(&self, volume: &HeadVolume) -> bool {
        let (bottom, top) = volume.vertical_range();
        if top < 0.0 || bottom > self.height {
            return false;
        }
        let (near, far) = volume.radial_range();
        near <= self.outer_radius() && far >= self.inner_radius()
    }
}
