pub mod tube;

pub use tube::TubeMeshBuilder;

use crate::{config::Color, trail::Trail};
use legion::system;
use log::debug;
use nalgebra::{Vector2, Vector3};
use std::sync::Arc;
use thiserror::Error;

// Above this alignment with the vertical the frame switches reference axis.
const VERTICAL_ALIGNMENT: f32 = 0.99;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("{uvs} uvs and {colors} colors for {vertices} vertices")]
    LengthMismatch {
        vertices: usize,
        uvs: usize,
        colors: usize,
    },
    #[error("{0} triangle indices is not a multiple of 3")]
    RaggedTriangles(usize),
    #[error("triangle index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
}

/// Renderable triangle soup with per-vertex uv and color.
///
/// Triangles are wound clockwise when seen from the outside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vector3<f32>>,
    pub triangles: Vec<u32>,
    pub uvs: Vec<Vector2<f32>>,
    pub colors: Vec<Color>,
}

pub type TubeMesh = Mesh;

impl Mesh {
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(indices),
            uvs: Vec::with_capacity(vertices),
            colors: Vec::with_capacity(vertices),
        }
    }

    pub fn push_vertex(&mut self, position: Vector3<f32>, uv: Vector2<f32>, color: Color) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.uvs.push(uv);
        self.colors.push(color);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.extend_from_slice(&[a, b, c]);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn triangle(&self, index: usize) -> [Vector3<f32>; 3] {
        let base = index * 3;
        [
            self.vertices[self.triangles[base] as usize],
            self.vertices[self.triangles[base + 1] as usize],
            self.vertices[self.triangles[base + 2] as usize],
        ]
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        let vertices = self.vertices.len();
        if self.uvs.len() != vertices || self.colors.len() != vertices {
            return Err(MeshError::LengthMismatch {
                vertices,
                uvs: self.uvs.len(),
                colors: self.colors.len(),
            });
        }
        if self.triangles.len() % 3 != 0 {
            return Err(MeshError::RaggedTriangles(self.triangles.len()));
        }
        if let Some(&index) = self.triangles.iter().find(|&&i| i as usize >= vertices) {
            return Err(MeshError::IndexOutOfRange { index, vertices });
        }
        Ok(())
    }
}

/// Orthonormal basis of a cross-section. `forward` is the ring's normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl Frame {
    /// `forward` must be unit length.
    pub fn from_forward(forward: Vector3<f32>) -> Self {
        let up = if forward.dot(&Vector3::y()).abs() > VERTICAL_ALIGNMENT {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let right = up.cross(&forward).normalize();
        let up = forward.cross(&right).normalize();
        Self { forward, right, up }
    }

    /// Offset of vertex `j` of a `segments`-gon of the given radius.
    pub fn ring_offset(&self, j: usize, segments: usize, radius: f32) -> Vector3<f32> {
        let angle = std::f32::consts::TAU * j as f32 / segments as f32;
        self.right * (angle.cos() * radius) + self.up * (angle.sin() * radius)
    }
}

/// The latest body mesh, published whole once per rebuild.
#[derive(Clone, Debug, Default)]
pub struct BodyMesh {
    mesh: Option<Arc<TubeMesh>>,
    revision: u64,
}

impl BodyMesh {
    pub fn publish(&mut self, mesh: TubeMesh) {
        self.mesh = Some(Arc::new(mesh));
        self.revision += 1;
    }

    pub fn current(&self) -> Option<Arc<TubeMesh>> {
        self.mesh.clone()
    }

    /// Bumped on every publish; unchanged across skipped rebuilds.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Rebuilds the body from the current trail and swaps it in whole. A trail
/// too short to draw leaves the previous mesh in place.
#[system]
pub fn rebuild_body(
    #[resource] trail: &Trail,
    #[resource] builder: &TubeMeshBuilder,
    #[resource] body: &mut BodyMesh,
) {
    match builder.build_body(trail) {
        Some(mesh) => body.publish(mesh),
        None => debug!("Trail has {} samples, body not rebuilt", trail.len()),
    }
}
