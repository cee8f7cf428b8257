use nalgebra::{Vector2, Vector3};

/// Oriented box around the head, yawed with the head's forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadVolume {
    pub center: Vector3<f32>,
    pub forward: Vector3<f32>,
    /// Along right, up and forward.
    pub half_extents: Vector3<f32>,
}

impl HeadVolume {
    pub fn cube(center: Vector3<f32>, forward: Vector3<f32>, size: f32) -> Self {
        Self {
            center,
            forward,
            half_extents: Vector3::repeat(size * 0.5),
        }
    }

    /// XZ corners of the box, in winding order.
    pub fn footprint(&self) -> [Vector2<f32>; 4] {
        let forward = Vector2::new(self.forward.x, self.forward.z)
            .try_normalize(1e-6)
            .unwrap_or_else(Vector2::y);
        let side = Vector2::new(forward.y, -forward.x);
        let center = Vector2::new(self.center.x, self.center.z);
        let f = forward * self.half_extents.z;
        let s = side * self.half_extents.x;
        [
            center + f + s,
            center + f - s,
            center - f - s,
            center - f + s,
        ]
    }

    pub fn vertical_range(&self) -> (f32, f32) {
        (
            self.center.y - self.half_extents.y,
            self.center.y + self.half_extents.y,
        )
    }

    /// Closest and farthest planar distance from the world origin to the
    /// box footprint.
    pub fn radial_range(&self) -> (f32, f32) {
        let corners = self.footprint();
        let far = corners.iter().map(|c| c.norm()).fold(0.0, f32::max);
        let near = if contains_origin(&corners) {
            0.0
        } else {
            (0..corners.len())
                .map(|i| {
                    origin_distance_to_segment(&corners[i], &corners[(i + 1) % corners.len()])
                })
                .fold(f32::INFINITY, f32::min)
        };
        (near, far)
    }
}

fn contains_origin(polygon: &[Vector2<f32>]) -> bool {
    let mut sign = 0.0f32;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        // Cross product of the edge with the vector to the origin.
        let cross = (b.x - a.x) * (-a.y) - (b.y - a.y) * (-a.x);
        if cross != 0.0 {
            if sign != 0.0 && cross.signum() != sign {
                return false;
            }
            sign = cross.signum();
        }
    }
    true
}

fn origin_distance_to_segment(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    let ab = b - a;
    let length_squared = ab.norm_squared();
    if length_squared == 0.0 {
        return a.norm();
    }
    let t = (-a.dot(&ab) / length_squared).max(0.0).min(1.0);
    (a + ab * t).norm()
}

/// Static arena geometry the head can run into.
pub trait Boundary: Send + Sync {
    fn overlaps(&self, volume: &HeadVolume) -> bool;
}

/// Boundary registered for the session, if any.
#[derive(Default)]
pub struct Boundaries {
    boundary: Option<Box<dyn Boundary>>,
}

impl Boundaries {
    pub fn new<B: Boundary + 'static>(boundary: B) -> Self {
        Self {
            boundary: Some(Box::new(boundary)),
        }
    }

    pub fn register<B: Boundary + 'static>(&mut self, boundary: B) {
        self.boundary = Some(Box::new(boundary));
    }

    pub fn get(&self) -> Option<&dyn Boundary> {
        self.boundary.as_deref()
    }
}
