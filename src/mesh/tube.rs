use super::{Frame, TubeMesh};
use crate::{
    config::{Color, SnakeConfig, MIN_CIRCLE_SEGMENT},
    spline,
    trail::Trail,
};
use nalgebra::{Vector2, Vector3};

const DEGENERATE_SEGMENT: f32 = 1e-6;

/// Stripe band the arc length `distance` falls in.
pub fn stripe_index(distance: f32, stripe_world_len: f32) -> i64 {
    (distance / stripe_world_len).floor() as i64
}

/// Turns a smoothed curve into a capped tube with a pointed tail.
#[derive(Clone, Debug, PartialEq)]
pub struct TubeMeshBuilder {
    circle_segment: usize,
    radius: f32,
    stripe_world_len: f32,
    color_a: Color,
    color_b: Color,
    tail_cone_length: f32,
    tail_extension: Option<(usize, f32)>,
}

impl TubeMeshBuilder {
    pub fn new(config: &SnakeConfig) -> Self {
        Self {
            circle_segment: config.circle_segment.max(MIN_CIRCLE_SEGMENT),
            radius: config.radius,
            stripe_world_len: config.stripe_world_len,
            color_a: config.stripe_color_a,
            color_b: config.stripe_color_b,
            tail_cone_length: config.tail_cone_length,
            tail_extension: if config.tail_extension {
                Some((config.tail_extension_points, config.tail_extension_spacing))
            } else {
                None
            },
        }
    }

    pub fn circle_segment(&self) -> usize {
        self.circle_segment
    }

    /// Samples handed to the smoother for `trail`: the trail itself, plus the
    /// synthetic tail points when tail extension is on.
    pub fn control_points(&self, trail: &Trail) -> Vec<Vector3<f32>> {
        match self.tail_extension {
            Some((count, spacing)) => trail.extended_samples(self.radius, count, spacing),
            None => trail.positions().to_vec(),
        }
    }

    /// Full per-tick pipeline. `None` when the trail is too short to draw.
    pub fn build_body(&self, trail: &Trail) -> Option<TubeMesh> {
        if trail.len() < 2 {
            return None;
        }
        let smoothed = spline::smooth(&self.control_points(trail));
        self.build(&smoothed)
    }

    pub fn stripe_color(&self, distance: f32) -> Color {
        if stripe_index(distance, self.stripe_world_len) % 2 == 0 {
            self.color_a
        } else {
            self.color_b
        }
    }

    /// Builds the tube around `samples`, head first.
    pub fn build(&self, samples: &[Vector3<f32>]) -> Option<TubeMesh> {
        if samples.len() < 2 {
            return None;
        }
        let n = self.circle_segment;
        let rings = samples.len();
        let mut mesh = TubeMesh::with_capacity(
            rings * n + 3 * (n + 1),
            3 * (2 * (rings - 1) * n + 3 * n),
        );

        let frames: Vec<Frame> = local_forwards(samples)
            .into_iter()
            .map(Frame::from_forward)
            .collect();

        let mut accumulated = 0.0;
        for (i, (sample, frame)) in samples.iter().zip(&frames).enumerate() {
            if i > 0 {
                accumulated += (sample - samples[i - 1]).norm();
            }
            let color = self.stripe_color(accumulated);
            for j in 0..n {
                mesh.push_vertex(
                    sample + frame.ring_offset(j, n, self.radius),
                    Vector2::new(j as f32 / n as f32, i as f32 / rings as f32),
                    color,
                );
            }
        }

        let n32 = n as u32;
        for i in 0..(rings as u32 - 1) {
            for j in 0..n32 {
                let current = i * n32 + j;
                let next = i * n32 + (j + 1) % n32;
                let current_next_row = (i + 1) * n32 + j;
                let next_next_row = (i + 1) * n32 + (j + 1) % n32;
                mesh.push_triangle(current, next, current_next_row);
                mesh.push_triangle(next, next_next_row, current_next_row);
            }
        }

        let head_frame = &frames[0];
        self.push_fan(&mut mesh, samples[0], head_frame, self.color_a, true);

        let tail = samples[rings - 1];
        let tail_frame = &frames[rings - 1];
        self.push_fan(&mut mesh, tail, tail_frame, self.color_b, false);

        let tip = tail - tail_frame.forward * (self.radius * self.tail_cone_length);
        self.push_cone(&mut mesh, tip, tail, tail_frame);

        debug_assert!(mesh.validate().is_ok());
        Some(mesh)
    }

    fn push_ring_copy(
        &self,
        mesh: &mut TubeMesh,
        center: Vector3<f32>,
        frame: &Frame,
        color: Color,
    ) -> u32 {
        let n = self.circle_segment;
        let first = mesh.vertex_count() as u32;
        for j in 0..n {
            let angle = std::f32::consts::TAU * j as f32 / n as f32;
            mesh.push_vertex(
                center + frame.ring_offset(j, n, self.radius),
                Vector2::new(0.5 + 0.5 * angle.cos(), 0.5 + 0.5 * angle.sin()),
                color,
            );
        }
        first
    }

    // Flat disc over the ring at `center`, facing along the frame's forward
    // when `facing_forward`, against it otherwise.
    fn push_fan(
        &self,
        mesh: &mut TubeMesh,
        center: Vector3<f32>,
        frame: &Frame,
        color: Color,
        facing_forward: bool,
    ) {
        let hub = mesh.push_vertex(center, Vector2::new(0.5, 0.5), color);
        let first = self.push_ring_copy(mesh, center, frame, color);
        let n = self.circle_segment as u32;
        for j in 0..n {
            let a = first + j;
            let b = first + (j + 1) % n;
            if facing_forward {
                mesh.push_triangle(hub, b, a);
            } else {
                mesh.push_triangle(hub, a, b);
            }
        }
    }

    fn push_cone(
        &self,
        mesh: &mut TubeMesh,
        tip: Vector3<f32>,
        base: Vector3<f32>,
        frame: &Frame,
    ) {
        let apex = mesh.push_vertex(tip, Vector2::new(0.5, 0.5), self.color_b);
        let first = self.push_ring_copy(mesh, base, frame, self.color_b);
        let n = self.circle_segment as u32;
        for j in 0..n {
            mesh.push_triangle(apex, first + j, first + (j + 1) % n);
        }
    }
}

/// Direction towards the head at each sample. Zero-length steps borrow the
/// nearest usable direction.
fn local_forwards(samples: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
    let raw: Vec<Option<Vector3<f32>>> = (0..samples.len())
        .map(|i| {
            let step = if i == 0 {
                samples[0] - samples[1]
            } else {
                samples[i - 1] - samples[i]
            };
            step.try_normalize(DEGENERATE_SEGMENT)
        })
        .collect();
    let fallback = raw
        .iter()
        .flatten()
        .next()
        .copied()
        .unwrap_or_else(Vector3::z);
    let mut previous = fallback;
    raw.into_iter()
        .map(|forward| {
            if let Some(forward) = forward {
                previous = forward;
            }
            previous
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tail_extension: bool) -> SnakeConfig {
        SnakeConfig {
            tail_extension,
            ..Default::default()
        }
    }

    fn straight(count: usize) -> Vec<Vector3<f32>> {
        (0..count)
            .map(|i| Vector3::new(0.0, 0.0, -(i as f32) * 0.2))
            .collect()
    }

    fn normal(triangle: &[Vector3<f32>; 3]) -> Vector3<f32> {
        (triangle[1] - triangle[0]).cross(&(triangle[2] - triangle[0]))
    }

    #[test]
    fn test_vertex_and_triangle_counts() {
        let builder = TubeMeshBuilder::new(&config(false));
        let trail = Trail::from_positions(straight(5), 0.2);
        let mesh = builder.build_body(&trail).unwrap();
        let smooth_count = 4 * trail.len();
        let n = 12;
        assert_eq!(mesh.vertex_count(), smooth_count * n + 2 * (n + 1) + (n + 1));
        assert_eq!(mesh.triangle_count(), (smooth_count - 1) * n * 2 + 3 * n);
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.uvs.len(), mesh.vertex_count());
        assert_eq!(mesh.colors.len(), mesh.vertex_count());
    }

    #[test]
    fn test_tail_extension_adds_rings() {
        let builder = TubeMeshBuilder::new(&config(true));
        let trail = Trail::from_positions(straight(5), 0.2);
        let mesh = builder.build_body(&trail).unwrap();
        let smooth_count = 4 * (trail.len() + 4);
        assert_eq!(mesh.vertex_count(), smooth_count * 12 + 3 * 13);
        assert_eq!(trail.len(), 5);
    }

    #[test]
    fn test_short_trail_is_skipped() {
        let builder = TubeMeshBuilder::new(&config(true));
        let trail = Trail::from_positions(straight(1), 0.2);
        assert!(builder.build_body(&trail).is_none());
        assert!(builder.build(&straight(1)).is_none());
    }

    #[test]
    fn test_circle_segment_clamped() {
        let builder = TubeMeshBuilder::new(&SnakeConfig {
            circle_segment: 1,
            ..Default::default()
        });
        assert_eq!(builder.circle_segment(), 3);
        let mesh = builder.build(&straight(2)).unwrap();
        assert_eq!(mesh.vertex_count(), 2 * 3 + 3 * 4);
    }

    #[test]
    fn test_rings_have_radius() {
        let builder = TubeMeshBuilder::new(&config(false));
        let samples = straight(3);
        let mesh = builder.build(&samples).unwrap();
        for (i, sample) in samples.iter().enumerate() {
            for j in 0..12 {
                let v = mesh.vertices[i * 12 + j];
                assert!(((v - sample).norm() - 0.5).abs() < 1e-5);
                assert!((v.z - sample.z).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_stripe_parity() {
        let builder = TubeMeshBuilder::new(&config(false));
        let a = SnakeConfig::default().stripe_color_a;
        let b = SnakeConfig::default().stripe_color_b;
        assert_eq!(builder.stripe_color(0.0), a);
        assert_eq!(builder.stripe_color(0.59), a);
        assert_eq!(builder.stripe_color(0.61), b);
        assert_eq!(builder.stripe_color(1.21), a);
        assert_eq!(builder.stripe_color(1.85), b);
    }

    #[test]
    fn test_ring_colors_follow_arc_length() {
        let builder = TubeMeshBuilder::new(&config(false));
        // 1.0 apart so ring i sits at arc length i.
        let samples: Vec<_> = (0..4).map(|i| Vector3::new(i as f32, 0.0, 0.0)).collect();
        let mesh = builder.build(&samples).unwrap();
        for (i, _) in samples.iter().enumerate() {
            let expected = builder.stripe_color(i as f32);
            for j in 0..12 {
                assert_eq!(mesh.colors[i * 12 + j], expected);
            }
        }
    }

    #[test]
    fn test_caps_and_cone() {
        let builder = TubeMeshBuilder::new(&config(false));
        let samples = straight(4);
        let mesh = builder.build(&samples).unwrap();
        let body = 4 * 12;
        let cfg = SnakeConfig::default();

        let head_hub = body;
        assert_eq!(mesh.vertices[head_hub], samples[0]);
        assert_eq!(mesh.colors[head_hub], cfg.stripe_color_a);

        let tail_hub = body + 13;
        assert_eq!(mesh.vertices[tail_hub], samples[3]);
        assert_eq!(mesh.colors[tail_hub], cfg.stripe_color_b);

        let tip = mesh.vertices[body + 26];
        let expected_tip = samples[3] - Vector3::z() * (0.5 * 2.5);
        assert!((tip - expected_tip).norm() < 1e-5);
        for c in &mesh.colors[body + 26..] {
            assert_eq!(*c, cfg.stripe_color_b);
        }
    }

    #[test]
    fn test_winding_is_clockwise_from_outside() {
        let builder = TubeMeshBuilder::new(&config(false));
        let samples = straight(4);
        let mesh = builder.build(&samples).unwrap();
        let n = 12;
        let body_triangles = (4 - 1) * n * 2;

        // Body: outward is away from the axis.
        let tri = mesh.triangle(0);
        let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
        let outward = Vector3::new(centroid.x, centroid.y, 0.0);
        assert!(normal(&tri).dot(&outward) < 0.0);

        // Head cap faces +Z, tail cap -Z.
        let head = mesh.triangle(body_triangles);
        assert!(normal(&head).dot(&Vector3::z()) < 0.0);
        let tail = mesh.triangle(body_triangles + n);
        assert!(normal(&tail).dot(&-Vector3::z()) < 0.0);

        // Cone: outward from its axis.
        let cone = mesh.triangle(body_triangles + 2 * n);
        let centroid = (cone[0] + cone[1] + cone[2]) / 3.0;
        let outward = Vector3::new(centroid.x, centroid.y, 0.0);
        assert!(normal(&cone).dot(&outward) < 0.0);
    }

    #[test]
    fn test_collapsed_samples_stay_finite() {
        let builder = TubeMeshBuilder::new(&config(true));
        let mut trail = Trail::from_positions(straight(5), 0.2);
        trail.grow(5);
        let mesh = builder.build_body(&trail).unwrap();
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite()));
    }

    #[test]
    fn test_vertical_path_frame() {
        let builder = TubeMeshBuilder::new(&config(false));
        let samples: Vec<_> = (0..3).map(|i| Vector3::new(0.0, -(i as f32), 0.0)).collect();
        let mesh = builder.build(&samples).unwrap();
        assert!(mesh.vertices.iter().all(|v| v.x.is_finite() && v.z.is_finite()));
        for j in 0..12 {
            assert!((mesh.vertices[j].y - 0.0).abs() < 1e-5);
        }
    }
}
