use crate::{advance::HeadPose, config::SnakeConfig};
use legion::system;
use log::debug;
use nalgebra::{Vector2, Vector3};

const DEGENERATE_SEGMENT: f32 = 1e-6;

/// Euclidean distance ignoring the vertical axis.
pub fn planar_distance(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    Vector2::new(a.x - b.x, a.z - b.z).norm()
}

/// Samples left behind by the head, most recent first.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    positions: Vec<Vector3<f32>>,
    current_length: usize,
    min_insert_distance: f32,
}

impl Trail {
    /// Lays `initial_length` samples out behind the head, `min_distance` apart,
    /// on the base plane.
    pub fn new(head: Vector3<f32>, forward: Vector3<f32>, config: &SnakeConfig) -> Self {
        let length = config.initial_length.max(1);
        let back = -forward;
        let positions = (0..length)
            .map(|i| {
                let pos = head + back * (i as f32 * config.min_distance);
                Vector3::new(pos.x, config.snake_base_y, pos.z)
            })
            .collect();
        Self {
            positions,
            current_length: length,
            min_insert_distance: config.min_distance,
        }
    }

    pub fn from_positions(positions: Vec<Vector3<f32>>, min_insert_distance: f32) -> Self {
        let current_length = positions.len().max(1);
        Self {
            positions,
            current_length,
            min_insert_distance,
        }
    }

    /// Records `head` as the new front sample once the head has moved far
    /// enough on the ground plane. Vertical motion alone never adds samples.
    pub fn insert(&mut self, head: Vector3<f32>) -> bool {
        let far_enough = match self.positions.first() {
            Some(front) => planar_distance(&head, front) > self.min_insert_distance,
            None => true,
        };
        if far_enough {
            self.positions.insert(0, head);
        }
        far_enough
    }

    /// Drops the oldest samples beyond the target length.
    pub fn prune(&mut self) {
        self.positions.truncate(self.current_length);
    }

    /// Extends the target length by `count` and stacks that many copies of
    /// the last sample on the tail, so new segments unfold from the tail as
    /// the head moves on.
    pub fn grow(&mut self, count: i32) {
        let count = count.max(0) as usize;
        self.current_length += count;
        if let Some(last) = self.positions.last().copied() {
            self.positions.extend(std::iter::repeat(last).take(count));
        }
        debug!("Grew trail by {} to {} samples", count, self.current_length);
    }

    pub fn positions(&self) -> &[Vector3<f32>] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn current_length(&self) -> usize {
        self.current_length
    }

    pub fn head(&self) -> Option<&Vector3<f32>> {
        self.positions.first()
    }

    pub fn tail(&self) -> Option<&Vector3<f32>> {
        self.positions.last()
    }

    /// The live samples followed by `count` synthetic points continuing the
    /// last non-degenerate segment past the tail, `spacing * radius` apart.
    /// They give the smoother support to run the body out to the tail.
    ///
    /// The trail itself is left untouched.
    pub fn extended_samples(&self, radius: f32, count: usize, spacing: f32) -> Vec<Vector3<f32>> {
        let mut samples = Vec::with_capacity(self.positions.len() + count);
        samples.extend_from_slice(&self.positions);
        let direction = self
            .positions
            .windows(2)
            .rev()
            .find_map(|pair| (pair[1] - pair[0]).try_normalize(DEGENERATE_SEGMENT));
        if let (Some(direction), Some(&tail)) = (direction, self.positions.last()) {
            let step = direction * (radius * spacing);
            samples.extend((1..=count).map(|k| tail + step * k as f32));
        }
        samples
    }
}

#[system]
pub fn update_trail(#[resource] pose: &HeadPose, #[resource] trail: &mut Trail) {
    trail.insert(pose.position);
    trail.prune();
}
