use super::boundary::{Boundaries, Boundary, HeadVolume};
use crate::{
    advance::HeadPose,
    config::SnakeConfig,
    game_state::GameState,
    trail::{planar_distance, Trail},
};
use legion::system;
use log::debug;
use nalgebra::Vector3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    /// The head touched the trail sample at `index`.
    SelfCollision { index: usize },
    Boundary,
}

/// Self and boundary collision checks against the trail.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionDetector {
    ignore_head_points: usize,
    self_collision_threshold: f32,
    jump_y_threshold: f32,
    base_y: f32,
    head_size: f32,
}

impl CollisionDetector {
    pub fn new(config: &SnakeConfig) -> Self {
        Self {
            ignore_head_points: config.ignore_head_points,
            self_collision_threshold: config.self_collision_threshold,
            jump_y_threshold: config.jump_y_threshold,
            base_y: config.snake_base_y,
            head_size: config.head_size,
        }
    }

    pub fn head_volume(&self, pose: &HeadPose) -> HeadVolume {
        HeadVolume::cube(pose.position, pose.forward(), self.head_size)
    }

    /// Whether the head at `head` touches `sample`. A head high enough above
    /// (or below) the sample passes it.
    pub fn touches(&self, head: &Vector3<f32>, sample: &Vector3<f32>) -> bool {
        let vertical = ((head.y - self.base_y) - (sample.y - self.base_y)).abs();
        planar_distance(head, sample) < self.self_collision_threshold
            && vertical < self.jump_y_threshold
    }

    /// Index of the first sample past the ignored head region the head
    /// touches.
    pub fn self_collision(
        &self,
        head: &Vector3<f32>,
        positions: &[Vector3<f32>],
    ) -> Option<usize> {
        positions
            .iter()
            .enumerate()
            .skip(self.ignore_head_points)
            .find(|(_, sample)| self.touches(head, sample))
            .map(|(index, _)| index)
    }

    /// No registered boundary means no boundary collision.
    pub fn boundary_collision(
        &self,
        volume: &HeadVolume,
        boundary: Option<&dyn Boundary>,
    ) -> bool {
        boundary.map_or(false, |b| b.overlaps(volume))
    }

    /// Runs both checks and latches a game over on the first hit. Does nothing
    /// once the game is already over.
    pub fn check(
        &self,
        volume: &HeadVolume,
        positions: &[Vector3<f32>],
        boundary: Option<&dyn Boundary>,
        game_state: &mut GameState,
    ) -> Option<Collision> {
        if game_state.is_game_over() {
            return None;
        }
        let collision = match self.self_collision(&volume.center, positions) {
            Some(index) => Some(Collision::SelfCollision { index }),
            None if self.boundary_collision(volume, boundary) => Some(Collision::Boundary),
            None => None,
        };
        if let Some(collision) = collision {
            debug!("Collision {:?} at {:?}", collision, volume.center);
            game_state.signal_game_over(collision);
        }
        collision
    }
}

#[system]
pub fn check_collisions(
    #[resource] pose: &HeadPose,
    #[resource] trail: &Trail,
    #[resource] detector: &CollisionDetector,
    #[resource] boundaries: &Boundaries,
    #[resource] game_state: &mut GameState,
) {
    let volume = detector.head_volume(pose);
    detector.check(&volume, trail.positions(), boundaries.get(), game_state);
}
