use legion::*;
use nalgebra::Vector3;

use crate::{config::SnakeConfig, game_state::GameState, simulation::SimulationConfig};

/// Head position and heading. Yaw is in degrees, 0 facing +Z, growing
/// towards +X.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadPose {
    pub position: Vector3<f32>,
    pub yaw: f32,
}

impl HeadPose {
    pub fn new(position: Vector3<f32>, yaw: f32) -> Self {
        Self { position, yaw }
    }

    pub fn forward(&self) -> Vector3<f32> {
        let yaw = self.yaw.to_radians();
        Vector3::new(yaw.sin(), 0.0, yaw.cos())
    }
}

/// Player intent for the next tick. `jump` is consumed when read.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    /// -1 full left, 1 full right.
    pub turn: f32,
    pub jump: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadMotion {
    pub jumping: bool,
    pub jump_time: f32,
}

#[system]
pub fn advance_head(
    #[resource] pose: &mut HeadPose,
    #[resource] motion: &mut HeadMotion,
    #[resource] steering: &mut Steering,
    #[resource] config: &SnakeConfig,
    #[resource] game_state: &GameState,
    #[resource] simulation_config: &SimulationConfig,
) {
    if game_state.is_game_over() {
        return;
    }
    advance_head_pose(pose, motion, steering, config, simulation_config.time_delta);
    steering.jump = false;
}

/// Moves the head one step: jump arc, forward motion, then turning.
pub fn advance_head_pose(
    pose: &mut HeadPose,
    motion: &mut HeadMotion,
    steering: &Steering,
    config: &SnakeConfig,
    dt: f32,
) {
    if steering.jump && !motion.jumping {
        motion.jumping = true;
        motion.jump_time = 0.0;
    }

    let mut y = config.snake_base_y;
    if motion.jumping {
        motion.jump_time += dt;
        let t = (motion.jump_time / config.jump_duration).max(0.0).min(1.0);
        y = config.snake_base_y + config.jump_height * 4.0 * t * (1.0 - t);
        if motion.jump_time >= config.jump_duration {
            motion.jumping = false;
            motion.jump_time = 0.0;
        }
    }
    pose.position.y = y;

    pose.position += pose.forward() * (config.move_speed * dt);
    pose.yaw += steering.turn.max(-1.0).min(1.0) * config.turn_speed * dt;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_from_yaw() {
        assert!((HeadPose::new(Vector3::zeros(), 0.0).forward() - Vector3::z()).norm() < 1e-6);
        assert!((HeadPose::new(Vector3::zeros(), 90.0).forward() - Vector3::x()).norm() < 1e-6);
    }

    #[test]
    fn test_moves_forward_and_turns() {
        let config = SnakeConfig::default();
        let mut pose = HeadPose::new(Vector3::zeros(), 0.0);
        let mut motion = HeadMotion::default();
        let steering = Steering {
            turn: 0.5,
            jump: false,
        };
        advance_head_pose(&mut pose, &mut motion, &steering, &config, 0.1);
        assert!((pose.position - Vector3::new(0.0, 0.0, 0.5)).norm() < 1e-6);
        assert!((pose.yaw - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_jump_arc() {
        let config = SnakeConfig::default();
        let mut pose = HeadPose::new(Vector3::zeros(), 0.0);
        let mut motion = HeadMotion::default();
        let jump = Steering {
            turn: 0.0,
            jump: true,
        };
        advance_head_pose(&mut pose, &mut motion, &jump, &config, 0.3);
        // Halfway through a 0.6s jump: the apex.
        assert!((pose.position.y - 2.0).abs() < 1e-5);
        assert!(motion.jumping);

        let idle = Steering::default();
        advance_head_pose(&mut pose, &mut motion, &idle, &config, 0.3);
        assert!(pose.position.y.abs() < 1e-5);
        assert!(!motion.jumping);
    }
}
