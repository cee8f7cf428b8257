use crate::{config::SnakeConfig, trail::Trail};
use legion::system;
use log::info;
use std::collections::VecDeque;

/// Queues grow requests and applies them to the trail in arrival order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrowthController {
    pending: VecDeque<i32>,
    grow_count: i32,
}

impl GrowthController {
    pub fn new(config: &SnakeConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            grow_count: config.grow_count,
        }
    }

    pub fn push(&mut self, count: i32) {
        self.pending.push_back(count);
    }

    pub fn food_eaten(&mut self) {
        self.push(self.grow_count);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Forwards every queued request to `Trail::grow`. Returns how many were
    /// applied.
    pub fn apply(&mut self, trail: &mut Trail) -> usize {
        let applied = self.pending.len();
        for count in self.pending.drain(..) {
            trail.grow(count);
        }
        if applied > 0 {
            info!(
                "Applied {} grow events, target length {}",
                applied,
                trail.current_length()
            );
        }
        applied
    }
}

#[system]
pub fn apply_growth(#[resource] growth: &mut GrowthController, #[resource] trail: &mut Trail) {
    growth.apply(trail);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_events_apply_in_order() {
        let mut trail = Trail::from_positions(vec![Vector3::zeros(), Vector3::z()], 0.2);
        let mut growth = GrowthController::new(&SnakeConfig::default());
        growth.food_eaten();
        growth.push(-4);
        growth.push(2);
        assert_eq!(growth.pending(), 3);
        assert_eq!(growth.apply(&mut trail), 3);
        assert_eq!(growth.pending(), 0);
        assert_eq!(trail.current_length(), 2 + 5 + 2);
        assert_eq!(trail.len(), 9);
        assert!(trail.positions()[2..].iter().all(|p| *p == Vector3::z()));
    }

    #[test]
    fn test_apply_without_events() {
        let mut trail = Trail::from_positions(vec![Vector3::zeros(), Vector3::z()], 0.2);
        let mut growth = GrowthController::default();
        assert_eq!(growth.apply(&mut trail), 0);
        assert_eq!(trail.len(), 2);
    }
}
