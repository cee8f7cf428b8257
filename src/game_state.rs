use crate::collision::Collision;
use log::info;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Running,
    GameOver { cause: Collision },
}

/// Game-wide state read by the core and escalated only through
/// `signal_game_over`.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    phase: Phase,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: Phase::Running,
        }
    }
}

impl GameState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    pub fn cause(&self) -> Option<Collision> {
        match self.phase {
            Phase::GameOver { cause } => Some(cause),
            Phase::Running => None,
        }
    }

    /// Latches the game over. Later signals are ignored and return `false`.
    pub fn signal_game_over(&mut self, cause: Collision) -> bool {
        if self.is_game_over() {
            return false;
        }
        info!("Game over: {:?}", cause);
        self.phase = Phase::GameOver { cause };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_over_is_latched() {
        let mut state = GameState::default();
        assert!(!state.is_game_over());
        assert!(state.signal_game_over(Collision::Boundary));
        assert!(!state.signal_game_over(Collision::SelfCollision { index: 12 }));
        assert_eq!(state.cause(), Some(Collision::Boundary));
    }
}
