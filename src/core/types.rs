//! Core type definitions shared by combat and battle code

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simulation time in seconds
pub type Seconds = f32;

/// Unique identifier for a battle session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of the duel a combatant fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Player.opposite(), Side::Opponent);
        assert_eq!(Side::Opponent.opposite(), Side::Player);
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
