//! Opponent AI for duels
//!
//! Architecture: Trait + Data hybrid
//! - BattleAI trait defines interface for swappable implementations
//! - AiPersonality struct holds TOML-loaded timings and weights
//! - AiOpponent is the stock scripted opponent

mod opponent;
mod personality;

pub use opponent::AiOpponent;
pub use personality::{
    load_personality, AiPersonality, CooldownConfig, RangeConfig, TimingConfig, WeightConfig,
};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::combat::Combatant;
use crate::core::types::Seconds;

/// Something an AI asks its combatant to do
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AiAction {
    /// Walk toward the foe
    Approach,
    Attack,
    UseAbility,
    /// Raise guard, dropping it again after `hold` seconds
    Block { hold: Seconds },
    /// Walk in a random direction (-1.0 or 1.0)
    Reposition { direction: f32 },
}

/// Trait for duel AI implementations
pub trait BattleAI {
    /// Advance the AI by one tick, maybe producing an action
    ///
    /// The session borrows its single RNG to the AI for the call.
    fn decide(
        &mut self,
        me: &Combatant,
        foe: &Combatant,
        delta: Seconds,
        rng: &mut StdRng,
    ) -> Option<AiAction>;

    /// Get the personality configuration
    fn personality(&self) -> &AiPersonality;
}
