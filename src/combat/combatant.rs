//! Combatant state for one side of a duel
//!
//! Built once per battle from archetype base stats, mutated every tick.

use serde::{Deserialize, Serialize};

use crate::combat::ability::Buff;
use crate::combat::archetype::{Archetype, BaseStats};
use crate::core::types::{Seconds, Side};

/// One bird's mutable battle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub archetype: Archetype,
    pub side: Side,

    // Vital stats
    pub max_health: f32,
    pub current_health: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,

    // Ability stats
    pub ability_cooldown_duration: Seconds,
    pub ability_damage: f32,
    pub ability_range: f32,
    /// 0.0 means ready
    pub ability_cooldown_remaining: Seconds,

    // Transient flags
    pub is_blocking: bool,
    /// Animation lock only, never checked by gameplay
    pub is_attacking: bool,
    pub stun_remaining: Seconds,

    /// Position along the arena floor
    pub x: f32,
    /// Requested move direction in [-1, 1]
    pub move_intent: f32,

    /// Buff flagged by an ability; carried but never applied to stats
    pub pending_buff: Option<Buff>,
}

impl Combatant {
    pub fn new(archetype: Archetype, side: Side, stats: &BaseStats, x: f32) -> Self {
        Self {
            archetype,
            side,
            max_health: stats.max_health,
            current_health: stats.max_health,
            attack: stats.attack,
            defense: stats.defense,
            speed: stats.speed,
            ability_cooldown_duration: stats.ability_cooldown,
            ability_damage: stats.ability_damage,
            ability_range: stats.ability_range,
            ability_cooldown_remaining: 0.0,
            is_blocking: false,
            is_attacking: false,
            stun_remaining: 0.0,
            x,
            move_intent: 0.0,
            pending_buff: None,
        }
    }

    /// Health as a fraction of max (0.0 to 1.0)
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.current_health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    pub fn ability_ready(&self) -> bool {
        self.ability_cooldown_remaining <= 0.0
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_remaining > 0.0
    }

    /// Distance along the arena floor to another combatant
    pub fn distance_to(&self, other: &Combatant) -> f32 {
        (self.x - other.x).abs()
    }

    /// Direction (-1.0 or 1.0) from this combatant toward another
    pub fn direction_to(&self, other: &Combatant) -> f32 {
        if other.x >= self.x {
            1.0
        } else {
            -1.0
        }
    }

    /// Remove health, never going below zero
    ///
    /// Returns the health actually lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.current_health;
        self.current_health = (self.current_health - amount.max(0.0)).max(0.0);
        before - self.current_health
    }

    /// Put the ability on cooldown
    pub fn start_cooldown(&mut self) {
        self.ability_cooldown_remaining = self.ability_cooldown_duration;
    }

    /// Apply a stun, keeping whichever of the old and new stun is longer
    pub fn apply_stun(&mut self, duration: Seconds) {
        self.stun_remaining = self.stun_remaining.max(duration);
    }

    pub fn set_move_intent(&mut self, direction: f32) {
        self.move_intent = direction.clamp(-1.0, 1.0);
    }

    /// Arena units moved per second at full intent
    pub fn move_speed(&self, scale: f32) -> f32 {
        self.speed * scale
    }
}
