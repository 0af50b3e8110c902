//! Battle configuration with documented constants
//!
//! All formula and timing numbers used by the duel live here, so balance
//! passes touch one struct instead of the call sites.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::core::types::Seconds;

/// One entry of the pre-battle countdown ("3", "2", "1", "Fight!")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownStep {
    pub label: String,
    /// How long the label stays on screen (seconds)
    pub duration: Seconds,
}

impl CountdownStep {
    pub fn new(label: &str, duration: Seconds) -> Self {
        Self {
            label: label.to_string(),
            duration,
        }
    }
}

/// Configuration for a single duel
///
/// Values are tuned for a 800-unit wide arena where two birds start
/// 400 units apart, just outside the AI's "far" threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === DAMAGE ===
    /// Flat mitigation per point of defender defense
    ///
    /// Not a percentage: a defense of 10 always removes 2 damage.
    pub mitigation_factor: f32,

    /// Multiplier applied to post-mitigation damage while blocking
    ///
    /// At 0.3, a block removes 70% of what got through defense.
    pub block_multiplier: f32,

    /// Relative noise applied after the floor (0.1 = +/-10%)
    pub damage_variance: f32,

    /// Lowest possible damage before noise
    pub minimum_damage: f32,

    // === SPACE ===
    /// Max distance at which a basic attack connects
    pub attack_range: f32,

    /// Left arena wall
    pub arena_min_x: f32,

    /// Right arena wall
    pub arena_max_x: f32,

    pub player_start_x: f32,
    pub opponent_start_x: f32,

    /// Arena units per second contributed by each point of speed
    ///
    /// A speed of 10 at the default scale moves 150 units/s.
    pub move_speed_scale: f32,

    /// Distance a knockback hit pushes the target away from the caster
    pub knockback_distance: f32,

    // === TIMING ===
    /// Gap between consecutive hits of a multi-hit ability
    pub multi_hit_interval: Seconds,

    /// How long `is_attacking` stays set after a basic attack
    pub attack_lock_duration: Seconds,

    /// Scripted countdown shown before the fight starts
    pub countdown: Vec<CountdownStep>,

    /// Delay between the battle ending and the result being reported
    pub result_delay: Seconds,

    // === MODE ===
    /// Training mode: the opponent never acts on its own
    pub training_mode: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            mitigation_factor: 0.2,
            block_multiplier: 0.3,
            damage_variance: 0.1,
            minimum_damage: 1.0,

            attack_range: 120.0,
            arena_min_x: 0.0,
            arena_max_x: 800.0,
            player_start_x: 200.0,
            opponent_start_x: 600.0,
            move_speed_scale: 15.0,
            knockback_distance: 80.0,

            multi_hit_interval: 0.1,
            attack_lock_duration: 0.3,
            countdown: vec![
                CountdownStep::new("3", 1.0),
                CountdownStep::new("2", 1.0),
                CountdownStep::new("1", 1.0),
                CountdownStep::new("Fight!", 0.5),
            ],
            result_delay: 2.0,

            training_mode: false,
        }
    }
}

impl BattleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Training-mode variant of the defaults
    pub fn training() -> Self {
        Self {
            training_mode: true,
            ..Self::default()
        }
    }

    /// Total length of the countdown sequence
    pub fn countdown_duration(&self) -> Seconds {
        self.countdown.iter().map(|s| s.duration).sum()
    }

    /// Clamp an x coordinate into the arena
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.arena_min_x, self.arena_max_x)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.arena_min_x >= self.arena_max_x {
            return Err(ArenaError::InvalidConfig(format!(
                "arena_min_x ({}) must be < arena_max_x ({})",
                self.arena_min_x, self.arena_max_x
            )));
        }

        for (name, x) in [
            ("player_start_x", self.player_start_x),
            ("opponent_start_x", self.opponent_start_x),
        ] {
            if x < self.arena_min_x || x > self.arena_max_x {
                return Err(ArenaError::InvalidConfig(format!(
                    "{} ({}) lies outside the arena",
                    name, x
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.block_multiplier) {
            return Err(ArenaError::InvalidConfig(format!(
                "block_multiplier ({}) must be within [0, 1]",
                self.block_multiplier
            )));
        }

        if !(0.0..1.0).contains(&self.damage_variance) {
            return Err(ArenaError::InvalidConfig(format!(
                "damage_variance ({}) must be within [0, 1)",
                self.damage_variance
            )));
        }

        if self.mitigation_factor < 0.0 || self.minimum_damage < 0.0 {
            return Err(ArenaError::InvalidConfig(
                "mitigation_factor and minimum_damage must be non-negative".into(),
            ));
        }

        if self.attack_range <= 0.0 || self.move_speed_scale < 0.0 {
            return Err(ArenaError::InvalidConfig(
                "attack_range must be positive and move_speed_scale non-negative".into(),
            ));
        }

        if self.multi_hit_interval < 0.0
            || self.attack_lock_duration < 0.0
            || self.result_delay < 0.0
            || self.countdown.iter().any(|s| s.duration < 0.0)
        {
            return Err(ArenaError::InvalidConfig("Durations must be non-negative".into()));
        }

        Ok(())
    }

    /// Parse and validate a config from TOML text
    ///
    /// Missing keys fall back to the defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
