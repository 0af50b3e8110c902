//! AI personality configuration loaded from TOML
//!
//! Personalities hold the opponent's think rhythm, distance bands, action
//! weights and per-action cooldowns.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::core::types::Seconds;

/// Think rhythm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Shortest think interval
    pub think_min: Seconds,
    /// Longest think interval (redrawn uniformly after each decision)
    pub think_max: Seconds,
    /// How long a block is held before auto-release
    pub block_hold: Seconds,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            think_min: 0.3,
            think_max: 0.7,
            block_hold: 0.5,
        }
    }
}

/// Distance bands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Beyond this the AI only closes distance
    pub far_distance: f32,
    /// Inside this the AI fights
    pub close_distance: f32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            far_distance: 200.0,
            close_distance: 150.0,
        }
    }
}

/// Decision weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightConfig {
    pub close_attack: f32,
    /// Falls through to attack while the ability is on cooldown
    pub close_ability: f32,
    pub close_block: f32,
    pub close_reposition: f32,
    /// Chance to approach (vs. attack) in the medium band
    pub medium_move: f32,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            close_attack: 0.5,
            close_ability: 0.2,
            close_block: 0.15,
            close_reposition: 0.15,
            medium_move: 0.7,
        }
    }
}

impl WeightConfig {
    pub fn close_total(&self) -> f32 {
        self.close_attack + self.close_ability + self.close_block + self.close_reposition
    }
}

/// Delay before the AI may decide again, per chosen action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    pub approach: Seconds,
    pub medium: Seconds,
    pub attack: Seconds,
    pub ability: Seconds,
    pub block: Seconds,
    pub reposition: Seconds,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            approach: 0.2,
            medium: 0.3,
            attack: 0.5,
            ability: 1.0,
            block: 0.6,
            reposition: 0.3,
        }
    }
}

/// Complete AI personality configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiPersonality {
    /// Name of this personality (set from filename)
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub ranges: RangeConfig,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub cooldowns: CooldownConfig,
}

impl Default for AiPersonality {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            timing: TimingConfig::default(),
            ranges: RangeConfig::default(),
            weights: WeightConfig::default(),
            cooldowns: CooldownConfig::default(),
        }
    }
}

impl AiPersonality {
    pub fn validate(&self) -> Result<()> {
        if self.timing.think_min < 0.0 || self.timing.think_min > self.timing.think_max {
            return Err(ArenaError::InvalidConfig(format!(
                "think window [{}, {}] is not ordered",
                self.timing.think_min, self.timing.think_max
            )));
        }
        if self.timing.block_hold < 0.0 {
            return Err(ArenaError::InvalidConfig(format!(
                "block_hold ({}) must be non-negative",
                self.timing.block_hold
            )));
        }
        let c = &self.cooldowns;
        if [c.approach, c.medium, c.attack, c.ability, c.block, c.reposition]
            .iter()
            .any(|v| *v < 0.0)
        {
            return Err(ArenaError::InvalidConfig(
                "action cooldowns must be non-negative".into(),
            ));
        }
        if self.ranges.close_distance > self.ranges.far_distance {
            return Err(ArenaError::InvalidConfig(format!(
                "close_distance ({}) should be <= far_distance ({})",
                self.ranges.close_distance, self.ranges.far_distance
            )));
        }
        let w = &self.weights;
        if [w.close_attack, w.close_ability, w.close_block, w.close_reposition]
            .iter()
            .any(|v| *v < 0.0)
            || w.close_total() <= 0.0
        {
            return Err(ArenaError::InvalidConfig(
                "close-range weights must be non-negative with a positive sum".into(),
            ));
        }
        if !(0.0..=1.0).contains(&w.medium_move) {
            return Err(ArenaError::InvalidConfig(format!(
                "medium_move ({}) must be within [0, 1]",
                w.medium_move
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let personality: AiPersonality = toml::from_str(contents)?;
        personality.validate()?;
        Ok(personality)
    }
}

/// Load personality from TOML file
///
/// Loads from `data/ai_personalities/{name}.toml`
pub fn load_personality(name: &str) -> Result<AiPersonality> {
    let path = personality_path(name);
    let contents = fs::read_to_string(&path)?;
    let mut personality = AiPersonality::from_toml_str(&contents)?;
    personality.name = name.to_string();
    Ok(personality)
}

fn personality_path(name: &str) -> PathBuf {
    PathBuf::from("data/ai_personalities").join(format!("{}.toml", name))
}
