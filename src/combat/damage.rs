//! Damage resolution
//!
//! One canonical formula for every hit, basic or ability:
//!
//! ```text
//! base      = ability ? ability_damage : attack
//! mitigated = base - defense * mitigation_factor
//! blocked   = mitigated * (blocking ? block_multiplier : 1.0)
//! floored   = max(minimum_damage, blocked)
//! final     = floored * (1 + uniform(-variance, +variance))
//! ```
//!
//! The floor is applied before noise and not re-applied after, so a
//! floored hit can land slightly under `minimum_damage`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::core::config::BattleConfig;

/// Which base stat feeds a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    Basic,
    Ability,
}

/// Damage before variance
pub fn mitigated_damage(
    attacker_attack: f32,
    attacker_ability_damage: f32,
    defender_defense: f32,
    defender_is_blocking: bool,
    kind: HitKind,
    config: &BattleConfig,
) -> f32 {
    let base = match kind {
        HitKind::Basic => attacker_attack,
        HitKind::Ability => attacker_ability_damage,
    };
    let mitigation = defender_defense * config.mitigation_factor;
    let block = if defender_is_blocking {
        config.block_multiplier
    } else {
        1.0
    };

    ((base - mitigation) * block).max(config.minimum_damage)
}

/// Final damage for one hit, including variance
pub fn resolve_damage(
    attacker_attack: f32,
    attacker_ability_damage: f32,
    defender_defense: f32,
    defender_is_blocking: bool,
    kind: HitKind,
    config: &BattleConfig,
    rng: &mut impl Rng,
) -> f32 {
    let floored = mitigated_damage(
        attacker_attack,
        attacker_ability_damage,
        defender_defense,
        defender_is_blocking,
        kind,
        config,
    );

    if config.damage_variance <= 0.0 {
        return floored;
    }
    let noise = rng.gen_range(-config.damage_variance..=config.damage_variance);
    floored * (1.0 + noise)
}

/// Resolve a hit from one combatant against another's current state
pub fn resolve_hit(
    attacker: &Combatant,
    defender: &Combatant,
    kind: HitKind,
    config: &BattleConfig,
    rng: &mut impl Rng,
) -> f32 {
    resolve_damage(
        attacker.attack,
        attacker.ability_damage,
        defender.defense,
        defender.is_blocking,
        kind,
        config,
        rng,
    )
}
