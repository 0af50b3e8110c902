//! Special abilities
//!
//! Each archetype maps to a profile function that builds a fresh
//! `AbilityEffect` every time the ability fires. New archetypes register a
//! profile instead of editing a match arm.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::archetype::Archetype;
use crate::combat::combatant::Combatant;
use crate::combat::constants::{FLURRY_HIT_COUNT, RALLY_BUFF_DURATION, TRICKSTER_STUN_DURATION};
use crate::combat::damage::{resolve_damage, HitKind};
use crate::core::config::BattleConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::Seconds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffKind {
    AttackBoost,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub kind: BuffKind,
    pub duration: Seconds,
}

/// What one ability activation does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityEffect {
    /// Pre-mitigation damage of each hit
    pub damage_per_hit: f32,
    /// Always at least 1
    pub hit_count: u32,
    /// Stun put on the target by a landed hit
    pub stun_duration: Seconds,
    pub applies_knockback: bool,
    /// Flagged on the caster, never applied
    pub buff: Option<Buff>,
    /// Max distance at which a hit connects
    pub range: f32,
}

impl AbilityEffect {
    /// Plain single hit with the user's ability damage and range
    pub fn single_hit(user: &Combatant) -> Self {
        Self {
            damage_per_hit: user.ability_damage,
            hit_count: 1,
            stun_duration: 0.0,
            applies_knockback: false,
            buff: None,
            range: user.ability_range,
        }
    }

    pub fn is_multi_hit(&self) -> bool {
        self.hit_count > 1
    }
}

/// Builds the effect for one activation from the user's current state
pub type AbilityProfile = fn(&Combatant) -> AbilityEffect;

fn rallying_cry(user: &Combatant) -> AbilityEffect {
    AbilityEffect {
        buff: Some(Buff {
            kind: BuffKind::AttackBoost,
            duration: RALLY_BUFF_DURATION,
        }),
        ..AbilityEffect::single_hit(user)
    }
}

fn peck_flurry(user: &Combatant) -> AbilityEffect {
    AbilityEffect {
        hit_count: FLURRY_HIT_COUNT,
        ..AbilityEffect::single_hit(user)
    }
}

fn talon_slam(user: &Combatant) -> AbilityEffect {
    AbilityEffect {
        applies_knockback: true,
        ..AbilityEffect::single_hit(user)
    }
}

fn dazzle(user: &Combatant) -> AbilityEffect {
    AbilityEffect {
        stun_duration: TRICKSTER_STUN_DURATION,
        ..AbilityEffect::single_hit(user)
    }
}

fn belly_bump(user: &Combatant) -> AbilityEffect {
    AbilityEffect {
        applies_knockback: true,
        ..AbilityEffect::single_hit(user)
    }
}

/// Archetype -> ability profile lookup
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    profiles: AHashMap<Archetype, AbilityProfile>,
}

impl AbilityRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the five stock abilities
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Archetype::Balanced, rallying_cry);
        registry.register(Archetype::Speed, peck_flurry);
        registry.register(Archetype::Power, talon_slam);
        registry.register(Archetype::Trickster, dazzle);
        registry.register(Archetype::Tank, belly_bump);
        registry
    }

    pub fn register(&mut self, archetype: Archetype, profile: AbilityProfile) {
        self.profiles.insert(archetype, profile);
    }

    pub fn contains(&self, archetype: Archetype) -> bool {
        self.profiles.contains_key(&archetype)
    }

    /// Build the effect for `user`'s ability
    pub fn resolve(&self, archetype: Archetype, user: &Combatant) -> Result<AbilityEffect> {
        let profile = self
            .profiles
            .get(&archetype)
            .ok_or(ArenaError::UnknownArchetype(archetype))?;
        let mut effect = profile(user);
        effect.hit_count = effect.hit_count.max(1);
        Ok(effect)
    }
}

/// Result of one landed ability hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityHit {
    /// Health the target actually lost
    pub damage_applied: f32,
    pub stun_applied: Seconds,
    pub knocked_back: bool,
}

/// Apply a single hit of an ability to the target
///
/// Returns `None` when the hit is out of range; the caller has already
/// paid the cooldown either way.
pub fn apply_ability_hit(
    effect: &AbilityEffect,
    caster_x: f32,
    target: &mut Combatant,
    in_range: bool,
    config: &BattleConfig,
    rng: &mut impl Rng,
) -> Option<AbilityHit> {
    if !in_range {
        return None;
    }

    let damage = resolve_damage(
        0.0,
        effect.damage_per_hit,
        target.defense,
        target.is_blocking,
        HitKind::Ability,
        config,
        rng,
    );
    let damage_applied = target.take_damage(damage);

    if effect.stun_duration > 0.0 {
        target.apply_stun(effect.stun_duration);
    }

    if effect.applies_knockback {
        let away = if target.x >= caster_x { 1.0 } else { -1.0 };
        target.x = config.clamp_x(target.x + away * config.knockback_distance);
    }

    Some(AbilityHit {
        damage_applied,
        stun_applied: effect.stun_duration,
        knocked_back: effect.applies_knockback,
    })
}

/// Apply every hit of an effect back to back, without stagger
///
/// `in_range` is re-checked before each hit since knockback can move the
/// target. Returns total health removed.
pub fn apply_ability_effect(
    effect: &AbilityEffect,
    caster_x: f32,
    target: &mut Combatant,
    mut in_range: impl FnMut(&Combatant) -> bool,
    config: &BattleConfig,
    rng: &mut impl Rng,
) -> f32 {
    let mut total = 0.0;
    for _ in 0..effect.hit_count.max(1) {
        let reachable = in_range(target);
        if let Some(hit) = apply_ability_hit(effect, caster_x, target, reachable, config, rng) {
            total += hit.damage_applied;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::archetype::ArchetypeTable;
    use crate::core::types::Side;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bird(archetype: Archetype, side: Side, x: f32) -> Combatant {
        let table = ArchetypeTable::builtin();
        Combatant::new(archetype, side, table.get(archetype).unwrap(), x)
    }

    fn no_noise() -> BattleConfig {
        BattleConfig {
            damage_variance: 0.0,
            ..BattleConfig::default()
        }
    }

    #[test]
    fn test_default_profiles() {
        let registry = AbilityRegistry::with_defaults();

        let robin = bird(Archetype::Balanced, Side::Player, 0.0);
        let effect = registry.resolve(Archetype::Balanced, &robin).unwrap();
        assert_eq!(effect.hit_count, 1);
        assert_eq!(effect.damage_per_hit, robin.ability_damage);
        assert_eq!(effect.buff.map(|b| b.kind), Some(BuffKind::AttackBoost));

        let hummer = bird(Archetype::Speed, Side::Player, 0.0);
        let effect = registry.resolve(Archetype::Speed, &hummer).unwrap();
        assert_eq!(effect.hit_count, 5);
        assert!(effect.is_multi_hit());

        let eagle = bird(Archetype::Power, Side::Player, 0.0);
        assert!(registry.resolve(Archetype::Power, &eagle).unwrap().applies_knockback);

        let crow = bird(Archetype::Trickster, Side::Player, 0.0);
        let effect = registry.resolve(Archetype::Trickster, &crow).unwrap();
        assert_eq!(effect.stun_duration, 1.5);
        assert!(!effect.applies_knockback);

        let pelican = bird(Archetype::Tank, Side::Player, 0.0);
        assert!(registry.resolve(Archetype::Tank, &pelican).unwrap().applies_knockback);
    }

    #[test]
    fn test_unregistered_archetype_is_error() {
        let registry = AbilityRegistry::new();
        let robin = bird(Archetype::Balanced, Side::Player, 0.0);
        assert!(matches!(
            registry.resolve(Archetype::Balanced, &robin),
            Err(ArenaError::UnknownArchetype(Archetype::Balanced))
        ));
    }

    #[test]
    fn test_registered_profile_is_additive() {
        fn double_tap(user: &Combatant) -> AbilityEffect {
            AbilityEffect {
                hit_count: 2,
                ..AbilityEffect::single_hit(user)
            }
        }
        let mut registry = AbilityRegistry::with_defaults();
        registry.register(Archetype::Balanced, double_tap);
        let robin = bird(Archetype::Balanced, Side::Player, 0.0);
        assert_eq!(registry.resolve(Archetype::Balanced, &robin).unwrap().hit_count, 2);
        assert!(registry.contains(Archetype::Tank));
    }

    #[test]
    fn test_out_of_range_hit_skipped() {
        let config = no_noise();
        let mut rng = StdRng::seed_from_u64(1);
        let eagle = bird(Archetype::Power, Side::Player, 100.0);
        let mut target = bird(Archetype::Balanced, Side::Opponent, 600.0);
        let effect = AbilityEffect::single_hit(&eagle);

        let hit = apply_ability_hit(&effect, eagle.x, &mut target, false, &config, &mut rng);
        assert!(hit.is_none());
        assert_eq!(target.current_health, target.max_health);
    }

    #[test]
    fn test_stun_hit_sets_target_stun() {
        let config = no_noise();
        let mut rng = StdRng::seed_from_u64(1);
        let crow = bird(Archetype::Trickster, Side::Player, 100.0);
        let mut target = bird(Archetype::Balanced, Side::Opponent, 180.0);
        let effect = AbilityRegistry::with_defaults()
            .resolve(Archetype::Trickster, &crow)
            .unwrap();

        let hit = apply_ability_hit(&effect, crow.x, &mut target, true, &config, &mut rng)
            .expect("in range");
        assert_eq!(target.stun_remaining, 1.5);
        // 15 - 10 * 0.2 = 13
        assert!((hit.damage_applied - 13.0).abs() < 1e-4);
    }

    #[test]
    fn test_knockback_pushes_away_and_clamps() {
        let config = no_noise();
        let mut rng = StdRng::seed_from_u64(1);
        let eagle = bird(Archetype::Power, Side::Player, 700.0);
        let mut target = bird(Archetype::Balanced, Side::Opponent, 760.0);
        let effect = AbilityEffect {
            applies_knockback: true,
            ..AbilityEffect::single_hit(&eagle)
        };

        apply_ability_hit(&effect, eagle.x, &mut target, true, &config, &mut rng);
        assert_eq!(target.x, config.arena_max_x);

        let mut left = bird(Archetype::Balanced, Side::Opponent, 650.0);
        apply_ability_hit(&effect, eagle.x, &mut left, true, &config, &mut rng);
        assert_eq!(left.x, 650.0 - config.knockback_distance);
    }

    #[test]
    fn test_full_flurry_deals_five_hits() {
        let config = no_noise();
        let mut rng = StdRng::seed_from_u64(9);
        let hummer = bird(Archetype::Speed, Side::Player, 100.0);
        let mut target = bird(Archetype::Tank, Side::Opponent, 150.0);
        let effect = AbilityRegistry::with_defaults()
            .resolve(Archetype::Speed, &hummer)
            .unwrap();

        let total = apply_ability_effect(&effect, hummer.x, &mut target, |_| true, &config, &mut rng);
        // per hit: max(1, 6 - 18 * 0.2) = 2.4
        assert!((total - 5.0 * 2.4).abs() < 1e-3);
    }

    #[test]
    fn test_partial_flurry_counts_only_landed_hits() {
        let config = no_noise();
        let mut rng = StdRng::seed_from_u64(9);
        let hummer = bird(Archetype::Speed, Side::Player, 100.0);
        let mut target = bird(Archetype::Tank, Side::Opponent, 150.0);
        let effect = AbilityRegistry::with_defaults()
            .resolve(Archetype::Speed, &hummer)
            .unwrap();

        let mut checks = 0;
        let total = apply_ability_effect(
            &effect,
            hummer.x,
            &mut target,
            |_| {
                checks += 1;
                checks <= 2
            },
            &config,
            &mut rng,
        );
        assert!((total - 2.0 * 2.4).abs() < 1e-3);
    }
}
