//! Combat core - combatant state and the formulas that mutate it
//!
//! Everything here is tick-agnostic: the battle session decides when
//! these run, these functions decide what happens.

pub mod ability;
pub mod archetype;
pub mod combatant;
pub mod constants;
pub mod damage;
pub mod status;

pub use ability::{
    apply_ability_effect, apply_ability_hit, AbilityEffect, AbilityHit, AbilityProfile,
    AbilityRegistry, Buff, BuffKind,
};
pub use archetype::{Archetype, ArchetypeTable, BaseStats};
pub use combatant::Combatant;
pub use damage::{mitigated_damage, resolve_damage, resolve_hit, HitKind};
pub use status::{tick_status, StatusChange};
