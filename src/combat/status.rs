//! Per-combatant countdown timers (ability cooldown, stun)

use crate::combat::combatant::Combatant;
use crate::core::types::Seconds;

/// Timer transitions observed during one status tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusChange {
    pub ability_became_ready: bool,
    pub stun_expired: bool,
}

/// Count both timers down by `delta`, stopping at exactly zero
pub fn tick_status(combatant: &mut Combatant, delta: Seconds) -> StatusChange {
    let mut change = StatusChange::default();
    let delta = delta.max(0.0);

    if combatant.ability_cooldown_remaining > 0.0 {
        combatant.ability_cooldown_remaining =
            (combatant.ability_cooldown_remaining - delta).max(0.0);
        change.ability_became_ready = combatant.ability_cooldown_remaining == 0.0;
    }

    if combatant.stun_remaining > 0.0 {
        combatant.stun_remaining = (combatant.stun_remaining - delta).max(0.0);
        change.stun_expired = combatant.stun_remaining == 0.0;
    }

    change
}
