//! AI Opponent - scripted duel AI
//!
//! Thinks on a jittered interval, then picks an action from the distance
//! band the foe is in.

use rand::rngs::StdRng;
use rand::Rng;

use crate::battle::ai::personality::AiPersonality;
use crate::battle::ai::{AiAction, BattleAI};
use crate::combat::Combatant;
use crate::core::types::Seconds;

/// Stock opponent implementing BattleAI
#[derive(Debug, Clone)]
pub struct AiOpponent {
    personality: AiPersonality,
    think_timer: Seconds,
    /// Drawn from the think window on the first `decide`
    think_threshold: Option<Seconds>,
    action_cooldown: Seconds,
}

impl AiOpponent {
    pub fn new(personality: AiPersonality) -> Self {
        Self {
            personality,
            think_timer: 0.0,
            think_threshold: None,
            action_cooldown: 0.0,
        }
    }

    /// Current think interval, `None` before the first tick
    pub fn think_threshold(&self) -> Option<Seconds> {
        self.think_threshold
    }

    pub fn action_cooldown(&self) -> Seconds {
        self.action_cooldown
    }

    fn redraw_threshold(&mut self, rng: &mut StdRng) -> Seconds {
        let timing = &self.personality.timing;
        let threshold = if timing.think_max > timing.think_min {
            rng.gen_range(timing.think_min..=timing.think_max)
        } else {
            timing.think_min
        };
        self.think_threshold = Some(threshold);
        threshold
    }

    /// Pick an action for the current distance band
    fn choose(&self, me: &Combatant, distance: f32, rng: &mut StdRng) -> (AiAction, Seconds) {
        let ranges = &self.personality.ranges;
        let weights = &self.personality.weights;
        let cooldowns = &self.personality.cooldowns;

        if distance > ranges.far_distance {
            return (AiAction::Approach, cooldowns.approach);
        }

        if distance < ranges.close_distance {
            let mut roll = rng.gen::<f32>() * weights.close_total();

            if roll < weights.close_attack {
                return (AiAction::Attack, cooldowns.attack);
            }
            roll -= weights.close_attack;

            if roll < weights.close_ability {
                return if me.ability_ready() {
                    (AiAction::UseAbility, cooldowns.ability)
                } else {
                    (AiAction::Attack, cooldowns.attack)
                };
            }
            roll -= weights.close_ability;

            if roll < weights.close_block {
                let hold = self.personality.timing.block_hold;
                return (AiAction::Block { hold }, cooldowns.block);
            }

            let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            return (AiAction::Reposition { direction }, cooldowns.reposition);
        }

        if rng.gen::<f32>() < weights.medium_move {
            (AiAction::Approach, cooldowns.medium)
        } else {
            (AiAction::Attack, cooldowns.medium)
        }
    }
}

impl BattleAI for AiOpponent {
    fn decide(
        &mut self,
        me: &Combatant,
        foe: &Combatant,
        delta: Seconds,
        rng: &mut StdRng,
    ) -> Option<AiAction> {
        if me.is_dead() || me.is_stunned() {
            return None;
        }

        let threshold = match self.think_threshold {
            Some(threshold) => threshold,
            None => self.redraw_threshold(rng),
        };

        self.think_timer += delta;
        self.action_cooldown = (self.action_cooldown - delta).max(0.0);

        if self.think_timer < threshold || self.action_cooldown > 0.0 {
            return None;
        }

        self.think_timer = 0.0;
        self.redraw_threshold(rng);

        let distance = me.distance_to(foe);
        let (action, cooldown) = self.choose(me, distance, rng);
        self.action_cooldown = cooldown;

        tracing::debug!(
            side = ?me.side,
            distance,
            ?action,
            "AI decision"
        );
        Some(action)
    }

    fn personality(&self) -> &AiPersonality {
        &self.personality
    }
}
