//! Outbound battle events
//!
//! Rendering, audio and reward layers implement `BattleObserver`; the
//! session calls it once per event, in the order events occurred.

use serde::{Deserialize, Serialize};

use crate::combat::{Archetype, HitKind};
use crate::core::types::{Seconds, SessionId, Side};

/// End-of-battle report handed to the results collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResult {
    pub session_id: SessionId,
    pub player_won: bool,
    /// Seconds spent in the Active phase
    pub elapsed: Seconds,
    /// Health removed from the opponent
    pub damage_dealt: f32,
    /// Health removed from the player
    pub damage_received: f32,
    pub player_archetype: Archetype,
    pub opponent_archetype: Archetype,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    CountdownStep {
        label: String,
    },
    BattleStarted,
    DamageApplied {
        target: Side,
        amount: f32,
        is_critical: bool,
        source: HitKind,
    },
    AbilityTriggered {
        side: Side,
        archetype: Archetype,
    },
    BattleEnded {
        result: BattleResult,
    },
}

/// One entry in the battle log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    /// Active-phase clock when the event happened (0.0 during countdown)
    pub time: Seconds,
    pub event_type: BattleEventType,
    pub description: String,
}

/// Subscriber for battle events; every method defaults to a no-op
pub trait BattleObserver {
    fn on_countdown(&mut self, _label: &str) {}

    fn on_battle_started(&mut self) {}

    fn on_damage_applied(&mut self, _target: Side, _amount: f32, _is_critical: bool) {}

    fn on_ability_triggered(&mut self, _side: Side, _archetype: Archetype) {}

    fn on_battle_ended(&mut self, _result: &BattleResult) {}

    /// Raw event hook, called before the typed method
    fn on_event(&mut self, _event: &BattleEvent) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BattleObserver for NoopObserver {}

/// Route one event to the matching observer method
pub fn dispatch(event: &BattleEvent, observer: &mut dyn BattleObserver) {
    observer.on_event(event);
    match &event.event_type {
        BattleEventType::CountdownStep { label } => observer.on_countdown(label),
        BattleEventType::BattleStarted => observer.on_battle_started(),
        BattleEventType::DamageApplied {
            target,
            amount,
            is_critical,
            ..
        } => observer.on_damage_applied(*target, *amount, *is_critical),
        BattleEventType::AbilityTriggered { side, archetype } => {
            observer.on_ability_triggered(*side, *archetype)
        }
        BattleEventType::BattleEnded { result } => observer.on_battle_ended(result),
    }
}

/// Observer that records every event it receives
#[derive(Debug, Clone, Default)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every damage event, as (target, amount)
    pub fn damage_events(&self) -> Vec<(Side, f32)> {
        self.events
            .iter()
            .filter_map(|e| match e.event_type {
                BattleEventType::DamageApplied { target, amount, .. } => Some((target, amount)),
                _ => None,
            })
            .collect()
    }

    /// Every delivered battle result
    pub fn results(&self) -> Vec<&BattleResult> {
        self.events
            .iter()
            .filter_map(|e| match &e.event_type {
                BattleEventType::BattleEnded { result } => Some(result),
                _ => None,
            })
            .collect()
    }

    pub fn countdown_labels(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match &e.event_type {
                BattleEventType::CountdownStep { label } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl BattleObserver for BattleEventLog {
    fn on_event(&mut self, event: &BattleEvent) {
        self.events.push(event.clone());
    }
}
