//! Duel integration tests
//!
//! Whole battles driven through the public session API.

use std::cell::Cell;
use std::rc::Rc;

use bird_arena::battle::*;
use bird_arena::combat::*;
use bird_arena::core::types::Side;
use bird_arena::core::BattleConfig;
use rand::rngs::StdRng;

/// Active duel with both birds inside basic attack range
fn close_duel(player: Archetype, opponent: Archetype, config: BattleConfig) -> BattleSession {
    let mut session = BattleSession::new(player, opponent, &ArchetypeTable::builtin(), config)
        .expect("builtin table covers every archetype")
        .with_seed(2024);
    session.start_battle();
    session.player.x = 300.0;
    session.opponent.x = 360.0;
    session
}

/// Wraps the stock AI and counts how often the session consults it
struct CountingAi {
    inner: AiOpponent,
    calls: Rc<Cell<u32>>,
}

impl BattleAI for CountingAi {
    fn decide(
        &mut self,
        me: &Combatant,
        foe: &Combatant,
        delta: f32,
        rng: &mut StdRng,
    ) -> Option<AiAction> {
        self.calls.set(self.calls.get() + 1);
        self.inner.decide(me, foe, delta, rng)
    }

    fn personality(&self) -> &AiPersonality {
        self.inner.personality()
    }
}

#[test]
fn test_balanced_vs_power_basic_attack_race() {
    let mut duel = close_duel(Archetype::Balanced, Archetype::Power, BattleConfig::training());
    assert_eq!(duel.player.max_health, 100.0);
    assert_eq!(duel.opponent.max_health, 120.0);

    let mut balanced_hits = Vec::new();
    let mut power_hits = Vec::new();

    while !duel.player.is_dead() && !duel.opponent.is_dead() {
        if let ActionOutcome::Hit { damage } = duel.request_basic_attack(Side::Player) {
            balanced_hits.push(damage);
        }
        if duel.opponent.is_dead() {
            break;
        }
        if let ActionOutcome::Hit { damage } = duel.request_basic_attack(Side::Opponent) {
            power_hits.push(damage);
        }
    }

    // Balanced: 12 - 12 * 0.2 = 9.6, Power: 18 - 10 * 0.2 = 16 (+/-10%)
    for hit in &balanced_hits[..balanced_hits.len() - 1] {
        assert!(*hit >= 9.6 * 0.9 - 1e-3 && *hit <= 9.6 * 1.1 + 1e-3, "{}", hit);
    }
    for hit in &power_hits[..power_hits.len() - 1] {
        assert!(*hit >= 16.0 * 0.9 - 1e-3 && *hit <= 16.0 * 1.1 + 1e-3, "{}", hit);
    }

    assert!(duel.player.is_dead());
    assert!(duel.opponent.is_alive());
    // Even at max roll Balanced needs 120 / 10.56 -> 12 hits; Power got there first
    assert!(power_hits.len() < 12);
    assert!(power_hits.len() <= balanced_hits.len());

    duel.tick(0.016, &mut NoopObserver);
    assert_eq!(duel.result().map(|r| r.player_won), Some(false));
}

#[test]
fn test_trickster_stun_pauses_opponent_ai() {
    let mut duel = close_duel(Archetype::Trickster, Archetype::Balanced, BattleConfig::default());
    let calls = Rc::new(Cell::new(0));
    duel.set_opponent_ai(Some(Box::new(CountingAi {
        inner: AiOpponent::new(AiPersonality::default()),
        calls: Rc::clone(&calls),
    })));

    duel.tick(0.1, &mut NoopObserver);
    assert_eq!(calls.get(), 1);

    let outcome = duel.request_ability(Side::Player);
    assert!(matches!(outcome, ActionOutcome::AbilityTriggered { first_hit: Some(_) }));
    assert_eq!(duel.opponent.stun_remaining, 1.5);

    for _ in 0..14 {
        duel.tick(0.1, &mut NoopObserver);
        assert!(duel.opponent.is_stunned());
    }
    assert_eq!(calls.get(), 1, "AI must not run while stunned");

    for _ in 0..3 {
        duel.tick(0.1, &mut NoopObserver);
    }
    assert!(!duel.opponent.is_stunned());
    assert!(calls.get() > 1);
}

#[test]
fn test_flurry_total_within_noise() {
    let mut duel = close_duel(Archetype::Speed, Archetype::Balanced, BattleConfig::training());
    duel.request_ability(Side::Player);
    for _ in 0..30 {
        duel.tick(0.02, &mut NoopObserver);
    }

    // per hit: 6 - 10 * 0.2 = 4
    let expected = 5.0 * 4.0;
    assert!(duel.damage_dealt >= expected * 0.9 - 1e-3);
    assert!(duel.damage_dealt <= expected * 1.1 + 1e-3);
    assert_eq!(duel.pending_tasks(), 0);
}

#[test]
fn test_cooldown_counts_down_to_exactly_zero() {
    let mut duel = close_duel(Archetype::Tank, Archetype::Balanced, BattleConfig::training());
    duel.request_ability(Side::Player);
    assert_eq!(duel.player.ability_cooldown_remaining, 12.0);

    let mut last = duel.player.ability_cooldown_remaining;
    while last > 0.0 {
        duel.tick(0.3, &mut NoopObserver);
        let now = duel.player.ability_cooldown_remaining;
        assert!(now < last);
        assert!(now >= 0.0);
        last = now;
    }
    assert_eq!(duel.player.ability_cooldown_remaining, 0.0);
    assert!(!duel.request_ability(Side::Player).is_rejected());
}

#[test]
fn test_killing_blow_mid_flurry_voids_remaining_hits() {
    let mut duel = close_duel(Archetype::Speed, Archetype::Balanced, BattleConfig::training());
    duel.opponent.current_health = 5.0;

    duel.request_ability(Side::Player);
    for _ in 0..30 {
        duel.tick(0.02, &mut NoopObserver);
    }

    assert!(duel.opponent.is_dead());
    assert!(duel.is_finished());
    assert_eq!(duel.pending_tasks(), 0);
    assert!((duel.damage_dealt - 5.0).abs() < 1e-4);
    assert_eq!(duel.result().map(|r| r.player_won), Some(true));
}

#[test]
fn test_simultaneous_knockout_reports_defeat() {
    let mut duel = close_duel(Archetype::Balanced, Archetype::Balanced, BattleConfig::training());
    let mut log = BattleEventLog::new();
    duel.player.current_health = 0.0;
    duel.opponent.current_health = 0.0;

    for _ in 0..40 {
        duel.tick(0.1, &mut log);
    }
    let results = log.results();
    assert_eq!(results.len(), 1);
    assert!(!results[0].player_won);
}

#[test]
fn test_ai_vs_ai_duel_reports_exactly_once() {
    let mut session = BattleSession::new(
        Archetype::Power,
        Archetype::Trickster,
        &ArchetypeTable::builtin(),
        BattleConfig::default(),
    )
    .unwrap()
    .with_seed(77);
    session.set_player_ai(Some(Box::new(AiOpponent::new(AiPersonality::default()))));

    let mut log = BattleEventLog::new();
    let mut simulated = 0.0;
    while !session.result_reported() && simulated < 900.0 {
        session.tick(1.0 / 60.0, &mut log);
        simulated += 1.0 / 60.0;
    }

    assert!(session.result_reported(), "duel did not finish");
    for _ in 0..300 {
        session.tick(1.0 / 60.0, &mut log);
    }

    let results = log.results();
    assert_eq!(results.len(), 1);
    let result = results[0];

    let opponent_lost = session.opponent.max_health - session.opponent.current_health;
    let player_lost = session.player.max_health - session.player.current_health;
    assert!((result.damage_dealt - opponent_lost).abs() < 1e-2);
    assert!((result.damage_received - player_lost).abs() < 1e-2);
    assert_eq!(result.player_won, session.opponent.is_dead());
    assert!(result.elapsed > 0.0);

    let damage_total: f32 = log
        .damage_events()
        .iter()
        .filter(|(side, _)| *side == Side::Opponent)
        .map(|(_, amount)| amount)
        .sum();
    assert!((damage_total - result.damage_dealt).abs() < 1e-2);
}

#[test]
fn test_countdown_blocks_all_input() {
    let mut session = BattleSession::new(
        Archetype::Balanced,
        Archetype::Power,
        &ArchetypeTable::builtin(),
        BattleConfig::default(),
    )
    .unwrap()
    .with_seed(5);

    let start_x = session.opponent.x;
    for _ in 0..30 {
        session.tick(0.1, &mut NoopObserver);
        assert_eq!(session.phase, BattlePhase::Countdown);
        assert_eq!(
            session.request_ability(Side::Player),
            ActionOutcome::Rejected(RejectReason::NotActive)
        );
        assert_eq!(
            session.set_blocking(Side::Player, true),
            ActionOutcome::Rejected(RejectReason::NotActive)
        );
    }
    assert_eq!(session.opponent.x, start_x);
}

#[test]
fn test_block_cuts_incoming_damage() {
    let config = BattleConfig {
        damage_variance: 0.0,
        ..BattleConfig::training()
    };
    let mut duel = close_duel(Archetype::Balanced, Archetype::Power, config);

    let open = match duel.request_basic_attack(Side::Opponent) {
        ActionOutcome::Hit { damage } => damage,
        other => panic!("expected hit, got {:?}", other),
    };
    duel.set_blocking(Side::Player, true);
    let blocked = match duel.request_basic_attack(Side::Opponent) {
        ActionOutcome::Hit { damage } => damage,
        other => panic!("expected hit, got {:?}", other),
    };

    assert!((open - 16.0).abs() < 1e-4);
    assert!((blocked - 16.0 * 0.3).abs() < 1e-4);
}

#[test]
fn test_dead_combatant_cannot_act() {
    let mut duel = close_duel(Archetype::Balanced, Archetype::Power, BattleConfig::training());
    duel.player.current_health = 0.0;
    assert_eq!(
        duel.request_basic_attack(Side::Player),
        ActionOutcome::Rejected(RejectReason::ActorDead)
    );
    assert_eq!(
        duel.request_move(Side::Player, 1.0),
        ActionOutcome::Rejected(RejectReason::ActorDead)
    );
}
