//! Battle session - lifecycle state machine for one duel
//!
//! Countdown -> Active -> Ended. Each Active tick runs, in order:
//! status timers and movement -> due scheduled tasks -> AI -> win check.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::battle::ai::{AiAction, AiOpponent, AiPersonality, BattleAI};
use crate::battle::events::{
    dispatch, BattleEvent, BattleEventType, BattleObserver, BattleResult,
};
use crate::battle::scheduler::{ScheduledTask, TaskId, TaskScheduler};
use crate::combat::{
    apply_ability_hit, resolve_hit, tick_status, AbilityEffect, AbilityRegistry, Archetype,
    ArchetypeTable, Combatant, HitKind,
};
use crate::core::config::BattleConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{Seconds, SessionId, Side};

/// Battle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Countdown,
    Active,
    Ended,
}

/// Why an inbound request had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    NotActive,
    ActorDead,
    Stunned,
    OnCooldown,
    /// No ability profile for the actor's archetype
    Misconfigured,
}

/// What an inbound request did
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// Basic attack connected
    Hit { damage: f32 },
    /// Basic attack whiffed (out of range)
    Missed,
    /// Ability fired; `first_hit` is the damage of the immediate hit, if it landed
    AbilityTriggered { first_hit: Option<f32> },
    /// Block or movement request accepted
    Applied,
    Rejected(RejectReason),
}

impl ActionOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ActionOutcome::Rejected(_))
    }
}

/// Borrow both combatants as (actor, foe) for `side`
fn split_pair<'a>(
    player: &'a mut Combatant,
    opponent: &'a mut Combatant,
    side: Side,
) -> (&'a mut Combatant, &'a mut Combatant) {
    match side {
        Side::Player => (player, opponent),
        Side::Opponent => (opponent, player),
    }
}

fn side_slot(side: Side) -> usize {
    match side {
        Side::Player => 0,
        Side::Opponent => 1,
    }
}

/// Complete state of one duel
pub struct BattleSession {
    pub id: SessionId,
    pub config: BattleConfig,

    pub player: Combatant,
    pub opponent: Combatant,

    pub phase: BattlePhase,
    /// Seconds spent in the Active phase
    pub elapsed: Seconds,
    /// Health removed from the opponent
    pub damage_dealt: f32,
    /// Health removed from the player
    pub damage_received: f32,

    countdown_index: usize,
    countdown_remaining: Seconds,

    abilities: AbilityRegistry,
    scheduler: TaskScheduler,
    /// Pending auto-unblock per side, indexed by `side_slot`
    block_release: [Option<TaskId>; 2],
    rng: StdRng,

    opponent_ai: Option<Box<dyn BattleAI>>,
    player_ai: Option<Box<dyn BattleAI>>,

    result: Option<BattleResult>,
    result_delay_remaining: Seconds,
    reported: bool,

    battle_log: Vec<BattleEvent>,
    dispatched: usize,
}

impl BattleSession {
    /// Build a session from archetype tags
    ///
    /// Fails if either archetype has no stats row or no ability profile, so
    /// a broken table is caught before the countdown starts.
    pub fn new(
        player: Archetype,
        opponent: Archetype,
        table: &ArchetypeTable,
        config: BattleConfig,
    ) -> Result<Self> {
        config.validate()?;

        let player = Combatant::new(player, Side::Player, table.get(player)?, config.player_start_x);
        let opponent = Combatant::new(
            opponent,
            Side::Opponent,
            table.get(opponent)?,
            config.opponent_start_x,
        );

        let opponent_ai: Option<Box<dyn BattleAI>> = if config.training_mode {
            None
        } else {
            Some(Box::new(AiOpponent::new(AiPersonality::default())))
        };

        let mut session = Self {
            id: SessionId::new(),
            countdown_remaining: config.countdown.first().map_or(0.0, |s| s.duration),
            config,
            player,
            opponent,
            phase: BattlePhase::Countdown,
            elapsed: 0.0,
            damage_dealt: 0.0,
            damage_received: 0.0,
            countdown_index: 0,
            abilities: AbilityRegistry::with_defaults(),
            scheduler: TaskScheduler::new(),
            block_release: [None; 2],
            rng: StdRng::from_entropy(),
            opponent_ai,
            player_ai: None,
            result: None,
            result_delay_remaining: 0.0,
            reported: false,
            battle_log: Vec::new(),
            dispatched: 0,
        };
        session.check_abilities()?;

        match session.config.countdown.first().map(|s| s.label.clone()) {
            Some(label) => session.log_countdown(label),
            None => session.start_battle(),
        }
        Ok(session)
    }

    /// Replace the RNG with a seeded one for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Swap in a different ability registry
    pub fn with_abilities(mut self, abilities: AbilityRegistry) -> Result<Self> {
        self.abilities = abilities;
        self.check_abilities()?;
        Ok(self)
    }

    fn check_abilities(&self) -> Result<()> {
        for archetype in [self.player.archetype, self.opponent.archetype] {
            if !self.abilities.contains(archetype) {
                return Err(ArenaError::UnknownArchetype(archetype));
            }
        }
        Ok(())
    }

    /// Install (or remove) the opponent AI; ignored in training mode
    pub fn set_opponent_ai(&mut self, ai: Option<Box<dyn BattleAI>>) {
        if self.config.training_mode && ai.is_some() {
            tracing::warn!("Training mode: opponent AI not installed");
            return;
        }
        self.opponent_ai = ai;
    }

    /// Install an autopilot for the player side (headless runs)
    pub fn set_player_ai(&mut self, ai: Option<Box<dyn BattleAI>>) {
        self.player_ai = ai;
    }

    // === QUERIES ===

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    pub fn distance(&self) -> f32 {
        self.player.distance_to(&self.opponent)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == BattlePhase::Ended
    }

    /// Outcome once the battle has ended, reported or not
    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn result_reported(&self) -> bool {
        self.reported
    }

    /// Scheduled continuations still waiting to run
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn battle_log(&self) -> &[BattleEvent] {
        &self.battle_log
    }

    /// Take events not yet handed to an observer
    ///
    /// Polling alternative to the observer passed to `tick`; drained events
    /// are not delivered again.
    pub fn drain_events(&mut self) -> Vec<BattleEvent> {
        let fresh = self.battle_log[self.dispatched..].to_vec();
        self.dispatched = self.battle_log.len();
        fresh
    }

    // === LIFECYCLE ===

    /// Skip whatever is left of the countdown and start fighting
    pub fn start_battle(&mut self) {
        if self.phase != BattlePhase::Countdown {
            return;
        }
        self.phase = BattlePhase::Active;
        self.elapsed = 0.0;
        tracing::info!(session = ?self.id, "Battle started");
        self.log_event(BattleEventType::BattleStarted, "Fight!".into());
    }

    /// Advance the session by one tick and deliver new events
    ///
    /// Events raised by inbound requests since the previous tick are
    /// delivered first, in the order they happened.
    pub fn tick(&mut self, delta: Seconds, observer: &mut dyn BattleObserver) {
        let delta = delta.max(0.0);
        match self.phase {
            BattlePhase::Countdown => {
                let spill = self.tick_countdown(delta);
                if self.phase == BattlePhase::Active && spill > 0.0 {
                    self.tick_active(spill);
                }
            }
            BattlePhase::Active => self.tick_active(delta),
            BattlePhase::Ended => self.tick_ended(delta),
        }
        self.flush_events(observer);
    }

    /// Returns the part of `delta` left over once the last step expired
    fn tick_countdown(&mut self, delta: Seconds) -> Seconds {
        self.countdown_remaining -= delta;
        while self.phase == BattlePhase::Countdown && self.countdown_remaining <= 0.0 {
            self.countdown_index += 1;
            match self.config.countdown.get(self.countdown_index) {
                Some(step) => {
                    let label = step.label.clone();
                    self.countdown_remaining += step.duration;
                    self.log_countdown(label);
                }
                None => {
                    let spill = -self.countdown_remaining;
                    self.countdown_remaining = 0.0;
                    self.start_battle();
                    return spill;
                }
            }
        }
        0.0
    }

    fn tick_active(&mut self, delta: Seconds) {
        self.elapsed += delta;

        // 1. Status timers and movement
        for side in [Side::Player, Side::Opponent] {
            let change = tick_status(self.combatant_mut(side), delta);
            if change.ability_became_ready {
                tracing::debug!(?side, "Ability ready");
            }
            self.integrate_movement(side, delta);
        }

        // 2. Staggered hits and timed releases
        self.run_due_tasks();

        // 3. AI decisions
        if !self.config.training_mode {
            self.run_ai(Side::Opponent, delta);
        }
        self.run_ai(Side::Player, delta);

        // 4. Win condition, player checked first
        self.check_battle_end();
    }

    fn tick_ended(&mut self, delta: Seconds) {
        if self.reported {
            return;
        }
        self.result_delay_remaining -= delta;
        if self.result_delay_remaining > 0.0 {
            return;
        }
        if let Some(result) = self.result.clone() {
            self.reported = true;
            tracing::info!(
                session = ?self.id,
                player_won = result.player_won,
                elapsed = result.elapsed,
                "Battle result reported"
            );
            let description = format!(
                "{} after {:.1}s",
                if result.player_won { "Victory" } else { "Defeat" },
                result.elapsed
            );
            self.log_event(BattleEventType::BattleEnded { result }, description);
        }
    }

    fn integrate_movement(&mut self, side: Side, delta: Seconds) {
        let scale = self.config.move_speed_scale;
        let (min_x, max_x) = (self.config.arena_min_x, self.config.arena_max_x);
        let bird = self.combatant_mut(side);
        if bird.is_dead() || bird.move_intent == 0.0 {
            return;
        }
        if side == Side::Opponent && bird.is_stunned() {
            return;
        }
        bird.x = (bird.x + bird.move_intent * bird.move_speed(scale) * delta).clamp(min_x, max_x);
    }

    fn run_ai(&mut self, side: Side, delta: Seconds) {
        let slot = match side {
            Side::Player => &mut self.player_ai,
            Side::Opponent => &mut self.opponent_ai,
        };
        let Some(ai) = slot.as_mut() else {
            return;
        };

        let (me, foe) = match side {
            Side::Player => (&self.player, &self.opponent),
            Side::Opponent => (&self.opponent, &self.player),
        };
        // Stunned or dead: the loop is skipped entirely, timers included
        if me.is_dead() || me.is_stunned() {
            return;
        }

        if let Some(action) = ai.decide(me, foe, delta, &mut self.rng) {
            self.apply_ai_action(side, action);
        }
    }

    fn apply_ai_action(&mut self, side: Side, action: AiAction) {
        match action {
            AiAction::Approach => {
                let direction = {
                    let (me, foe) = split_pair(&mut self.player, &mut self.opponent, side);
                    me.direction_to(foe)
                };
                self.request_move(side, direction);
            }
            AiAction::Attack => {
                self.request_move(side, 0.0);
                self.request_basic_attack(side);
            }
            AiAction::UseAbility => {
                self.request_move(side, 0.0);
                self.request_ability(side);
            }
            AiAction::Block { hold } => {
                self.request_move(side, 0.0);
                if !self.set_blocking(side, true).is_rejected() {
                    // A fresh block restarts the hold
                    if let Some(stale) = self.block_release[side_slot(side)].take() {
                        self.scheduler.cancel(stale);
                    }
                    let id = self
                        .scheduler
                        .schedule(self.elapsed + hold, ScheduledTask::ReleaseBlock { side });
                    self.block_release[side_slot(side)] = Some(id);
                }
            }
            AiAction::Reposition { direction } => {
                self.request_move(side, direction);
            }
        }
    }

    fn run_due_tasks(&mut self) {
        for task in self.scheduler.take_due(self.elapsed) {
            match task {
                ScheduledTask::AbilityHit {
                    caster,
                    effect,
                    hit_index,
                } => {
                    if self.phase != BattlePhase::Active
                        || self.player.is_dead()
                        || self.opponent.is_dead()
                    {
                        continue;
                    }
                    tracing::debug!(?caster, hit_index, "Staggered ability hit");
                    self.land_ability_hit(caster, &effect);
                }
                ScheduledTask::ReleaseBlock { side } => {
                    self.block_release[side_slot(side)] = None;
                    self.combatant_mut(side).is_blocking = false;
                }
                ScheduledTask::ReleaseAttackLock { side } => {
                    self.combatant_mut(side).is_attacking = false;
                }
            }
        }
    }

    fn check_battle_end(&mut self) {
        if self.phase != BattlePhase::Active {
            return;
        }
        if self.player.current_health <= 0.0 {
            self.end_battle(false);
        } else if self.opponent.current_health <= 0.0 {
            self.end_battle(true);
        }
    }

    fn end_battle(&mut self, player_won: bool) {
        self.phase = BattlePhase::Ended;
        let voided = self.scheduler.cancel_all();
        self.block_release = [None; 2];
        self.player.move_intent = 0.0;
        self.opponent.move_intent = 0.0;
        self.result_delay_remaining = self.config.result_delay;
        self.result = Some(BattleResult {
            session_id: self.id,
            player_won,
            elapsed: self.elapsed,
            damage_dealt: self.damage_dealt,
            damage_received: self.damage_received,
            player_archetype: self.player.archetype,
            opponent_archetype: self.opponent.archetype,
        });
        tracing::info!(
            session = ?self.id,
            player_won,
            elapsed = self.elapsed,
            voided_tasks = voided,
            "Battle ended"
        );
    }

    // === INBOUND REQUESTS ===

    /// Shared guard for every inbound request
    ///
    /// Stun only gates the opponent side; player input is never stunned.
    fn check_can_act(&self, side: Side) -> std::result::Result<(), RejectReason> {
        if self.phase != BattlePhase::Active {
            return Err(RejectReason::NotActive);
        }
        let actor = self.combatant(side);
        if actor.is_dead() {
            return Err(RejectReason::ActorDead);
        }
        // Foe already down: the win check ends the battle this tick
        if self.combatant(side.opposite()).is_dead() {
            return Err(RejectReason::NotActive);
        }
        if side == Side::Opponent && actor.is_stunned() {
            return Err(RejectReason::Stunned);
        }
        Ok(())
    }

    /// Basic attack against the other side
    pub fn request_basic_attack(&mut self, side: Side) -> ActionOutcome {
        if let Err(reason) = self.check_can_act(side) {
            return ActionOutcome::Rejected(reason);
        }

        let (attacker, defender) = split_pair(&mut self.player, &mut self.opponent, side);
        attacker.is_attacking = true;
        self.scheduler.schedule(
            self.elapsed + self.config.attack_lock_duration,
            ScheduledTask::ReleaseAttackLock { side },
        );

        let distance = attacker.distance_to(defender);
        if distance >= self.config.attack_range {
            tracing::debug!(?side, distance, "Basic attack missed (out of range)");
            return ActionOutcome::Missed;
        }

        let damage = resolve_hit(attacker, defender, HitKind::Basic, &self.config, &mut self.rng);
        let applied = defender.take_damage(damage);
        self.record_damage(side.opposite(), applied, HitKind::Basic);
        ActionOutcome::Hit { damage: applied }
    }

    /// Fire the side's special ability
    pub fn request_ability(&mut self, side: Side) -> ActionOutcome {
        if let Err(reason) = self.check_can_act(side) {
            return ActionOutcome::Rejected(reason);
        }
        if !self.combatant(side).ability_ready() {
            return ActionOutcome::Rejected(RejectReason::OnCooldown);
        }

        let archetype = self.combatant(side).archetype;
        let effect = match self.abilities.resolve(archetype, self.combatant(side)) {
            Ok(effect) => effect,
            Err(err) => {
                // Construction checks both archetypes, so this means a broken registry
                tracing::error!(?side, %err, "Ability lookup failed");
                return ActionOutcome::Rejected(RejectReason::Misconfigured);
            }
        };

        let caster = self.combatant_mut(side);
        caster.start_cooldown();
        if let Some(buff) = effect.buff {
            // Flagged only; no stat ever reads it
            caster.pending_buff = Some(buff);
            tracing::debug!(?side, ?buff, "Buff flagged");
        }

        self.log_event(
            BattleEventType::AbilityTriggered { side, archetype },
            format!("{:?} uses {} ability", side, archetype.bird_name()),
        );

        let first_hit = self.land_ability_hit(side, &effect);

        for hit_index in 1..effect.hit_count {
            let due = self.elapsed + self.config.multi_hit_interval * hit_index as f32;
            self.scheduler.schedule(
                due,
                ScheduledTask::AbilityHit {
                    caster: side,
                    effect: effect.clone(),
                    hit_index,
                },
            );
        }

        ActionOutcome::AbilityTriggered { first_hit }
    }

    /// Raise or drop guard
    pub fn set_blocking(&mut self, side: Side, blocking: bool) -> ActionOutcome {
        if let Err(reason) = self.check_can_act(side) {
            return ActionOutcome::Rejected(reason);
        }
        self.combatant_mut(side).is_blocking = blocking;
        ActionOutcome::Applied
    }

    /// Set the side's move intent (-1.0 left .. 1.0 right)
    pub fn request_move(&mut self, side: Side, direction: f32) -> ActionOutcome {
        if let Err(reason) = self.check_can_act(side) {
            return ActionOutcome::Rejected(reason);
        }
        self.combatant_mut(side).set_move_intent(direction);
        ActionOutcome::Applied
    }

    // === DAMAGE ===

    /// Resolve one ability hit from `caster` against the other side
    fn land_ability_hit(&mut self, caster: Side, effect: &AbilityEffect) -> Option<f32> {
        let (user, target) = split_pair(&mut self.player, &mut self.opponent, caster);
        let in_range = user.distance_to(target) < effect.range;
        let hit = apply_ability_hit(effect, user.x, target, in_range, &self.config, &mut self.rng);

        match hit {
            Some(hit) => {
                if hit.stun_applied > 0.0 {
                    tracing::debug!(side = ?caster.opposite(), stun = hit.stun_applied, "Stunned");
                }
                self.record_damage(caster.opposite(), hit.damage_applied, HitKind::Ability);
                Some(hit.damage_applied)
            }
            None => {
                tracing::debug!(?caster, "Ability hit out of range");
                None
            }
        }
    }

    fn record_damage(&mut self, target: Side, amount: f32, source: HitKind) {
        match target {
            Side::Opponent => self.damage_dealt += amount,
            Side::Player => self.damage_received += amount,
        }
        tracing::debug!(side = ?target, amount, ?source, "Damage applied");
        self.log_event(
            BattleEventType::DamageApplied {
                target,
                amount,
                is_critical: false,
                source,
            },
            format!("{:?} takes {:.1} damage", target, amount),
        );

        if self.combatant(target).is_dead() {
            let voided = self.scheduler.cancel_involving(target);
            if voided > 0 {
                tracing::debug!(side = ?target, voided, "Voided tasks for downed combatant");
            }
        }
    }

    // === EVENTS ===

    fn log_countdown(&mut self, label: String) {
        let description = format!("Countdown: {}", label);
        self.log_event(BattleEventType::CountdownStep { label }, description);
    }

    fn log_event(&mut self, event_type: BattleEventType, description: String) {
        self.battle_log.push(BattleEvent {
            time: self.elapsed,
            event_type,
            description,
        });
    }

    fn flush_events(&mut self, observer: &mut dyn BattleObserver) {
        for event in &self.battle_log[self.dispatched..] {
            dispatch(event, observer);
        }
        self.dispatched = self.battle_log.len();
    }
}
