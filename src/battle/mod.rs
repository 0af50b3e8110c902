//! Battle system - one duel from countdown to reported result
//!
//! The session owns both combatants exclusively. Combat formulas, the task
//! scheduler and the AI receive borrows for the duration of a tick.
//!
//! Key points:
//! - Single-threaded and tick-driven; no internal threads or waits
//! - Delayed effects are scheduled tasks that die with the battle
//! - Outbound events go to an injected observer, never to globals

pub mod ai;
pub mod events;
pub mod scheduler;
pub mod session;

pub use ai::{load_personality, AiAction, AiOpponent, AiPersonality, BattleAI};
pub use events::{
    dispatch, BattleEvent, BattleEventLog, BattleEventType, BattleObserver, BattleResult,
    NoopObserver,
};
pub use scheduler::{ScheduledTask, TaskId, TaskScheduler};
pub use session::{ActionOutcome, BattlePhase, BattleSession, RejectReason};
