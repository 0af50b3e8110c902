//! Delayed continuations keyed to the battle clock
//!
//! Staggered ability hits and timed releases (block, attack lock) are
//! queued here instead of running as free-floating timers, so ending the
//! battle or losing a combatant voids them.

use crate::combat::AbilityEffect;
use crate::core::types::{Seconds, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledTask {
    /// One later hit of a multi-hit ability
    AbilityHit {
        caster: Side,
        effect: AbilityEffect,
        hit_index: u32,
    },
    ReleaseBlock {
        side: Side,
    },
    ReleaseAttackLock {
        side: Side,
    },
}

impl ScheduledTask {
    /// Does this task touch the given side?
    pub fn involves(&self, side: Side) -> bool {
        match self {
            // The target of an ability hit is always the caster's foe
            ScheduledTask::AbilityHit { .. } => true,
            ScheduledTask::ReleaseBlock { side: s } | ScheduledTask::ReleaseAttackLock { side: s } => {
                *s == side
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: TaskId,
    due: Seconds,
    task: ScheduledTask,
}

/// Per-session task registry
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler {
    entries: Vec<Entry>,
    next_id: u64,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Seconds, task: ScheduledTask) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due, task });
        id
    }

    /// Remove one task; returns false if it already ran or was cancelled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Void every task touching `side`, returning how many were dropped
    pub fn cancel_involving(&mut self, side: Side) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.task.involves(side));
        before - self.entries.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Pop every task due at or before `now`, earliest first
    ///
    /// Tasks sharing a due time come out in scheduling order.
    pub fn take_due(&mut self, now: Seconds) -> Vec<ScheduledTask> {
        let (mut due, pending): (Vec<Entry>, Vec<Entry>) =
            self.entries.drain(..).partition(|e| e.due <= now);
        self.entries = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.cmp(&b.id)));
        due.into_iter().map(|e| e.task).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
