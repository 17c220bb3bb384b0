//! Explicit task scheduling over a virtual clock.
//!
//! Turn pacing and AI stepping run as queued tasks with millisecond due
//! times instead of suspended control flow, so every pending delay is a
//! visible, cancellable queue entry and `advance` makes time deterministic
//! in tests. Tasks due at the same instant run in scheduling (FIFO) order.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Delay between one turn ending and the next starting.
pub const TURN_START_DELAY_MS: u64 = 500;
/// Delay between consecutive AI actions.
pub const AI_STEP_DELAY_MS: u64 = 400;

/// A deferred unit of engine work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Begin `PlayerId`'s turn.
    StartTurn(PlayerId),
    /// Let the AI controlling `PlayerId` take its next action.
    AiStep(PlayerId),
}

/// Handle for cancelling a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Clone, Debug)]
struct Entry {
    due_ms: u64,
    seq: u64,
    task: Task,
}

/// Queue of pending tasks ordered by due time, then scheduling order.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: Vec<Entry>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending task.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.queue.iter().map(|e| e.due_ms).min()
    }

    /// Queue `task` to run `delay_ms` from now.
    pub fn schedule(&mut self, delay_ms: u64, task: Task) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            due_ms: self.now_ms + delay_ms,
            seq,
            task,
        });
        TaskHandle(seq)
    }

    /// Cancel one task. Returns whether it was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.queue.len();
        self.queue.retain(|e| e.seq != handle.0);
        self.queue.len() != before
    }

    /// Cancel every pending AI step for `player`. Returns how many were
    /// dropped.
    pub fn cancel_ai(&mut self, player: PlayerId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|e| e.task != Task::AiStep(player));
        before - self.queue.len()
    }

    /// Drop everything pending.
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    /// Advance the clock by `ms` and drain every task that came due, in
    /// (due time, scheduling order) order. Tasks scheduled while the caller
    /// processes the returned batch land in the queue for the next call.
    #[must_use]
    pub fn advance(&mut self, ms: u64) -> Vec<Task> {
        self.now_ms += ms;
        let now = self.now_ms;

        let mut due: Vec<Entry> = Vec::new();
        self.queue.retain(|e| {
            if e.due_ms <= now {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| (e.due_ms, e.seq));
        due.into_iter().map(|e| e.task).collect()
    }
}
