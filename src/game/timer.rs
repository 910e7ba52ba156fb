//! Timer Scheduler
//!
//! Deferred single-shot tasks on the simulated clock. Tasks are typed
//! payloads; the tick driver dispatches them. Firing order is deadline,
//! then submission order on ties. There is no cancellation: handlers
//! check their target's dead/exploded/hidden flag and no-op when stale.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Serialize, Deserialize};

use crate::game::entity::EntityId;

/// Deferred work item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerTask {
    /// Bomb fuse expired
    Detonate(EntityId),
    /// Exploded bomb leaves the registry
    DespawnBomb(EntityId),
    /// Death animation finished, tagged with the death it belongs to
    HidePlayer(EntityId, u32),
    /// Respawn wait finished
    Respawn(EntityId),
    /// Hidden pickup reappears
    RevealPickup(EntityId),
    /// Transient blast marker expired
    ExpireSegment(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Scheduled {
    deadline_ms: u64,
    seq: u64,
    task: TimerTask,
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // seq is unique, so the task payload never decides order
        self.deadline_ms
            .cmp(&other.deadline_ms)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Simulated clock plus the queue of pending tasks.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward.
    pub fn advance(&mut self, dt_ms: u32) {
        self.now_ms += dt_ms as u64;
    }

    /// Run `task` once at least `delay_ms` has elapsed from now.
    pub fn after(&mut self, delay_ms: u32, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            deadline_ms: self.now_ms + delay_ms as u64,
            seq,
            task,
        }));
    }

    /// Pop the earliest task whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<TimerTask> {
        match self.queue.peek() {
            Some(Reverse(next)) if next.deadline_ms <= self.now_ms => {
                self.queue.pop().map(|Reverse(s)| s.task)
            }
            _ => None,
        }
    }

    /// Pending tasks in firing order.
    pub fn pending(&self) -> Vec<(u64, TimerTask)> {
        let mut all: Vec<&Scheduled> = self.queue.iter().map(|Reverse(s)| s).collect();
        all.sort();
        all.into_iter().map(|s| (s.deadline_ms, s.task)).collect()
    }

    /// Number of pending tasks matching `pred`.
    pub fn count_pending(&self, pred: impl Fn(&TimerTask) -> bool) -> usize {
        self.queue.iter().filter(|Reverse(s)| pred(&s.task)).count()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler) -> Vec<TimerTask> {
        std::iter::from_fn(|| s.pop_due()).collect()
    }

    #[test]
    fn test_fires_only_after_deadline() {
        let mut s = Scheduler::new();
        s.after(100, TimerTask::Detonate(EntityId(1)));

        s.advance(99);
        assert!(drain(&mut s).is_empty());

        s.advance(1);
        assert_eq!(drain(&mut s), vec![TimerTask::Detonate(EntityId(1))]);
        assert!(s.is_empty(), "single-shot");
    }

    #[test]
    fn test_deadline_then_submission_order() {
        let mut s = Scheduler::new();
        s.after(50, TimerTask::Respawn(EntityId(1)));
        s.after(20, TimerTask::HidePlayer(EntityId(2), 1));
        s.after(50, TimerTask::RevealPickup(EntityId(3)));
        s.after(20, TimerTask::ExpireSegment(4));

        s.advance(1000);
        assert_eq!(
            drain(&mut s),
            vec![
                TimerTask::HidePlayer(EntityId(2), 1),
                TimerTask::ExpireSegment(4),
                TimerTask::Respawn(EntityId(1)),
                TimerTask::RevealPickup(EntityId(3)),
            ]
        );
    }

    #[test]
    fn test_delay_is_relative_to_current_clock() {
        let mut s = Scheduler::new();
        s.advance(500);
        s.after(100, TimerTask::DespawnBomb(EntityId(9)));
        assert_eq!(s.pending(), vec![(600, TimerTask::DespawnBomb(EntityId(9)))]);
        assert_eq!(s.count_pending(|t| matches!(t, TimerTask::DespawnBomb(_))), 1);
    }

    #[test]
    fn test_zero_delay_fires_in_same_slot() {
        let mut s = Scheduler::new();
        s.after(0, TimerTask::Detonate(EntityId(0)));
        assert_eq!(s.pop_due(), Some(TimerTask::Detonate(EntityId(0))));
    }
}
