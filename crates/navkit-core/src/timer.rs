#![forbid(unsafe_code)]

//! Cancellable scheduled tasks.
//!
//! Every delay the controller needs (resize debounce, hover intent, focus
//! grace, animation completion, overlay fade) is a [`TimerKind`] scheduled
//! against the host clock. There is at most one pending timer per kind:
//! scheduling a kind again moves its deadline. Due timers are drained in
//! deadline order, ties broken by scheduling order.

use core::time::Duration;

use crate::surface::ItemId;

/// What a scheduled task does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Panel open/close animation finished.
    TransitionEnd,
    /// Overlay fade-out finished.
    OverlayFade,
    /// Resize burst settled.
    ResizeSettle,
    /// Desktop hover intent confirmed.
    HoverOpen(ItemId),
    /// Desktop pointer stayed away long enough.
    HoverClose(ItemId),
    /// Focus stayed outside the item for the grace period.
    BlurClose(ItemId),
}

impl TimerKind {
    /// The item a per-item timer belongs to.
    #[must_use]
    pub const fn item(self) -> Option<ItemId> {
        match self {
            Self::HoverOpen(id) | Self::HoverClose(id) | Self::BlurClose(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    kind: TimerKind,
    deadline: Duration,
    seq: u64,
}

/// Pending tasks, owned by the controller.
#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `deadline`, replacing any pending one.
    pub fn schedule(&mut self, kind: TimerKind, deadline: Duration) {
        self.cancel(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            kind,
            deadline,
            seq,
        });
    }

    /// Cancel `kind`. Returns whether it was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.kind != kind);
        self.pending.len() != before
    }

    /// Cancel every pending task matching `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(TimerKind) -> bool) {
        self.pending.retain(|t| !pred(t.kind));
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|t| t.kind == kind)
    }

    /// Earliest pending deadline, for hosts that arm a single platform timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|t| t.deadline).min()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the earliest task due at `now`.
    ///
    /// Handlers may schedule or cancel tasks between calls, so callers pop one
    /// task at a time rather than draining a snapshot.
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerKind> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(idx, _)| idx)?;
        Some(self.pending.swap_remove(idx).kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut sched = Scheduler::new();
        sched.schedule(TimerKind::TransitionEnd, ms(350));
        assert_eq!(sched.pop_due(ms(349)), None);
        assert_eq!(sched.pop_due(ms(350)), Some(TimerKind::TransitionEnd));
        assert!(sched.is_empty());
    }

    #[test]
    fn reschedule_replaces_deadline() {
        let mut sched = Scheduler::new();
        sched.schedule(TimerKind::ResizeSettle, ms(150));
        sched.schedule(TimerKind::ResizeSettle, ms(300));
        assert_eq!(sched.len(), 1);
        assert_eq!(sched.pop_due(ms(200)), None);
        assert_eq!(sched.next_deadline(), Some(ms(300)));
    }

    #[test]
    fn due_tasks_pop_in_deadline_then_sequence_order() {
        let mut sched = Scheduler::new();
        let a = TimerKind::HoverClose(ItemId(0));
        let b = TimerKind::HoverOpen(ItemId(1));
        sched.schedule(TimerKind::OverlayFade, ms(100));
        sched.schedule(a, ms(50));
        sched.schedule(b, ms(50));

        assert_eq!(sched.pop_due(ms(100)), Some(a));
        assert_eq!(sched.pop_due(ms(100)), Some(b));
        assert_eq!(sched.pop_due(ms(100)), Some(TimerKind::OverlayFade));
        assert_eq!(sched.pop_due(ms(100)), None);
    }

    #[test]
    fn cancel_reports_pending() {
        let mut sched = Scheduler::new();
        sched.schedule(TimerKind::BlurClose(ItemId(2)), ms(10));
        assert!(sched.cancel(TimerKind::BlurClose(ItemId(2))));
        assert!(!sched.cancel(TimerKind::BlurClose(ItemId(2))));
    }

    #[test]
    fn cancel_where_filters_item_timers() {
        let mut sched = Scheduler::new();
        sched.schedule(TimerKind::HoverOpen(ItemId(0)), ms(10));
        sched.schedule(TimerKind::BlurClose(ItemId(1)), ms(10));
        sched.schedule(TimerKind::TransitionEnd, ms(10));
        sched.cancel_where(|k| k.item().is_some());
        assert_eq!(sched.len(), 1);
        assert!(sched.is_pending(TimerKind::TransitionEnd));
    }
}
