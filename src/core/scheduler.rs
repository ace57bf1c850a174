/// Cooperative task table — the session's only source of suspension.

use std::time::Duration;

/// The categories of scheduled work. At most one task of each kind is
/// pending at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Wait before a dialogue node's content is shown.
    NodeDelay,
    /// Wait between two revealed characters.
    Reveal,
    /// Wait before auto-advancing past a finished click-to-advance node.
    AutoAdvance,
}

#[derive(Debug, Clone, Copy)]
struct Task {
    kind: TaskKind,
    due: Duration,
    seq: u64,
}

/// A per-session table of cancellable timed tasks driven by explicit time.
///
/// The clock only moves through [`pop_due`](Self::pop_due) and
/// [`settle`](Self::settle). While a task is being handled the clock sits at
/// that task's due time, so follow-up tasks are scheduled without drift.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: Duration,
    tasks: Vec<Task>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `kind` to fire `after` from now, replacing any pending task
    /// of the same kind.
    pub fn schedule(&mut self, kind: TaskKind, after: Duration) {
        self.cancel(kind);
        self.seq += 1;
        self.tasks.push(Task {
            kind,
            due: self.now.saturating_add(after),
            seq: self.seq,
        });
    }

    /// Returns whether a task was pending.
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.kind != kind);
        self.tasks.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }

    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Time until `kind` fires, if pending.
    pub fn remaining(&self, kind: TaskKind) -> Option<Duration> {
        self.tasks
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.due.saturating_sub(self.now))
    }

    /// Remove and return the earliest task due no later than `until`,
    /// moving the clock to its due time. Ties fire in scheduling order.
    pub fn pop_due(&mut self, until: Duration) -> Option<TaskKind> {
        let (index, _) = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))?;
        let task = self.tasks.swap_remove(index);
        self.now = self.now.max(task.due);
        Some(task.kind)
    }

    /// Move the clock forward to `until` once a tick's tasks are handled.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

/// Seconds to a duration. Negative, NaN, and overflowing inputs become zero.
pub fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fires_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(TaskKind::Reveal, MS * 30);
        s.schedule(TaskKind::NodeDelay, MS * 10);
        assert_eq!(s.pop_due(MS * 50), Some(TaskKind::NodeDelay));
        assert_eq!(s.now(), MS * 10);
        assert_eq!(s.pop_due(MS * 50), Some(TaskKind::Reveal));
        assert_eq!(s.pop_due(MS * 50), None);
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut s = Scheduler::new();
        s.schedule(TaskKind::NodeDelay, MS * 10);
        assert_eq!(s.pop_due(MS * 9), None);
        s.settle(MS * 9);
        assert_eq!(s.remaining(TaskKind::NodeDelay), Some(MS));
    }

    #[test]
    fn rescheduling_replaces_same_kind() {
        let mut s = Scheduler::new();
        s.schedule(TaskKind::Reveal, MS * 10);
        s.schedule(TaskKind::Reveal, MS * 40);
        assert_eq!(s.pop_due(MS * 20), None);
        assert_eq!(s.pop_due(MS * 40), Some(TaskKind::Reveal));
        assert!(!s.has_pending());
    }

    #[test]
    fn follow_up_tasks_schedule_from_due_time() {
        let mut s = Scheduler::new();
        s.schedule(TaskKind::Reveal, MS * 10);
        assert_eq!(s.pop_due(MS * 100), Some(TaskKind::Reveal));
        s.schedule(TaskKind::Reveal, MS * 10);
        assert_eq!(s.remaining(TaskKind::Reveal), Some(MS * 10));
        assert_eq!(s.pop_due(MS * 100), Some(TaskKind::Reveal));
        assert_eq!(s.now(), MS * 20);
    }

    #[test]
    fn cancel_all_clears_everything() {
        let mut s = Scheduler::new();
        s.schedule(TaskKind::Reveal, MS);
        s.schedule(TaskKind::NodeDelay, MS);
        s.schedule(TaskKind::AutoAdvance, MS);
        s.cancel_all();
        assert!(!s.has_pending());
        assert_eq!(s.pop_due(MS * 10), None);
    }

    #[test]
    fn cancel_reports_pending() {
        let mut s = Scheduler::new();
        assert!(!s.cancel(TaskKind::AutoAdvance));
        s.schedule(TaskKind::AutoAdvance, MS);
        assert!(s.is_pending(TaskKind::AutoAdvance));
        assert!(s.cancel(TaskKind::AutoAdvance));
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut s = Scheduler::new();
        s.schedule(TaskKind::AutoAdvance, Duration::ZERO);
        s.schedule(TaskKind::NodeDelay, Duration::ZERO);
        assert_eq!(s.pop_due(Duration::ZERO), Some(TaskKind::AutoAdvance));
        assert_eq!(s.pop_due(Duration::ZERO), Some(TaskKind::NodeDelay));
    }

    #[test]
    fn seconds_clamps_bad_input() {
        assert_eq!(seconds(0.5), Duration::from_millis(500));
        assert_eq!(seconds(-1.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
    }
}
