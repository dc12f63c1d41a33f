//! Cancellable delayed task used to debounce the auto line-break pass.
//!
//! Time is passed in by the caller as a monotonic [`Duration`] since an
//! arbitrary origin, so the same code runs natively and under wasm.

use std::time::Duration;

/// Identifies one scheduling of a [`ScheduledTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTicket(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: TaskTicket,
    due: Duration,
}

/// At most one pending run; scheduling again supersedes the previous one.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    delay: Duration,
    pending: Option<Pending>,
    issued: u64,
}

impl ScheduledTask {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None, issued: 0 }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Changes the delay for later schedulings; a pending run keeps its deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedules a run `delay` after `now`, dropping any earlier pending run.
    pub fn schedule(&mut self, now: Duration) -> TaskTicket {
        self.issued += 1;
        let ticket = TaskTicket(self.issued);
        self.pending = Some(Pending { ticket, due: now + self.delay });
        ticket
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// True while `ticket` is the latest scheduling and has not fired.
    pub fn is_current(&self, ticket: TaskTicket) -> bool {
        self.pending.is_some_and(|p| p.ticket == ticket)
    }

    pub fn due_at(&self) -> Option<Duration> {
        self.pending.map(|p| p.due)
    }

    /// Consumes the pending run if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.pending {
            Some(p) if now >= p.due => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Consumes the pending run regardless of its deadline.
    pub fn fire_now(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_once_after_delay() {
        let mut task = ScheduledTask::new(ms(500));
        task.schedule(ms(0));
        assert!(!task.fire_if_due(ms(499)));
        assert!(task.fire_if_due(ms(500)));
        assert!(!task.fire_if_due(ms(600)));
        assert!(!task.is_pending());
    }

    #[test]
    fn later_schedule_supersedes_earlier() {
        let mut task = ScheduledTask::new(ms(500));
        let first = task.schedule(ms(0));
        let second = task.schedule(ms(300));
        assert!(!task.is_current(first));
        assert!(task.is_current(second));
        assert!(!task.fire_if_due(ms(500)));
        assert!(task.fire_if_due(ms(800)));
    }

    #[test]
    fn new_delay_applies_to_next_schedule_only() {
        let mut task = ScheduledTask::new(ms(500));
        task.schedule(ms(0));
        task.set_delay(ms(300));
        assert_eq!(task.due_at(), Some(ms(500)));
        assert!(task.fire_if_due(ms(500)));
        task.schedule(ms(1_000));
        assert_eq!(task.due_at(), Some(ms(1_300)));
    }

    #[test]
    fn cancel_and_fire_now() {
        let mut task = ScheduledTask::new(ms(500));
        task.schedule(ms(0));
        task.cancel();
        assert!(!task.fire_now());
        task.schedule(ms(10));
        assert_eq!(task.due_at(), Some(ms(510)));
        assert!(task.fire_now());
        assert!(!task.is_pending());
    }
}
