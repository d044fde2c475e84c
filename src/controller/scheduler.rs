// src/controller/scheduler.rs

use crate::common::timing::{CLOCK_TICK_PERIOD, POLL_TICK_PERIOD};
use core::time::Duration;

/// A trigger that fires once per `period` on a caller-supplied monotonic time base.
///
/// The first query always fires. Missed periods are not replayed: after a long stall
/// the task fires once and re-anchors on the current time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PeriodicTask {
    period: Duration,
    next_due: Option<Duration>,
}

impl PeriodicTask {
    pub const fn new(period: Duration) -> Self {
        PeriodicTask { period, next_due: None }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns `true` if the task is due at `now`, and schedules the next run.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            Some(due) => {
                let next = due + self.period;
                self.next_due = Some(if next <= now { now + self.period } else { next });
                true
            }
            None => {
                self.next_due = Some(now + self.period);
                true
            }
        }
    }
}

/// Which periodic triggers fired in one scheduler step.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Ticks {
    pub clock: bool,
    pub poll: bool,
}

impl Ticks {
    pub fn any(&self) -> bool {
        self.clock || self.poll
    }
}

/// The two independent triggers of a station: clock tick and transport poll tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Scheduler {
    clock: PeriodicTask,
    poll: PeriodicTask,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self::with_periods(CLOCK_TICK_PERIOD, POLL_TICK_PERIOD)
    }

    pub const fn with_periods(clock: Duration, poll: Duration) -> Self {
        Scheduler {
            clock: PeriodicTask::new(clock),
            poll: PeriodicTask::new(poll),
        }
    }

    pub fn due(&mut self, now: Duration) -> Ticks {
        Ticks {
            clock: self.clock.poll(now),
            poll: self.poll.poll(now),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_periodic_task_fires_once_per_period() {
        let mut task = PeriodicTask::new(ms(100));
        assert!(task.poll(ms(0)));
        assert!(!task.poll(ms(50)));
        assert!(!task.poll(ms(99)));
        assert!(task.poll(ms(100)));
        // Late poll keeps the original cadence
        assert!(task.poll(ms(230)));
        assert!(!task.poll(ms(299)));
        assert!(task.poll(ms(300)));
    }

    #[test]
    fn test_stall_does_not_replay_missed_ticks() {
        let mut task = PeriodicTask::new(ms(100));
        assert!(task.poll(ms(0)));
        assert!(task.poll(ms(1_000)));
        assert!(!task.poll(ms(1_050)));
        assert!(task.poll(ms(1_100)));
    }

    #[test]
    fn test_scheduler_tasks_are_independent() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.due(ms(0)), Ticks { clock: true, poll: true });

        let fired: usize = (1..10)
            .map(|i| scheduler.due(ms(i * 100)))
            .filter(|t| t.poll)
            .inspect(|t| assert!(!t.clock))
            .count();
        assert_eq!(fired, 9);

        let ticks = scheduler.due(ms(1_000));
        assert!(ticks.clock && ticks.poll);
        assert!(!scheduler.due(ms(1_050)).any());
    }
}
