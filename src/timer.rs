use std::time::{Duration, SystemTime};

use crate::clock::elapsed_between;

/// Repeating timer handle. There is only ever one schedule per handle:
/// `start` replaces whatever was running, so a session can't be driven by two
/// timers at once.
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    period: Duration,
    next_due: Option<SystemTime>,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: SystemTime) {
        self.next_due = now.checked_add(self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true when a period has elapsed. Periods missed while nobody
    /// polled collapse into a single firing; the next deadline stays on the
    /// period grid set by `start`. A schedule past the end of time stops the
    /// timer.
    pub fn fire(&mut self, now: SystemTime) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let period = self.period.as_nanos();
        let missed = elapsed_between(due, now).as_nanos() / period.max(1);
        self.next_due = u64::try_from(period * (missed + 1))
            .ok()
            .and_then(|offset| due.checked_add(Duration::from_nanos(offset)));
        true
    }
}

/// One-shot deadline tagged with the session generation it was scheduled for.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    due: Option<(SystemTime, u64)>,
}

impl Deadline {
    pub fn schedule(&mut self, at: SystemTime, session_id: u64) {
        self.due = Some((at, session_id));
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn due_at(&self) -> Option<SystemTime> {
        self.due.map(|(at, _)| at)
    }

    /// Consumes the deadline if it has passed and yields its session tag.
    pub fn take_due(&mut self, now: SystemTime) -> Option<u64> {
        match self.due {
            Some((at, id)) if now >= at => {
                self.due = None;
                Some(id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_000)
    }

    #[test]
    fn idle_timer_never_fires() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        assert!(!timer.is_running());
        assert!(!timer.fire(t0() + Duration::from_secs(10)));
    }

    #[test]
    fn fires_once_per_period() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        timer.start(t0());

        assert!(!timer.fire(t0() + Duration::from_millis(999)));
        assert!(timer.fire(t0() + Duration::from_millis(1000)));
        assert!(!timer.fire(t0() + Duration::from_millis(1500)));
        assert!(timer.fire(t0() + Duration::from_millis(2010)));
    }

    #[test]
    fn missed_periods_collapse() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        timer.start(t0());

        assert!(timer.fire(t0() + Duration::from_millis(3500)));
        assert!(!timer.fire(t0() + Duration::from_millis(3600)));
        assert!(timer.fire(t0() + Duration::from_millis(4000)));
    }

    #[test]
    fn restart_replaces_schedule() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        timer.start(t0());
        timer.start(t0() + Duration::from_millis(800));

        assert!(!timer.fire(t0() + Duration::from_millis(1000)));
        assert!(timer.fire(t0() + Duration::from_millis(1800)));
    }

    #[test]
    fn cancel_stops_firing() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(1));
        timer.start(t0());
        timer.cancel();

        assert!(!timer.fire(t0() + Duration::from_secs(5)));
    }

    #[test]
    fn period_past_end_of_time_never_fires() {
        let mut timer = RepeatingTimer::new(Duration::from_secs(u64::MAX));
        timer.start(t0());

        assert!(!timer.is_running());
        assert!(!timer.fire(t0() + Duration::from_secs(1_000_000)));
    }

    #[test]
    fn deadline_yields_tag_once() {
        let mut deadline = Deadline::default();
        deadline.schedule(t0() + Duration::from_secs(5), 7);

        assert_eq!(deadline.take_due(t0() + Duration::from_secs(4)), None);
        assert_eq!(deadline.take_due(t0() + Duration::from_secs(5)), Some(7));
        assert_eq!(deadline.take_due(t0() + Duration::from_secs(6)), None);
        assert_eq!(deadline.due_at(), None);
    }
}
