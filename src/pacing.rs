use std::time::{Duration, Instant};

/// One-shot tick deadline that is re-armed one `step` after each due tick.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    step: Duration,
    next_tick: Option<Instant>,
}

impl TickSchedule {
    pub fn new(step: Duration) -> Self {
        Self {
            step: step.max(Duration::from_millis(1)),
            next_tick: None,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_tick = Some(now + self.step);
    }

    pub fn cancel(&mut self) {
        self.next_tick = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Returns true when a tick is due and moves the deadline forward by one step.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(deadline) if now >= deadline => {
                self.next_tick = Some(deadline + self.step);
                true
            }
            _ => false,
        }
    }

    pub fn wait_hint(&self, now: Instant) -> Option<Duration> {
        self.next_tick
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Blocks the current thread until `deadline`; returns at once if it has passed.
pub fn sleep_until(deadline: Instant) {
    let wait = deadline.saturating_duration_since(Instant::now());
    if !wait.is_zero() {
        std::thread::sleep(wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unarmed_schedule_never_fires() {
        let mut schedule = TickSchedule::new(Duration::from_secs(1));
        let now = Instant::now();
        assert!(!schedule.take_due(now + Duration::from_secs(10)));
        assert_eq!(schedule.wait_hint(now), None);
    }

    #[test]
    fn armed_schedule_fires_one_step_later() {
        let mut schedule = TickSchedule::new(Duration::from_secs(1));
        let start = Instant::now();
        schedule.arm(start);

        assert!(!schedule.take_due(start + Duration::from_millis(999)));
        assert!(schedule.take_due(start + Duration::from_secs(1)));
        assert_eq!(
            schedule.next_deadline(),
            Some(start + Duration::from_secs(2))
        );
    }

    #[test]
    fn late_polls_do_not_accumulate_drift() {
        let mut schedule = TickSchedule::new(Duration::from_secs(1));
        let start = Instant::now();
        schedule.arm(start);

        assert!(schedule.take_due(start + Duration::from_millis(1_300)));
        assert_eq!(
            schedule.next_deadline(),
            Some(start + Duration::from_secs(2))
        );

        let late = start + Duration::from_millis(3_100);
        assert!(schedule.take_due(late));
        assert!(schedule.take_due(late));
        assert!(!schedule.take_due(late));
    }

    #[test]
    fn cancel_stops_further_ticks() {
        let mut schedule = TickSchedule::new(Duration::from_secs(1));
        let start = Instant::now();
        schedule.arm(start);
        schedule.cancel();
        assert!(!schedule.is_armed());
        assert!(!schedule.take_due(start + Duration::from_secs(5)));
    }

    #[test]
    fn wait_hint_counts_down_to_deadline() {
        let mut schedule = TickSchedule::new(Duration::from_millis(500));
        let start = Instant::now();
        schedule.arm(start);
        assert_eq!(
            schedule.wait_hint(start + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(
            schedule.wait_hint(start + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn sleep_until_waits_for_deadline() {
        let deadline = Instant::now() + Duration::from_millis(5);
        sleep_until(deadline);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn sleep_until_past_deadline_returns_immediately() {
        let started = Instant::now();
        sleep_until(started);
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
