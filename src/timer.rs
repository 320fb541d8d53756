use std::time::{Duration, Instant};

/// A repeating wall-clock deadline, checked by the frame loop.
///
/// Periods missed while the loop was stalled coalesce into a single fire, so
/// a long hiccup never releases a burst of events.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    /// First fire is one full period after `start`.
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
        }
    }

    /// True when a deadline has passed since the last fire.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_fires_once_per_period() {
        let start = Instant::now();
        let mut timer = Interval::new(2 * SECOND, start);
        assert!(!timer.fire(start));
        assert!(!timer.fire(start + Duration::from_millis(1999)));
        assert!(timer.fire(start + 2 * SECOND));
        assert!(!timer.fire(start + Duration::from_millis(2016)));
        assert!(timer.fire(start + 4 * SECOND));
    }

    #[test]
    fn test_keeps_cadence_with_late_checks() {
        let start = Instant::now();
        let mut timer = Interval::new(2 * SECOND, start);
        // Checked 10ms late, the next deadline is still 4s after start
        assert!(timer.fire(start + Duration::from_millis(2010)));
        assert!(!timer.fire(start + Duration::from_millis(3990)));
        assert!(timer.fire(start + 4 * SECOND));
    }

    #[test]
    fn test_missed_periods_coalesce() {
        let start = Instant::now();
        let mut timer = Interval::new(2 * SECOND, start);
        let late = start + 9 * SECOND;
        assert!(timer.fire(late));
        assert!(!timer.fire(late));
        assert!(!timer.fire(late + Duration::from_millis(1999)));
        assert!(timer.fire(late + 2 * SECOND));
    }
}
