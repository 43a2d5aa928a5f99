use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of "now" for the session clock and the countdown
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock used by the binary
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Lets tests simulate elapsed time
/// without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Seconds between two instants, zero if `later` is actually earlier
pub fn seconds_between(earlier: Instant, later: Instant) -> f64 {
    later.saturating_duration_since(earlier).as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_on_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        clock.advance_ms(250);
        assert_eq!(seconds_between(t0, clock.now()), 0.25);
    }

    #[test]
    fn seconds_between_never_negative() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        clock.advance_ms(100);
        assert_eq!(seconds_between(clock.now(), t0), 0.0);
    }
}
