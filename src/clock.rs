use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Tick interval for the event loop; well under a second so the clock never lags visibly.
pub const TICK_RATE_MS: u64 = 100;

/// Source of "now" for everything time-dependent in a session.
pub trait TimeSource {
    fn now(&self) -> Instant;
}

/// Production time source backed by the monotonic system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced time source for simulated time. Clones share the same clock.
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    now: Rc<Cell<Instant>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// What a single clock poll observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    pub remaining: u32,
    /// True on exactly one poll per activation: the first that saw zero.
    pub expired: bool,
}

/// Wall-clock anchored countdown of the play time.
///
/// Remaining seconds are recomputed from the anchor on every poll instead of
/// being decremented per tick, so late or skipped ticks cannot make it drift.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    started_at: Option<Instant>,
    initial_remaining: u32,
    remaining: u32,
    expired: bool,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, initial_remaining: u32, now: Instant) {
        self.started_at = Some(now);
        self.initial_remaining = initial_remaining;
        self.remaining = initial_remaining;
        self.expired = false;
    }

    /// Drops the anchor. A later `start` re-anchors instead of resuming.
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn pause(&mut self) {
        self.stop();
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    pub fn poll(&mut self, now: Instant) -> ClockReading {
        let Some(started_at) = self.started_at else {
            return ClockReading {
                remaining: self.remaining,
                expired: false,
            };
        };

        let whole_secs = now.saturating_duration_since(started_at).as_millis() / 1000;
        let whole_secs = u32::try_from(whole_secs).unwrap_or(u32::MAX);
        let remaining = self.initial_remaining.saturating_sub(whole_secs);
        self.remaining = self.remaining.min(remaining);

        if self.remaining == 0 && !self.expired {
            self.expired = true;
            self.started_at = None;
            return ClockReading {
                remaining: 0,
                expired: true,
            };
        }

        ClockReading {
            remaining: self.remaining,
            expired: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_in_whole_seconds() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new();
        clock.start(30, t0);

        assert_eq!(clock.poll(t0 + Duration::from_millis(999)).remaining, 30);
        assert_eq!(clock.poll(t0 + Duration::from_millis(1000)).remaining, 29);
        assert_eq!(clock.poll(t0 + Duration::from_millis(10_500)).remaining, 20);
    }

    #[test]
    fn test_single_big_jump_expires_once() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new();
        clock.start(5, t0);

        let reading = clock.poll(t0 + Duration::from_millis(5001));
        assert_eq!(
            reading,
            ClockReading {
                remaining: 0,
                expired: true
            }
        );

        let again = clock.poll(t0 + Duration::from_millis(5101));
        assert_eq!(again.remaining, 0);
        assert!(!again.expired);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_small_ticks_expire_once() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new();
        clock.start(2, t0);

        let mut expiries = 0;
        for step in 1..=40u64 {
            let reading = clock.poll(t0 + Duration::from_millis(step * 100));
            if reading.expired {
                expiries += 1;
            }
        }
        assert_eq!(expiries, 1);
        assert_eq!(clock.remaining(), 0);
    }

    #[test]
    fn test_stop_then_restart_reanchors() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new();
        clock.start(10, t0);
        assert_eq!(clock.poll(t0 + Duration::from_secs(3)).remaining, 7);

        clock.stop();
        // a stopped clock holds its last value
        assert_eq!(clock.poll(t0 + Duration::from_secs(100)).remaining, 7);

        let t1 = t0 + Duration::from_secs(200);
        clock.start(10, t1);
        assert_eq!(clock.poll(t1 + Duration::from_millis(500)).remaining, 10);
        assert!(!clock.poll(t1 + Duration::from_secs(9)).expired);
        assert!(clock.poll(t1 + Duration::from_secs(10)).expired);
    }

    #[test]
    fn test_manual_time_source_is_shared() {
        let time = ManualTimeSource::new();
        let other = time.clone();
        let before = time.now();
        other.advance_ms(250);
        assert_eq!(time.now() - before, Duration::from_millis(250));
    }
}
