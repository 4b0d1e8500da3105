use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of "now" for the countdown
pub trait Clock {
    fn now(&self) -> Instant;

    /// Real time to block for while this clock waits out `wait`.
    fn real_wait(&self, wait: Duration) -> Duration {
        wait
    }

    /// Called when a wait for `deadline` has run out.
    fn reach(&self, _deadline: Instant) {}
}

/// Monotonic system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to, for driving the countdown in tests
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

    /// Time passed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
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

    // only pending input is polled, timers never block
    fn real_wait(&self, _wait: Duration) -> Duration {
        Duration::ZERO
    }

    fn reach(&self, deadline: Instant) {
        let at = deadline.saturating_duration_since(self.origin);
        if at > self.offset.get() {
            self.offset.set(at);
        }
    }
}
