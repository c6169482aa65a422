/// Time source for the session loop.
///
/// `now_millis` is monotonic and starts at zero when the clock is created.
/// `sleep_until_next_tick` waits out whatever is left of the current tick
/// period; a tick that overran its budget is not made up later.

use std::time::{Duration, Instant};

pub trait Clock {
    fn now_millis(&mut self) -> u64;
    fn sleep_until_next_tick(&mut self);
}

pub struct SystemClock {
    origin: Instant,
    tick_started: Instant,
    period: Duration,
}

impl SystemClock {
    pub fn new(tick_rate_ms: u64) -> Self {
        let now = Instant::now();
        SystemClock {
            origin: now,
            tick_started: now,
            period: Duration::from_millis(tick_rate_ms.max(1)),
        }
    }
}

impl Clock for SystemClock {
    fn now_millis(&mut self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_until_next_tick(&mut self) {
        let elapsed = self.tick_started.elapsed();
        if elapsed < self.period {
            std::thread::sleep(self.period - elapsed);
        }
        self.tick_started = Instant::now();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Advances by a fixed step on every sleep; never blocks.
    pub(crate) struct FakeClock {
        pub(crate) now: u64,
        pub(crate) step: u64,
        pub(crate) sleeps: usize,
    }

    impl FakeClock {
        pub(crate) fn new(step: u64) -> Self {
            FakeClock { now: 0, step, sleeps: 0 }
        }
    }

    impl Clock for FakeClock {
        fn now_millis(&mut self) -> u64 {
            self.now
        }

        fn sleep_until_next_tick(&mut self) {
            self.now += self.step;
            self.sleeps += 1;
        }
    }

    #[test]
    fn system_clock_is_monotonic_and_paced() {
        let mut clock = SystemClock::new(5);
        let a = clock.now_millis();
        clock.sleep_until_next_tick();
        let b = clock.now_millis();
        assert!(b >= a + 4);
    }

    #[test]
    fn zero_period_is_clamped() {
        let clock = SystemClock::new(0);
        assert_eq!(clock.period, Duration::from_millis(1));
    }
}
