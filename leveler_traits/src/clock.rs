use std::thread;
use std::time::{Duration, Instant};

/// Time source used for servo settle delays and run timing.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0.
    fn ms_since(&self, epoch: Instant) -> u64 {
        self.now().saturating_duration_since(epoch).as_millis() as u64
    }
}

/// Wall clock backed by `std::time::Instant` and `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Clock that never blocks: `sleep` advances virtual time and records the call.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        origin: Instant,
        state: Arc<Mutex<ManualState>>,
    }

    #[derive(Debug, Default)]
    struct ManualState {
        offset: Duration,
        sleeps: Vec<Duration>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                state: Arc::new(Mutex::new(ManualState::default())),
            }
        }

        /// Every duration passed to `sleep`, in call order.
        pub fn sleeps(&self) -> Vec<Duration> {
            self.state
                .lock()
                .map(|s| s.sleeps.clone())
                .unwrap_or_default()
        }

        /// Total virtual time slept so far.
        pub fn slept(&self) -> Duration {
            self.state
                .lock()
                .map(|s| s.offset)
                .unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + self.slept()
        }

        fn sleep(&self, d: Duration) {
            if let Ok(mut s) = self.state.lock() {
                s.offset = s.offset.saturating_add(d);
                s.sleeps.push(d);
            }
        }
    }

}
