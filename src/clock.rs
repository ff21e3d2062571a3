//! Clock abstraction for deterministic testing.
//!
//! The engine only ever sees plain seconds. Hosts without their own
//! simulation time use `SystemClock`; tests and the headless simulator
//! use `TestClock` with manual time advancement.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Trait abstracting time sources for testability.
pub trait Clock: Send + Sync {
    /// Monotonic seconds since the clock was created.
    fn now_s(&self) -> f64;
}

/// Production clock backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_s(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Test clock with manually controlled time, starting at zero.
#[derive(Debug, Default)]
pub struct TestClock {
    elapsed: Mutex<Duration>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += duration;
    }

    /// Advance time by fractional seconds; negative values are ignored.
    pub fn advance_s(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.advance(Duration::from_secs_f64(seconds));
        }
    }
}

impl Clock for TestClock {
    fn now_s(&self) -> f64 {
        self.elapsed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let t0 = clock.now_s();
        assert!(t0 >= 0.0);
        assert!(clock.now_s() >= t0);
    }

    #[test]
    fn test_test_clock_advance() {
        let clock = TestClock::new();
        assert_eq!(clock.now_s(), 0.0);

        clock.advance(Duration::from_secs(5));
        assert_eq!(clock.now_s(), 5.0);

        clock.advance_s(0.25);
        assert!((clock.now_s() - 5.25).abs() < 1e-9);

        clock.advance_s(-1.0);
        assert!((clock.now_s() - 5.25).abs() < 1e-9);
    }

    #[test]
    fn test_clock_trait_object() {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        assert!(clock.now_s() >= 0.0);

        let test_clock: Arc<dyn Clock> = Arc::new(TestClock::new());
        assert_eq!(test_clock.now_s(), 0.0);
    }
}
