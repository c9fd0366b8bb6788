//! Clock Seam
//!
//! Key derivation depends on "now": the month bucket and the sort key are
//! both functions of the instant a line is read off the stream. Taking the
//! clock as an explicit dependency keeps that derivation deterministic in
//! tests instead of coupling it to the wall clock.
//!
//! `SystemClock` is also where the same-nanosecond collision window is
//! closed for a single process: it never returns the same reading twice,
//! so two lines ingested back-to-back always get distinct sort keys even
//! if the OS clock has not advanced (or has stepped backwards).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of nanosecond timestamps for key derivation.
pub trait Clock: Send + Sync {
    /// Current instant in nanoseconds since the unix epoch.
    fn now_nanos(&self) -> i64;
}

/// Wall-clock backed clock with strictly increasing readings.
///
/// Each call returns `max(wall_clock, previous_reading + 1)`, so sort keys
/// derived from one `SystemClock` are strictly monotonic regardless of
/// clock resolution or small backward steps.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_nanos(&self) -> i64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0);

        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = wall.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(observed) => prev = observed,
            }
        }
    }
}

/// Test clock that starts at a fixed instant and advances by a fixed step
/// on every reading.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
    step: i64,
}

impl ManualClock {
    /// Clock starting at `start_nanos`, advancing 1ns per reading.
    pub fn new(start_nanos: i64) -> Self {
        Self::with_step(start_nanos, 1)
    }

    /// Clock starting at `start_nanos`, advancing `step` per reading.
    pub fn with_step(start_nanos: i64, step: i64) -> Self {
        Self {
            now: AtomicI64::new(start_nanos),
            step,
        }
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, nanos: i64) {
        self.now.store(nanos, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_strictly_increases() {
        let clock = SystemClock::new();
        let mut prev = clock.now_nanos();
        for _ in 0..10_000 {
            let next = clock.now_nanos();
            assert!(next > prev, "clock reading did not advance");
            prev = next;
        }
    }

    #[test]
    fn test_system_clock_tracks_wall_time() {
        let clock = SystemClock::new();
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as i64;
        let reading = clock.now_nanos();
        // Within a generous minute of the wall clock.
        assert!((reading - wall).abs() < 60 * 1_000_000_000);
    }

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::with_step(100, 10);
        assert_eq!(clock.now_nanos(), 100);
        assert_eq!(clock.now_nanos(), 110);
        clock.set(5_000);
        assert_eq!(clock.now_nanos(), 5_000);
    }
}
