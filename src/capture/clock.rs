// Capture clocks
//
// The session only needs "seconds since start()". Production code uses a
// monotonic Instant; tests drive a ManualClock so transitions happen at
// exact, repeatable times.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Time source for a capture session
pub trait CaptureClock {
    /// Set t=0 to the current instant
    fn anchor(&mut self);

    /// Seconds elapsed since the last `anchor()`
    fn elapsed_secs(&self) -> f64;
}

/// Wall-independent clock backed by `Instant`
#[derive(Debug, Default)]
pub struct MonotonicClock {
    anchor: Option<Instant>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaptureClock for MonotonicClock {
    fn anchor(&mut self) {
        self.anchor = Some(Instant::now());
    }

    fn elapsed_secs(&self) -> f64 {
        self.anchor
            .map(|anchor| anchor.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Clock advanced by hand, in whole milliseconds
///
/// Clones share the same underlying time so a test can keep a handle
/// while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
    anchor_ms: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `secs` (negative values are ignored)
    pub fn advance(&self, secs: f64) {
        let delta = (secs.max(0.0) * 1000.0).round() as u64;
        self.now_ms.fetch_add(delta, Ordering::Relaxed);
    }
}

impl CaptureClock for ManualClock {
    fn anchor(&mut self) {
        self.anchor_ms = self.now_ms.load(Ordering::Relaxed);
    }

    fn elapsed_secs(&self) -> f64 {
        let now = self.now_ms.load(Ordering::Relaxed);
        now.saturating_sub(self.anchor_ms) as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_anchor() {
        let handle = ManualClock::new();
        let mut clock = handle.clone();
        handle.advance(5.0);
        clock.anchor();
        assert_eq!(clock.elapsed_secs(), 0.0);

        handle.advance(2.5);
        assert_eq!(clock.elapsed_secs(), 2.5);
    }

    #[test]
    fn test_monotonic_clock_unanchored_is_zero() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.elapsed_secs(), 0.0);
    }

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let mut clock = MonotonicClock::new();
        clock.anchor();
        let a = clock.elapsed_secs();
        let b = clock.elapsed_secs();
        assert!(b >= a);
    }
}
