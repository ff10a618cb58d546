//! Frame time sources.
//!
//! The renderers never schedule frames themselves. Whoever drives them (a window
//! redraw callback, a browser interval, a test) samples a `FrameClock` and passes the
//! elapsed milliseconds to `render`.

pub use instant::Instant;

/// Source of "milliseconds since the animation started".
pub trait FrameClock {
    fn elapsed_ms(&mut self) -> f64;
}

/// Wall-clock time since construction (or the last reset).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn elapsed_ms(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Synthetic clock that advances by a fixed step per sample.
///
/// The first sample returns the start time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualClock {
    now_ms: f64,
    step_ms: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            now_ms: start_ms,
            step_ms,
        }
    }

    /// 60 Hz ticks starting at zero.
    pub fn sixty_hz() -> Self {
        Self::new(0.0, 1000.0 / 60.0)
    }

    pub fn set(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

impl FrameClock for ManualClock {
    fn elapsed_ms(&mut self) -> f64 {
        let now = self.now_ms;
        self.now_ms += self.step_ms;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_steps_after_each_sample() {
        let mut clock = ManualClock::new(10.0, 5.0);
        assert_eq!(clock.elapsed_ms(), 10.0);
        assert_eq!(clock.elapsed_ms(), 15.0);
        clock.set(100.0);
        assert_eq!(clock.elapsed_ms(), 100.0);
        assert_eq!(clock.now_ms(), 105.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.elapsed_ms();
        let b = clock.elapsed_ms();
        assert!(a >= 0.0);
        assert!(b >= a);
    }
}
