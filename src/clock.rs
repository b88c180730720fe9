//! Frame clocks.
//!
//! The render loop derives every time-based angle from a [`Clock`]'s elapsed
//! time rather than from a frame counter, so playback speed does not depend on
//! the display's refresh rate.
//!
//! Time is kept in `f64` seconds. At `f32` precision a clock loses sub-frame
//! resolution after about a day, so narrowing happens only where a value
//! leaves for the GPU or the scene transforms.

use std::cell::Cell;
use std::time::Instant;

/// A monotonic elapsed-time source, in seconds since the last reset.
pub trait Clock {
    /// Seconds elapsed since construction or the last [`reset`](Clock::reset).
    /// Never decreases between resets.
    fn elapsed(&self) -> f64;

    /// Restarts the clock at zero.
    fn reset(&mut self);
}

/// Wall-clock time from [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn reset(&mut self) {
        self.start = Instant::now();
    }
}

/// A clock advanced by hand, for tests and headless stepping.
///
/// Time moves through a shared reference, so a clock owned by a
/// [`RenderLoop`](crate::RenderLoop) can still be stepped via
/// [`RenderLoop::clock`](crate::RenderLoop::clock).
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jumps to `t` seconds. Times earlier than the current one are ignored.
    pub fn set(&self, t: f64) {
        if t.is_finite() && t >= self.now.get() {
            self.now.set(t);
        } else {
            log::warn!(
                "ignoring clock move from {:.3}s to {t}s: elapsed time never decreases",
                self.now.get()
            );
        }
    }

    /// Moves time forward by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        self.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f64 {
        self.now.get()
    }

    fn reset(&mut self) {
        self.now.set(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_monotonic() {
        let clock = ManualClock::new();
        clock.set(10.0);
        clock.set(4.0);
        assert_eq!(clock.elapsed(), 10.0);
        clock.advance(-1.0);
        assert_eq!(clock.elapsed(), 10.0);
        clock.set(f64::NAN);
        assert_eq!(clock.elapsed(), 10.0);
        clock.advance(0.5);
        assert_eq!(clock.elapsed(), 10.5);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut clock = ManualClock::new();
        clock.set(3.0);
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn system_clock_never_decreases() {
        let clock = SystemClock::new();
        let a = clock.elapsed();
        let b = clock.elapsed();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_keeps_frame_resolution_after_days() {
        let clock = ManualClock::new();
        let week = 7.0 * 24.0 * 3600.0;
        clock.set(week);
        clock.advance(1.0 / 120.0);
        let dt = clock.elapsed() - week;
        assert!((dt - 1.0 / 120.0).abs() < 1e-9);
    }
}
