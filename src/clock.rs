//! Frame clocks that drive the bubble field.
//!
//! The field only needs a monotonic "now" in milliseconds to gate spawn
//! batches. [`FrameClock`] is the per-frame timer a render loop ticks;
//! [`ManualClock`] is set explicitly by the caller.
//!
//! # Example
//!
//! ```ignore
//! use electrolysis::clock::{Clock, FrameClock};
//!
//! let mut clock = FrameClock::new();
//!
//! // In your render loop:
//! clock.tick();
//! field.tick(&clock);
//! println!("Frame {} at {:.1} fps", clock.frame(), clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Source of the current time for spawn gating.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin. Never decreases.
    fn now_ms(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Per-frame timer for a render loop.
///
/// In wall-clock mode `now_ms` is the time elapsed at the last [`tick`].
/// With a fixed step it is `frame * step`, which makes runs reproducible.
///
/// [`tick`]: FrameClock::tick
#[derive(Debug)]
pub struct FrameClock {
    /// When the clock was created.
    start: Instant,
    /// When the last tick occurred.
    last_tick: Instant,
    /// Time at the last tick in milliseconds.
    now_ms: f64,
    /// Time between the last two ticks in milliseconds.
    delta_ms: f64,
    /// Ticks since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
    /// Fixed step in milliseconds for deterministic runs.
    fixed_step_ms: Option<f64>,
}

impl FrameClock {
    /// Create a wall-clock frame timer starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            now_ms: 0.0,
            delta_ms: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            fixed_step_ms: None,
        }
    }

    /// Create a clock that advances exactly `step_ms` per tick.
    pub fn fixed(step_ms: f64) -> Self {
        Self {
            fixed_step_ms: Some(step_ms.max(0.0)),
            ..Self::new()
        }
    }

    /// Advance one frame. Call once per rendered frame.
    ///
    /// Returns `(now_ms, delta_ms)` for convenience.
    pub fn tick(&mut self) -> (f64, f64) {
        let now = Instant::now();
        self.frame_count += 1;

        match self.fixed_step_ms {
            Some(step) => {
                self.delta_ms = step;
                self.now_ms = step * self.frame_count as f64;
            }
            None => {
                self.delta_ms = now.duration_since(self.last_tick).as_secs_f64() * 1000.0;
                self.now_ms = now.duration_since(self.start).as_secs_f64() * 1000.0;
            }
        }
        self.last_tick = now;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.now_ms, self.delta_ms)
    }

    /// Ticks since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Milliseconds between the last two ticks.
    #[inline]
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    /// Measured frames per second (wall clock, even in fixed-step mode).
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed_step_ms.is_some()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrameClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// Clock whose time only moves when told to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now_ms: start_ms }
    }

    /// Move time forward. Negative amounts are ignored.
    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms.max(0.0);
    }

    /// Jump to `ms` if it is not in the past.
    pub fn set(&mut self, ms: f64) {
        self.now_ms = self.now_ms.max(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_frame_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.now_ms(), 0.0);
        assert!(!clock.is_fixed());
    }

    #[test]
    fn test_frame_clock_tick() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(5));
        let (now, delta) = clock.tick();

        assert!(now >= 5.0);
        assert!(delta >= 5.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_fixed_step() {
        let mut clock = FrameClock::fixed(16.0);
        thread::sleep(Duration::from_millis(20));
        clock.tick();
        clock.tick();

        assert_eq!(clock.now_ms(), 32.0);
        assert_eq!(clock.delta_ms(), 16.0);
    }

    #[test]
    fn test_manual_clock_is_monotonic() {
        let mut clock = ManualClock::new(100.0);
        clock.advance(50.0);
        assert_eq!(clock.now_ms(), 150.0);

        clock.advance(-10.0);
        clock.set(20.0);
        assert_eq!(clock.now_ms(), 150.0);

        clock.set(400.0);
        assert_eq!((&clock).now_ms(), 400.0);
    }
}
