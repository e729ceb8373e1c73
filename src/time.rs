//! Frame timing.
//!
//! [`FrameClock`] is the engine's single source of elapsed time. Unlike a
//! free-running timer it never reads the system clock on its own: the host
//! passes the refresh callback's timestamp into [`FrameClock::update`], which
//! keeps frame timing reproducible in tests.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use vexfield::time::FrameClock;
//!
//! let start = Instant::now();
//! let mut clock = FrameClock::starting_at(start);
//!
//! clock.update(start + Duration::from_millis(16));
//! clock.update(start + Duration::from_millis(33));
//!
//! assert_eq!(clock.frame(), 2);
//! assert!((clock.elapsed() - 0.033).abs() < 1e-6);
//! ```

use std::time::{Duration, Instant};

/// Monotonic elapsed time and frame statistics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// When the engine started.
    start: Instant,
    /// Timestamp of the last update.
    last_frame: Instant,
    /// Seconds since start as of the last update.
    elapsed_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    /// Start a clock at the current instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start a clock at a given instant.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_frame: start,
            elapsed_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: start,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Record a frame at `now`. Returns seconds elapsed since start.
    ///
    /// A timestamp earlier than the previous one is treated as no time passing;
    /// elapsed time never goes backwards.
    pub fn update(&mut self, now: Instant) -> f32 {
        let now = now.max(self.last_frame);

        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_secs
    }

    /// Seconds since start, as of the last update.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Frames recorded since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, recalculated every half second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
