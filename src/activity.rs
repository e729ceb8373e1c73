//! Activity smoothing.
//!
//! The caller sets a target level in `[0, 1]` whenever the agent's state
//! changes; the render loop ticks the smoother once per frame so the visible
//! level glides toward the target instead of snapping.
//!
//! # Example
//!
//! ```
//! use vexfield::activity::ActivitySmoother;
//!
//! let mut smoother = ActivitySmoother::new(0.06);
//! smoother.set_target(0.8);
//! for _ in 0..120 {
//!     smoother.tick();
//! }
//! assert!(smoother.current() > 0.75);
//! ```

/// Default per-tick smoothing coefficient.
///
/// At 60 frames per second this settles within 1% of the target in a little
/// over a second.
pub const DEFAULT_SMOOTHING: f32 = 0.06;

/// Snapshot of the smoother's two values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActivityState {
    /// Smoothed level, updated once per tick.
    pub current: f32,
    /// Level the smoother is approaching. Always in `[0, 1]`.
    pub target: f32,
}

/// Exponential approach of `current` toward `target`.
#[derive(Debug, Clone)]
pub struct ActivitySmoother {
    state: ActivityState,
    smoothing: f32,
}

impl ActivitySmoother {
    /// Create a smoother at rest (`current == target == 0`).
    ///
    /// `smoothing` is clamped to `(0, 1]`; a non-finite value falls back to
    /// [`DEFAULT_SMOOTHING`].
    pub fn new(smoothing: f32) -> Self {
        let smoothing = if smoothing.is_finite() {
            smoothing.clamp(f32::EPSILON, 1.0)
        } else {
            DEFAULT_SMOOTHING
        };
        Self {
            state: ActivityState::default(),
            smoothing,
        }
    }

    /// Create a smoother whose current value starts at `current`.
    pub fn starting_at(smoothing: f32, current: f32) -> Self {
        let mut smoother = Self::new(smoothing);
        smoother.state.current = clamp_level(current);
        smoother.state.target = smoother.state.current;
        smoother
    }

    /// Set the level to approach. Overwrites any target set since the last tick.
    pub fn set_target(&mut self, level: f32) {
        self.state.target = clamp_level(level);
    }

    /// Advance one frame and return the new current value.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        self.state.current += (self.state.target - self.state.current) * self.smoothing;
        self.state.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.state.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.state.target
    }

    #[inline]
    pub fn state(&self) -> &ActivityState {
        &self.state
    }

    /// The per-tick coefficient `k`.
    #[inline]
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Number of ticks after which the remaining gap is at most `tolerance`
    /// times the gap at tick zero, for any starting point and target.
    ///
    /// The gap shrinks by `(1 - k)` per tick, so this is
    /// `ceil(ln(tolerance) / ln(1 - k))`.
    pub fn settle_ticks(&self, tolerance: f32) -> u32 {
        if tolerance >= 1.0 {
            return 0;
        }
        let retain = 1.0 - self.smoothing as f64;
        if retain <= 0.0 {
            return 1;
        }
        let tolerance = (tolerance as f64).max(f64::MIN_POSITIVE);
        (tolerance.ln() / retain.ln()).ceil() as u32
    }
}

impl Default for ActivitySmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING)
    }
}

/// Clamp an arbitrary caller value into `[0, 1]`. NaN maps to 0.
#[inline]
pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_target_clamps() {
        let mut s = ActivitySmoother::default();
        for (input, expected) in [
            (-3.0, 0.0),
            (0.0, 0.0),
            (0.25, 0.25),
            (1.0, 1.0),
            (7.5, 1.0),
            (f32::INFINITY, 1.0),
            (f32::NEG_INFINITY, 0.0),
            (f32::NAN, 0.0),
        ] {
            s.set_target(input);
            assert_eq!(s.target(), expected, "input {input}");
        }
    }

    #[test]
    fn test_set_target_overwrites_pending() {
        let mut s = ActivitySmoother::new(0.5);
        s.set_target(1.0);
        s.set_target(0.2);
        s.set_target(0.4);
        s.tick();
        assert!((s.current() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_tick_is_geometric() {
        let k = 0.06;
        let mut s = ActivitySmoother::starting_at(k, 0.1);
        s.set_target(0.9);
        let initial_gap = (0.1f32 - 0.9).abs() as f64;
        let mut previous_gap = initial_gap;

        for n in 1..=200 {
            s.tick();
            let gap = (s.current() - 0.9).abs() as f64;
            let expected = initial_gap * (1.0 - k as f64).powi(n);
            assert!((gap - expected).abs() < 1e-5, "tick {n}: {gap} vs {expected}");
            assert!(gap <= previous_gap);
            previous_gap = gap;
        }
    }

    #[test]
    fn test_settle_ticks_reaches_one_percent() {
        for k in [0.01, 0.03, 0.06, 0.2, 0.5, 0.99] {
            let mut s = ActivitySmoother::new(k);
            s.set_target(1.0);
            let ticks = s.settle_ticks(0.01);
            for _ in 0..ticks {
                s.tick();
            }
            assert!(1.0 - s.current() <= 0.01 + 1e-5, "k = {k}, ticks = {ticks}");
        }
    }

    #[test]
    fn test_settle_ticks_default_coefficient() {
        assert_eq!(ActivitySmoother::default().settle_ticks(0.01), 75);
    }

    #[test]
    fn test_bad_coefficient_falls_back() {
        assert_eq!(ActivitySmoother::new(f32::NAN).smoothing(), DEFAULT_SMOOTHING);
        assert_eq!(ActivitySmoother::new(4.0).smoothing(), 1.0);
        assert!(ActivitySmoother::new(-1.0).smoothing() > 0.0);
    }
}
