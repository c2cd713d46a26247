//! Platform abstraction layer
//!
//! Host-side glue shared by the native and browser builds:
//! - Fixed timestep accumulator
//! - Browser binding (`web`, wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Turns variable frame deltas into fixed simulation steps
#[derive(Debug, Clone)]
pub struct FixedStepLoop {
    accumulator: f32,
    step: f32,
    max_substeps: u32,
}

impl Default for FixedStepLoop {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStepLoop {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            accumulator: 0.0,
            step,
            max_substeps,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Time banked but not yet simulated
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    /// Bank a frame delta and run `step_fn` once per whole step
    ///
    /// Returns the number of steps taken. Long frames are clamped so a
    /// stalled tab cannot trigger a spiral of death.
    pub fn advance<F: FnMut(f32)>(&mut self, frame_dt: f32, mut step_fn: F) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            step_fn(self.step);
            self.accumulator -= self.step;
            substeps += 1;
        }

        // Drop whatever the substep cap left behind
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_whole_steps_only() {
        let mut fixed = FixedStepLoop::new(0.01, 8);
        let mut calls = 0;
        assert_eq!(fixed.advance(0.035, |_| calls += 1), 3);
        assert_eq!(calls, 3);
        assert!((fixed.pending() - 0.005).abs() < 1e-5);

        // Remainder carries into the next frame
        assert_eq!(fixed.advance(0.006, |_| {}), 1);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut fixed = FixedStepLoop::default();
        let steps = fixed.advance(5.0, |dt| assert_eq!(dt, SIM_DT));
        // 0.1s of 60Hz steps, capped at MAX_SUBSTEPS
        assert!(steps <= MAX_SUBSTEPS);
        assert!(fixed.pending() < SIM_DT + 1e-6);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut fixed = FixedStepLoop::default();
        assert_eq!(fixed.advance(-1.0, |_| {}), 0);
        assert_eq!(fixed.pending(), 0.0);
    }
}
