//! Grapple Hook - hook simulation core for an arcade space game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (hook state machine, thermal model, grab arbitration)
//! - `tuning`: Data-driven hook balance
//! - `platform`: Host loop glue (fixed timestep, browser binding)

pub mod platform;
pub mod sim;
pub mod tuning;

pub use tuning::{GrabTuning, HookTuning, ThermalTuning, TuningError};

use glam::Vec2;

/// Host loop constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta a host may feed the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Unit vector for an angle in degrees
#[inline]
pub fn heading(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}
