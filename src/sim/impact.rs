//! Hook geometry and impact formulas
//!
//! Where the tip is, whether it left the play field, and how hard it hits.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::heading;

/// Momentum carried by the hook tip (damage dealt on contact)
#[inline]
pub fn hook_momentum(launch_speed: f32, tip_mass: f32) -> f32 {
    launch_speed * tip_mass
}

/// Reduced mass of a two-body collision
#[inline]
pub fn reduced_mass(m1: f32, m2: f32) -> f32 {
    let total = m1 + m2;
    if total <= 0.0 { 0.0 } else { m1 * m2 / total }
}

/// Impact damage for a two-body collision (reduced mass x relative speed)
#[inline]
pub fn impact_damage(m1: f32, m2: f32, relative_speed: f32) -> f32 {
    reduced_mass(m1, m2) * relative_speed.abs()
}

/// Hook tip position for an origin, angle (degrees) and length
#[inline]
pub fn tip_position(origin: Vec2, rotation_deg: f32, length: f32) -> Vec2 {
    origin + heading(rotation_deg) * length
}

/// Renderer-facing hook geometry for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HookVisual {
    /// Rope start (the ship)
    pub rope_start: Vec2,
    /// Rope end (the hook tip)
    pub tip: Vec2,
    /// Tip sprite rotation (degrees), facing along the rope
    pub tip_angle_deg: f32,
    pub length: f32,
}

impl HookVisual {
    pub fn new(origin: Vec2, rotation_deg: f32, length: f32) -> Self {
        let tip = tip_position(origin, rotation_deg, length);
        let dir = (tip - origin).normalize_or_zero();
        Self {
            rope_start: origin,
            tip,
            tip_angle_deg: dir.y.atan2(dir.x).to_degrees(),
            length,
        }
    }
}

/// Axis-aligned play field with a tolerance buffer at the edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    pub min: Vec2,
    pub max: Vec2,
    /// Distance past the edge still treated as inside
    pub buffer: f32,
}

impl PlayField {
    /// Field centered on the origin
    pub fn centered(half_width: f32, half_height: f32, buffer: f32) -> Self {
        Self {
            min: Vec2::new(-half_width, -half_height),
            max: Vec2::new(half_width, half_height),
            buffer,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x - self.buffer
            && point.x <= self.max.x + self.buffer
            && point.y >= self.min.y - self.buffer
            && point.y <= self.max.y + self.buffer
    }

    pub fn is_outside(&self, point: Vec2) -> bool {
        !self.contains(point)
    }
}
