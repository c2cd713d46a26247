//! Hook balance and tuning
//!
//! Every gameplay constant lives here so a session can be rebalanced from a
//! JSON file without recompiling. Missing keys fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {value} ({reason})")]
    Invalid {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },
}

/// Temperature and overheat cycle constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalTuning {
    /// Temperature at session start
    pub initial_temperature: f32,
    /// Temperature passive dissipation pulls toward
    pub ambient_temperature: f32,
    /// Temperature at which Normal turns into Overheating
    pub overheat_threshold: f32,
    /// Seconds spent Overheating before Cooling starts
    pub max_overheat_time: f32,
    /// Instant heat added by a direction switch
    pub rotate_switch_heat: f32,
    /// Forced temperature drop per second while Cooling
    pub cooling_rate: f32,
    /// Idle heat: coefficient x |rotate speed| x hook mass per second
    pub rotate_heat_coefficient: f32,
    /// Launch/retrieve heat: moving mass x speed x coefficient per second
    pub motion_heat_coefficient: f32,
    /// Conduction coefficient for passive dissipation
    pub conduction: f32,
    /// Heat capacity (heat per degree)
    pub heat_capacity: f32,
}

impl Default for ThermalTuning {
    fn default() -> Self {
        Self {
            initial_temperature: 0.0,
            ambient_temperature: 0.0,
            overheat_threshold: 100.0,
            max_overheat_time: 5.0,
            rotate_switch_heat: 5.0,
            cooling_rate: 10.0,
            rotate_heat_coefficient: 0.1,
            motion_heat_coefficient: 0.3,
            conduction: 0.1,
            heat_capacity: 1.0,
        }
    }
}

/// Grab slot constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabTuning {
    /// Heaviest object the hook may seize
    pub max_grabbable_mass: f32,
    /// Instant heat per unit of grabbed mass
    pub grab_heat_per_mass: f32,
    /// Pause before retraction continues after a forced release (seconds)
    pub release_resume_delay: f32,
}

impl Default for GrabTuning {
    fn default() -> Self {
        Self {
            max_grabbable_mass: 5.0,
            grab_heat_per_mass: 2.0,
            release_resume_delay: 0.1,
        }
    }
}

/// Complete hook tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookTuning {
    // === Geometry ===
    pub max_length: f32,
    /// Hook length while waiting to launch
    pub standby_distance: f32,
    pub hook_tip_mass: f32,
    pub ship_mass: f32,
    pub max_health: f32,

    // === Speeds (degrees/s for rotation, units/s for length) ===
    pub base_rotate_speed: f32,
    pub accelerate_rotate_speed: f32,
    pub base_launch_speed: f32,
    pub accelerate_launch_speed: f32,
    pub base_retrieve_speed: f32,
    pub accelerate_retrieve_speed: f32,

    // === Smoothing (max speed change per second) ===
    pub rotation_smooth_rate: f32,
    /// Faster rate used while a direction switch settles
    pub switch_dir_smooth_rate: f32,
    pub length_smooth_rate: f32,

    // === Cooldowns (seconds) ===
    pub rotate_switch_cooldown: f32,
    pub accelerate_cooldown: f32,

    // === Impacts ===
    /// Share of a hazard's destroy momentum that bounces the hook back
    pub impact_retrieve_fraction: f32,

    pub thermal: ThermalTuning,
    pub grab: GrabTuning,
}

impl Default for HookTuning {
    fn default() -> Self {
        Self {
            max_length: 10.0,
            standby_distance: 3.0,
            hook_tip_mass: 0.5,
            ship_mass: 10.0,
            max_health: 100.0,

            base_rotate_speed: 90.0,
            accelerate_rotate_speed: 270.0,
            base_launch_speed: 10.0,
            accelerate_launch_speed: 18.0,
            base_retrieve_speed: 10.0,
            accelerate_retrieve_speed: 22.0,

            rotation_smooth_rate: 120.0,
            switch_dir_smooth_rate: 240.0,
            length_smooth_rate: 20.0,

            rotate_switch_cooldown: 1.0,
            accelerate_cooldown: 2.0,

            impact_retrieve_fraction: 0.7,

            thermal: ThermalTuning::default(),
            grab: GrabTuning::default(),
        }
    }
}

impl HookTuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded hook tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ranges the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("max_length", self.max_length),
            ("hook_tip_mass", self.hook_tip_mass),
            ("ship_mass", self.ship_mass),
            ("max_health", self.max_health),
            ("rotation_smooth_rate", self.rotation_smooth_rate),
            ("switch_dir_smooth_rate", self.switch_dir_smooth_rate),
            ("length_smooth_rate", self.length_smooth_rate),
            ("thermal.heat_capacity", self.thermal.heat_capacity),
            ("thermal.overheat_threshold", self.thermal.overheat_threshold),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    value,
                    reason: "must be positive",
                });
            }
        }

        let non_negative = [
            ("standby_distance", self.standby_distance),
            ("base_rotate_speed", self.base_rotate_speed),
            ("accelerate_rotate_speed", self.accelerate_rotate_speed),
            ("base_launch_speed", self.base_launch_speed),
            ("accelerate_launch_speed", self.accelerate_launch_speed),
            ("base_retrieve_speed", self.base_retrieve_speed),
            ("accelerate_retrieve_speed", self.accelerate_retrieve_speed),
            ("rotate_switch_cooldown", self.rotate_switch_cooldown),
            ("accelerate_cooldown", self.accelerate_cooldown),
            ("impact_retrieve_fraction", self.impact_retrieve_fraction),
            ("thermal.initial_temperature", self.thermal.initial_temperature),
            ("thermal.ambient_temperature", self.thermal.ambient_temperature),
            ("thermal.max_overheat_time", self.thermal.max_overheat_time),
            ("thermal.rotate_switch_heat", self.thermal.rotate_switch_heat),
            ("thermal.cooling_rate", self.thermal.cooling_rate),
            ("thermal.rotate_heat_coefficient", self.thermal.rotate_heat_coefficient),
            ("thermal.motion_heat_coefficient", self.thermal.motion_heat_coefficient),
            ("thermal.conduction", self.thermal.conduction),
            ("grab.max_grabbable_mass", self.grab.max_grabbable_mass),
            ("grab.grab_heat_per_mass", self.grab.grab_heat_per_mass),
            ("grab.release_resume_delay", self.grab.release_resume_delay),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    value,
                    reason: "must be zero or positive",
                });
            }
        }

        if self.standby_distance >= self.max_length {
            return Err(TuningError::Invalid {
                field: "standby_distance",
                value: self.standby_distance,
                reason: "must be shorter than max_length",
            });
        }

        // Above 1.0 the equilibrium temperature sits so low that overheat becomes unreachable
        if self.thermal.conduction > 1.0 {
            log::warn!(
                "thermal.conduction {} is above 1.0; overheat may never trigger",
                self.thermal.conduction
            );
        }

        if self.cooling_may_heat() {
            log::warn!(
                "peak heat generation {:.1}/s outpaces cooling; temperature can rise while Cooling",
                self.peak_cooling_heat_rate()
            );
        }

        Ok(())
    }

    /// Highest heat generation reachable while Cooling
    ///
    /// Grabs are released and acceleration is off in Cooling, but speeds may
    /// still be settling down from their accelerated values.
    pub fn peak_cooling_heat_rate(&self) -> f32 {
        let t = &self.thermal;
        let rotating = t.rotate_heat_coefficient
            * self.base_rotate_speed.max(self.accelerate_rotate_speed)
            * self.hook_tip_mass;
        let launching = self.hook_tip_mass
            * self.base_launch_speed.max(self.accelerate_launch_speed)
            * t.motion_heat_coefficient;
        // Unloaded retrieval runs at twice the base speed
        let retrieving = self.hook_tip_mass
            * 2.0
            * self.base_retrieve_speed.max(self.accelerate_retrieve_speed)
            * t.motion_heat_coefficient;
        rotating.max(launching).max(retrieving)
    }

    /// Whether temperature could rise during Cooling with this tuning
    pub fn cooling_may_heat(&self) -> bool {
        let t = &self.thermal;
        let min_loss = t.conduction * (t.overheat_threshold - t.ambient_temperature).max(0.0)
            + t.cooling_rate * t.heat_capacity;
        self.peak_cooling_heat_rate() > min_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(HookTuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = HookTuning::from_json(
            r#"{ "max_length": 14.0, "thermal": { "overheat_threshold": 80.0 } }"#,
        )
        .unwrap();
        assert_eq!(tuning.max_length, 14.0);
        assert_eq!(tuning.thermal.overheat_threshold, 80.0);
        assert_eq!(tuning.standby_distance, 3.0);
        assert_eq!(tuning.thermal.cooling_rate, 10.0);
        assert_eq!(tuning.grab.max_grabbable_mass, 5.0);
    }

    #[test]
    fn test_rejects_standby_past_max_length() {
        let err = HookTuning::from_json(r#"{ "standby_distance": 12.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "standby_distance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let mut tuning = HookTuning::default();
        tuning.grab.max_grabbable_mass = -1.0;
        assert!(tuning.validate().is_err());

        let mut tuning = HookTuning::default();
        tuning.thermal.heat_capacity = f32::NAN;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_cooling_heat_check() {
        let tuning = HookTuning::default();
        // 0.1 * 270 * 0.5 against 0.1 * 100 + 10
        assert!((tuning.peak_cooling_heat_rate() - 13.5).abs() < 1e-4);
        assert!(!tuning.cooling_may_heat());

        let mut hot = HookTuning::default();
        hot.thermal.motion_heat_coefficient = 3.0;
        assert!(hot.cooling_may_heat());
        // Still loadable; only warned about
        assert!(hot.validate().is_ok());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = HookTuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip_preserves_values() {
        let mut tuning = HookTuning::default();
        tuning.accelerate_launch_speed = 25.0;
        let json = tuning.to_json().unwrap();
        let parsed = HookTuning::from_json(&json).unwrap();
        assert_eq!(parsed.accelerate_launch_speed, 25.0);
    }
}
