//! Thermal model
//!
//! Tracks hook temperature with explicit-Euler heat exchange and drives the
//! Normal -> Overheating -> Cooling -> Normal throttling cycle.
//!
//! Temperature only falls monotonically during Cooling while heat generation
//! stays under `cooling_rate` plus conduction losses; see
//! `HookTuning::cooling_may_heat`.

use serde::{Deserialize, Serialize};

use super::state::MotionState;
use crate::tuning::ThermalTuning;

/// Overheat cycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverheatPhase {
    #[default]
    Normal,
    /// Over threshold; abilities locked until the overheat window runs out
    Overheating,
    /// Forced cooldown until temperature drops back under threshold
    Cooling,
}

/// Mutable thermal state (1:1 with the hook)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ThermalState {
    pub temperature: f32,
    pub overheat_phase: OverheatPhase,
    /// Seconds spent in the current Overheating phase
    pub overheat_elapsed: f32,
}

/// What the hook is doing this tick, for heat generation
#[derive(Debug, Clone, Copy)]
pub struct HeatLoad {
    pub motion: MotionState,
    /// |rotate speed| when parked, otherwise launch/retrieve speed
    pub speed: f32,
    pub grabbed_mass: f32,
}

/// Phase changes that happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThermalEvents {
    pub entered_overheat: bool,
    pub entered_cooling: bool,
    pub entered_normal: bool,
}

impl ThermalEvents {
    pub fn is_empty(&self) -> bool {
        !(self.entered_overheat || self.entered_cooling || self.entered_normal)
    }
}

/// Temperature integrator and overheat state machine
#[derive(Debug, Clone)]
pub struct ThermalModel {
    tuning: ThermalTuning,
    hook_mass: f32,
    pub(crate) state: ThermalState,
}

impl ThermalModel {
    pub fn new(tuning: &ThermalTuning, hook_mass: f32) -> Self {
        Self {
            tuning: tuning.clone(),
            hook_mass,
            state: ThermalState {
                temperature: tuning.initial_temperature,
                overheat_phase: OverheatPhase::Normal,
                overheat_elapsed: 0.0,
            },
        }
    }

    /// Back to session-start values
    pub fn reset(&mut self) {
        self.state = ThermalState {
            temperature: self.tuning.initial_temperature,
            overheat_phase: OverheatPhase::Normal,
            overheat_elapsed: 0.0,
        };
    }

    pub fn state(&self) -> &ThermalState {
        &self.state
    }

    pub fn temperature(&self) -> f32 {
        self.state.temperature
    }

    pub fn phase(&self) -> OverheatPhase {
        self.state.overheat_phase
    }

    pub fn tuning(&self) -> &ThermalTuning {
        &self.tuning
    }

    /// Abilities (accelerate, direction switch) are only available in Normal
    pub fn is_normal(&self) -> bool {
        self.state.overheat_phase == OverheatPhase::Normal
    }

    /// Inject instantaneous heat, whatever the phase
    pub fn add_heat(&mut self, amount: f32) {
        self.state.temperature = (self.state.temperature + amount).max(0.0);
    }

    /// Heat generated per second by the given load
    pub fn heat_rate(&self, load: &HeatLoad) -> f32 {
        match load.motion {
            MotionState::ReadyToLaunch => {
                self.tuning.rotate_heat_coefficient * load.speed * self.hook_mass
            }
            MotionState::Launching => {
                self.hook_mass * load.speed * self.tuning.motion_heat_coefficient
            }
            MotionState::Retrieving => {
                (self.hook_mass + load.grabbed_mass)
                    * load.speed
                    * self.tuning.motion_heat_coefficient
            }
        }
    }

    /// Passive heat loss per second (Newton's law of cooling)
    pub fn dissipation_rate(&self) -> f32 {
        (self.state.temperature - self.tuning.ambient_temperature) * self.tuning.conduction
    }

    /// Integrate one tick of heat exchange, then advance the overheat phase
    pub fn tick(&mut self, dt: f32, load: HeatLoad) -> ThermalEvents {
        let mut events = ThermalEvents::default();

        let gain = self.heat_rate(&load);
        let loss = self.dissipation_rate();
        let delta = (gain - loss) * dt / self.tuning.heat_capacity;
        self.state.temperature = (self.state.temperature + delta).max(0.0);

        match self.state.overheat_phase {
            OverheatPhase::Normal => {
                if self.state.temperature >= self.tuning.overheat_threshold {
                    self.state.overheat_phase = OverheatPhase::Overheating;
                    self.state.overheat_elapsed = 0.0;
                    events.entered_overheat = true;
                    log::info!("Overheat at {:.1}°", self.state.temperature);
                }
            }
            OverheatPhase::Overheating => {
                self.state.overheat_elapsed += dt;
                if self.state.overheat_elapsed >= self.tuning.max_overheat_time {
                    self.state.overheat_phase = OverheatPhase::Cooling;
                    self.state.overheat_elapsed = 0.0;
                    events.entered_cooling = true;
                    log::info!("Cooling down from {:.1}°", self.state.temperature);
                }
            }
            OverheatPhase::Cooling => {
                self.state.temperature =
                    (self.state.temperature - self.tuning.cooling_rate * dt).max(0.0);
                if self.state.temperature <= self.tuning.overheat_threshold {
                    self.state.overheat_phase = OverheatPhase::Normal;
                    events.entered_normal = true;
                    log::info!("Thermal back to normal at {:.1}°", self.state.temperature);
                }
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle(speed: f32) -> HeatLoad {
        HeatLoad {
            motion: MotionState::ReadyToLaunch,
            speed,
            grabbed_mass: 0.0,
        }
    }

    fn model(tuning: ThermalTuning) -> ThermalModel {
        ThermalModel::new(&tuning, 0.5)
    }

    #[test]
    fn test_tick_crosses_threshold_into_overheat() {
        let mut thermal = model(ThermalTuning {
            conduction: 0.0,
            ..Default::default()
        });
        thermal.state.temperature = 90.0;
        thermal.add_heat(15.0);

        let events = thermal.tick(1.0 / 60.0, idle(0.0));
        assert!((thermal.temperature() - 105.0).abs() < 1e-4);
        assert_eq!(thermal.phase(), OverheatPhase::Overheating);
        assert!(events.entered_overheat);
        assert_eq!(thermal.state().overheat_elapsed, 0.0);
    }

    #[test]
    fn test_dissipation_is_explicit_euler() {
        let mut thermal = model(ThermalTuning::default());
        thermal.state.temperature = 50.0;
        thermal.tick(0.1, idle(0.0));
        // 50 - (50 * 0.1) * 0.1
        assert!((thermal.temperature() - 49.5).abs() < 1e-4);
    }

    #[test]
    fn test_heat_capacity_scales_change() {
        let mut thermal = model(ThermalTuning {
            conduction: 0.0,
            heat_capacity: 2.0,
            ..Default::default()
        });
        let load = HeatLoad {
            motion: MotionState::Launching,
            speed: 10.0,
            grabbed_mass: 0.0,
        };
        thermal.tick(1.0, load);
        // 0.5 mass * 10 speed * 0.3 coefficient / 2 capacity
        assert!((thermal.temperature() - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_heat_rates_follow_motion() {
        let thermal = model(ThermalTuning::default());
        assert!((thermal.heat_rate(&idle(90.0)) - 4.5).abs() < 1e-4);

        let retrieving = HeatLoad {
            motion: MotionState::Retrieving,
            speed: 10.0,
            grabbed_mass: 2.0,
        };
        assert!((thermal.heat_rate(&retrieving) - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_overheat_runs_full_cycle() {
        let mut thermal = model(ThermalTuning {
            conduction: 0.0,
            max_overheat_time: 1.0,
            ..Default::default()
        });
        thermal.add_heat(120.0);
        assert!(thermal.tick(0.1, idle(0.0)).entered_overheat);

        // Nine more ticks stay in Overheating, the tenth flips to Cooling
        for _ in 0..9 {
            assert!(thermal.tick(0.1, idle(0.0)).is_empty());
            assert_eq!(thermal.phase(), OverheatPhase::Overheating);
        }
        assert!(thermal.tick(0.1 + 1e-4, idle(0.0)).entered_cooling);

        let mut previous = thermal.temperature();
        let mut restored = false;
        for _ in 0..100 {
            let events = thermal.tick(0.1, idle(0.0));
            assert!(thermal.temperature() <= previous);
            previous = thermal.temperature();
            if events.entered_normal {
                restored = true;
                break;
            }
        }
        assert!(restored);
        assert_eq!(thermal.phase(), OverheatPhase::Normal);
        // Cooling stops at the threshold rather than zeroing
        assert!(thermal.temperature() > 90.0);
    }

    #[test]
    fn test_overheat_does_not_recheck_threshold() {
        let mut thermal = model(ThermalTuning {
            conduction: 0.0,
            ..Default::default()
        });
        thermal.add_heat(100.0);
        thermal.tick(0.1, idle(0.0));
        assert_eq!(thermal.phase(), OverheatPhase::Overheating);

        thermal.add_heat(-80.0);
        thermal.tick(0.1, idle(0.0));
        assert_eq!(thermal.phase(), OverheatPhase::Overheating);
    }

    #[test]
    fn test_add_heat_ignores_phase_and_floors_at_zero() {
        let mut thermal = model(ThermalTuning::default());
        thermal.state.overheat_phase = OverheatPhase::Cooling;
        thermal.add_heat(7.0);
        assert_eq!(thermal.temperature(), 7.0);
        thermal.add_heat(-20.0);
        assert_eq!(thermal.temperature(), 0.0);
    }

    #[test]
    fn test_reset_restores_initial_temperature() {
        let mut thermal = model(ThermalTuning {
            initial_temperature: 12.0,
            ..Default::default()
        });
        thermal.add_heat(200.0);
        thermal.tick(0.1, idle(0.0));
        thermal.reset();
        assert_eq!(thermal.temperature(), 12.0);
        assert_eq!(thermal.phase(), OverheatPhase::Normal);
    }
}
