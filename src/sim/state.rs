//! Hook state and core simulation types
//!
//! Everything the host needs to render or display the hook lives here.

use serde::{Deserialize, Serialize};

use super::grab::{ObjectId, RejectReason};
use super::thermal::OverheatPhase;
use crate::tuning::HookTuning;

/// Current motion phase of the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionState {
    /// Parked at standby distance, rotating around the ship
    #[default]
    ReadyToLaunch,
    /// Extending outward
    Launching,
    /// Pulling back toward the ship
    Retrieving,
}

/// Rotation direction while parked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationDir {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl RotationDir {
    /// Sign applied to rotate speed
    pub fn sign(self) -> f32 {
        match self {
            RotationDir::Clockwise => 1.0,
            RotationDir::CounterClockwise => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            RotationDir::Clockwise => RotationDir::CounterClockwise,
            RotationDir::CounterClockwise => RotationDir::Clockwise,
        }
    }
}

/// Why a retrieval started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrieveCause {
    /// Hook reached max length
    MaxLength,
    /// Hook tip left the play field
    OutOfBounds,
    /// Player recalled the hook
    Manual,
    /// An object was seized
    Grabbed,
    /// Candidate was too heavy to seize
    Overweight,
    /// Hit a hazard hard enough to bounce back
    Impact,
    /// Thermal model forced the hook home
    Overheat,
    /// A collaborator called `force_retrieve`
    External,
}

/// Gameplay events emitted during a tick (for audio/UI/collaborators)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HookEvent {
    Launched,
    RetrieveStarted { cause: RetrieveCause },
    /// Hook is back at standby distance
    Docked,
    DirectionSwitched { dir: RotationDir },
    AccelerationStarted,
    AccelerationStopped,
    GrabAccepted { id: ObjectId, mass: f32 },
    GrabRejected { id: ObjectId, reason: RejectReason },
    Harvested { objects: usize, score: i32 },
    Released { objects: usize },
    HazardStruck { id: ObjectId, momentum: f32 },
    OverheatEntered,
    /// Overheat window ran out; shields and other heat consumers should shut down
    CoolingEntered,
    NormalRestored,
    Defeated,
}

/// Per-session countdown timers gating commands
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Cooldowns {
    pub direction_switch: f32,
    pub accelerate: f32,
}

impl Cooldowns {
    /// Count both timers down, never below zero
    pub fn advance(&mut self, dt: f32) {
        self.direction_switch = (self.direction_switch - dt).max(0.0);
        self.accelerate = (self.accelerate - dt).max(0.0);
    }
}

/// The hook itself (singleton per session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookEntity {
    pub motion_state: MotionState,
    pub direction: RotationDir,
    /// Current length, within [standby_distance, max_length]
    pub length: f32,
    /// Degrees, normalized to [0, 360)
    pub rotation_angle: f32,
    /// Signed live rotate speed (degrees/s)
    pub rotate_speed: f32,
    pub launch_speed: f32,
    pub retrieve_speed: f32,
    /// Signed rotate speed the smoothing step is heading for
    pub target_rotate_speed: f32,
    pub is_accelerating: bool,
    /// True from a direction switch until the rotate speed settles
    pub is_switching_dir: bool,
    pub cooldowns: Cooldowns,
    /// Retraction pause after a forced release
    pub pending_resume_after: Option<f32>,
    pub health: f32,
    pub score: i64,
}

impl HookEntity {
    /// Fresh hook parked at standby distance
    pub fn new(tuning: &HookTuning) -> Self {
        Self {
            motion_state: MotionState::ReadyToLaunch,
            direction: RotationDir::Clockwise,
            length: tuning.standby_distance,
            rotation_angle: 0.0,
            rotate_speed: tuning.base_rotate_speed,
            launch_speed: tuning.base_launch_speed,
            retrieve_speed: tuning.base_retrieve_speed,
            target_rotate_speed: tuning.base_rotate_speed,
            is_accelerating: false,
            is_switching_dir: false,
            cooldowns: Cooldowns::default(),
            pending_resume_after: None,
            health: tuning.max_health,
            score: 0,
        }
    }

    /// Speed the hook is currently moving at in its motion state
    pub fn motion_speed(&self) -> f32 {
        match self.motion_state {
            MotionState::ReadyToLaunch => self.rotate_speed.abs(),
            MotionState::Launching => self.launch_speed,
            MotionState::Retrieving if self.pending_resume_after.is_some() => 0.0,
            MotionState::Retrieving => self.retrieve_speed,
        }
    }
}

/// Read-only view for UI and rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSnapshot {
    pub motion_state: MotionState,
    pub direction: RotationDir,
    pub length: f32,
    pub rotation_angle: f32,
    pub temperature: f32,
    pub overheat_phase: OverheatPhase,
    pub health: f32,
    pub score: i64,
    pub grabbed_mass: f32,
    pub is_accelerating: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_hook_is_parked() {
        let tuning = HookTuning::default();
        let hook = HookEntity::new(&tuning);
        assert_eq!(hook.motion_state, MotionState::ReadyToLaunch);
        assert_eq!(hook.length, tuning.standby_distance);
        assert_eq!(hook.health, tuning.max_health);
        assert_eq!(hook.rotate_speed, tuning.base_rotate_speed);
    }

    #[test]
    fn test_cooldowns_floor_at_zero() {
        let mut cd = Cooldowns {
            direction_switch: 0.05,
            accelerate: 1.0,
        };
        cd.advance(0.1);
        assert_eq!(cd.direction_switch, 0.0);
        assert!((cd.accelerate - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_direction_flip() {
        assert_eq!(RotationDir::Clockwise.flipped(), RotationDir::CounterClockwise);
        assert_eq!(RotationDir::CounterClockwise.sign(), -1.0);
    }

    #[test]
    fn test_paused_retrieve_has_no_motion_speed() {
        let mut hook = HookEntity::new(&HookTuning::default());
        hook.motion_state = MotionState::Retrieving;
        hook.pending_resume_after = Some(0.1);
        assert_eq!(hook.motion_speed(), 0.0);
    }
}
