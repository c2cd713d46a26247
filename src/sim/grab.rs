//! Grab arbitration
//!
//! Decides which object a launching hook may seize, owns the single grab
//! slot, and settles grabbed objects on harvest or forced release.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::MotionState;
use super::thermal::{OverheatPhase, ThermalModel};
use crate::tuning::GrabTuning;

/// Opaque handle to an object owned by a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Lifecycle state reported by a hook target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectState {
    #[default]
    FreeFloating,
    Colliding,
    Grabbed,
    Harvested,
    Destroyed,
}

impl ObjectState {
    /// States a grab can no longer start from
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ObjectState::Grabbed | ObjectState::Harvested | ObjectState::Destroyed
        )
    }
}

/// Reward handed back when a grabbed object is harvested
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    pub score: i32,
}

/// An external object the hook tip can touch
///
/// Implemented by collaborators (collectibles, obstacles). The core only ever
/// holds `ObjectId`s and looks targets up through a world each tick.
pub trait HookTarget {
    fn mass(&self) -> f32;
    fn state(&self) -> ObjectState;
    /// Momentum at which a hook hit destroys this object
    fn destroyed_momentum(&self) -> f32;
    /// Whether the hook seizes this object or strikes it as a hazard
    fn is_grabbable(&self) -> bool {
        true
    }
    fn on_hook_collision(&mut self, hook_momentum: f32);
    /// Attach to the hook tip; `false` declines the grab
    fn on_grabbed(&mut self) -> bool;
    fn on_harvested(&mut self) -> Harvest;
    /// Return to free-floating physics
    fn on_released(&mut self);
    fn take_damage(&mut self, amount: f32, point: Vec2);
}

/// Looks up targets by handle
pub trait TargetLookup {
    fn target_mut(&mut self, id: ObjectId) -> Option<&mut dyn HookTarget>;
}

/// Why a grab attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Grab slot already holds an object
    SlotOccupied,
    /// Hook is not launching
    NotLaunching,
    /// Thermal model is in forced cooldown
    Cooling,
    /// Target is destroyed, harvested or already grabbed
    Unavailable,
    /// Target exceeds the grabbable mass
    TooHeavy,
    /// Target refused to attach
    Declined,
}

/// Result of `GrabArbiter::try_grab`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrabOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl GrabOutcome {
    /// Accepted grabs and overweight rejections both snap the hook back
    pub fn forces_retrieve(self) -> bool {
        matches!(
            self,
            GrabOutcome::Accepted | GrabOutcome::Rejected(RejectReason::TooHeavy)
        )
    }
}

/// Grab slot contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrabState {
    pub has_active_grab: bool,
    pub grabbed_mass: f32,
    pub grabbed_objects: Vec<ObjectId>,
}

/// Objects settled by a harvest or release
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Settlement {
    pub objects: usize,
    pub harvest: Harvest,
}

/// Single-owner grab slot
#[derive(Debug, Clone)]
pub struct GrabArbiter {
    tuning: GrabTuning,
    pub(crate) state: GrabState,
}

impl GrabArbiter {
    pub fn new(tuning: &GrabTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            state: GrabState::default(),
        }
    }

    pub fn reset(&mut self) {
        self.state = GrabState::default();
    }

    pub fn state(&self) -> &GrabState {
        &self.state
    }

    pub fn has_active_grab(&self) -> bool {
        self.state.has_active_grab
    }

    pub fn grabbed_mass(&self) -> f32 {
        self.state.grabbed_mass
    }

    pub fn tuning(&self) -> &GrabTuning {
        &self.tuning
    }

    /// Try to seize `candidate`
    ///
    /// On acceptance the candidate is attached, its mass is added to the
    /// slot and grab heat goes into `thermal`. Callers react to
    /// `GrabOutcome::forces_retrieve`.
    pub fn try_grab(
        &mut self,
        id: ObjectId,
        candidate: &mut dyn HookTarget,
        motion: MotionState,
        thermal: &mut ThermalModel,
    ) -> GrabOutcome {
        let reason = if self.state.has_active_grab {
            Some(RejectReason::SlotOccupied)
        } else if motion != MotionState::Launching {
            Some(RejectReason::NotLaunching)
        } else if candidate.mass() > self.tuning.max_grabbable_mass {
            // Overweight always bounces the hook, whatever else is wrong
            Some(RejectReason::TooHeavy)
        } else if thermal.phase() == OverheatPhase::Cooling {
            Some(RejectReason::Cooling)
        } else if candidate.state().is_terminal() {
            Some(RejectReason::Unavailable)
        } else if !candidate.on_grabbed() {
            Some(RejectReason::Declined)
        } else {
            None
        };

        if let Some(reason) = reason {
            log::debug!("Grab of {:?} rejected: {:?}", id, reason);
            return GrabOutcome::Rejected(reason);
        }

        let mass = candidate.mass();
        self.state.has_active_grab = true;
        self.state.grabbed_mass += mass;
        self.state.grabbed_objects.push(id);
        thermal.add_heat(mass * self.tuning.grab_heat_per_mass);
        log::info!("Grabbed {:?} (mass {:.2})", id, mass);

        GrabOutcome::Accepted
    }

    /// Harvest everything on the tip once the hook is back home
    pub fn on_retrieve_complete<T: TargetLookup + ?Sized>(&mut self, targets: &mut T) -> Settlement {
        let mut settlement = Settlement::default();
        for id in std::mem::take(&mut self.state.grabbed_objects) {
            // Collaborators may have despawned the object mid-grab
            if let Some(target) = targets.target_mut(id) {
                let harvest = target.on_harvested();
                settlement.objects += 1;
                settlement.harvest.score += harvest.score;
            }
        }
        self.state.has_active_grab = false;
        self.state.grabbed_mass = 0.0;

        if settlement.objects > 0 {
            log::info!(
                "Harvested {} object(s) for {} points",
                settlement.objects,
                settlement.harvest.score
            );
        }
        settlement
    }

    /// Drop everything on the tip immediately (overheat interrupt)
    pub fn force_release_all<T: TargetLookup + ?Sized>(&mut self, targets: &mut T) -> Settlement {
        let mut settlement = Settlement::default();
        for id in std::mem::take(&mut self.state.grabbed_objects) {
            if let Some(target) = targets.target_mut(id) {
                target.on_released();
                settlement.objects += 1;
            }
        }
        self.state.has_active_grab = false;
        self.state.grabbed_mass = 0.0;

        if settlement.objects > 0 {
            log::info!("Force-released {} object(s)", settlement.objects);
        }
        settlement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::ThermalTuning;

    #[derive(Default)]
    struct Probe {
        mass: f32,
        state: ObjectState,
        refuse: bool,
        harvested: u32,
        released: u32,
    }

    impl HookTarget for Probe {
        fn mass(&self) -> f32 {
            self.mass
        }
        fn state(&self) -> ObjectState {
            self.state
        }
        fn destroyed_momentum(&self) -> f32 {
            f32::INFINITY
        }
        fn on_hook_collision(&mut self, _hook_momentum: f32) {}
        fn on_grabbed(&mut self) -> bool {
            if self.refuse {
                return false;
            }
            self.state = ObjectState::Grabbed;
            true
        }
        fn on_harvested(&mut self) -> Harvest {
            self.harvested += 1;
            self.state = ObjectState::Harvested;
            Harvest { score: 10 }
        }
        fn on_released(&mut self) {
            self.released += 1;
            self.state = ObjectState::FreeFloating;
        }
        fn take_damage(&mut self, _amount: f32, _point: Vec2) {}
    }

    struct Probes(Vec<Probe>);

    impl TargetLookup for Probes {
        fn target_mut(&mut self, id: ObjectId) -> Option<&mut dyn HookTarget> {
            self.0
                .get_mut(id.0 as usize)
                .map(|p| p as &mut dyn HookTarget)
        }
    }

    fn setup() -> (GrabArbiter, ThermalModel) {
        (
            GrabArbiter::new(&GrabTuning::default()),
            ThermalModel::new(&ThermalTuning::default(), 0.5),
        )
    }

    #[test]
    fn test_accepts_light_candidate() {
        let (mut arbiter, mut thermal) = setup();
        let mut probe = Probe {
            mass: 3.0,
            ..Default::default()
        };

        let outcome = arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Launching, &mut thermal);
        assert_eq!(outcome, GrabOutcome::Accepted);
        assert!(outcome.forces_retrieve());
        assert!(arbiter.has_active_grab());
        assert_eq!(arbiter.grabbed_mass(), 3.0);
        assert_eq!(probe.state, ObjectState::Grabbed);
        // 3 mass * 2 heat per mass
        assert!((thermal.temperature() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_overweight_rejected_but_forces_retrieve() {
        let (mut arbiter, mut thermal) = setup();
        let mut probe = Probe {
            mass: 5.5,
            ..Default::default()
        };

        let outcome = arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Launching, &mut thermal);
        assert_eq!(outcome, GrabOutcome::Rejected(RejectReason::TooHeavy));
        assert!(outcome.forces_retrieve());
        assert!(!arbiter.has_active_grab());
        assert_eq!(probe.state, ObjectState::FreeFloating);
        assert_eq!(thermal.temperature(), 0.0);
    }

    #[test]
    fn test_overweight_wins_over_other_rejections() {
        let (mut arbiter, mut thermal) = setup();
        thermal.state.overheat_phase = OverheatPhase::Cooling;
        let mut probe = Probe {
            mass: 6.0,
            ..Default::default()
        };
        let outcome = arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Launching, &mut thermal);
        assert_eq!(outcome, GrabOutcome::Rejected(RejectReason::TooHeavy));
        assert!(outcome.forces_retrieve());

        thermal.state.overheat_phase = OverheatPhase::Normal;
        probe.state = ObjectState::Destroyed;
        let outcome = arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Launching, &mut thermal);
        assert_eq!(outcome, GrabOutcome::Rejected(RejectReason::TooHeavy));
        assert!(!arbiter.has_active_grab());
    }

    #[test]
    fn test_terminal_candidates_are_skipped() {
        let (mut arbiter, mut thermal) = setup();
        for state in [ObjectState::Destroyed, ObjectState::Harvested, ObjectState::Grabbed] {
            let mut probe = Probe {
                mass: 1.0,
                state,
                ..Default::default()
            };
            let outcome =
                arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Launching, &mut thermal);
            assert_eq!(outcome, GrabOutcome::Rejected(RejectReason::Unavailable));
            assert!(!outcome.forces_retrieve());
        }
        assert!(!arbiter.has_active_grab());
    }

    #[test]
    fn test_declined_and_wrong_state() {
        let (mut arbiter, mut thermal) = setup();
        let mut probe = Probe {
            mass: 1.0,
            refuse: true,
            ..Default::default()
        };
        assert_eq!(
            arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Launching, &mut thermal),
            GrabOutcome::Rejected(RejectReason::Declined)
        );

        probe.refuse = false;
        assert_eq!(
            arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Retrieving, &mut thermal),
            GrabOutcome::Rejected(RejectReason::NotLaunching)
        );

        thermal.state.overheat_phase = OverheatPhase::Cooling;
        assert_eq!(
            arbiter.try_grab(ObjectId(0), &mut probe, MotionState::Launching, &mut thermal),
            GrabOutcome::Rejected(RejectReason::Cooling)
        );
    }

    #[test]
    fn test_first_candidate_wins_slot() {
        let (mut arbiter, mut thermal) = setup();
        let mut probes = Probes(vec![
            Probe {
                mass: 1.0,
                ..Default::default()
            },
            Probe {
                mass: 2.0,
                ..Default::default()
            },
        ]);

        let first = arbiter.try_grab(ObjectId(0), &mut probes.0[0], MotionState::Launching, &mut thermal);
        let second = arbiter.try_grab(ObjectId(1), &mut probes.0[1], MotionState::Launching, &mut thermal);
        assert_eq!(first, GrabOutcome::Accepted);
        assert_eq!(second, GrabOutcome::Rejected(RejectReason::SlotOccupied));
        assert_eq!(arbiter.grabbed_mass(), 1.0);
        assert_eq!(probes.0[1].state, ObjectState::FreeFloating);
    }

    #[test]
    fn test_retrieve_complete_harvests_and_clears() {
        let (mut arbiter, mut thermal) = setup();
        let mut probes = Probes(vec![Probe {
            mass: 3.0,
            ..Default::default()
        }]);
        arbiter.try_grab(ObjectId(0), &mut probes.0[0], MotionState::Launching, &mut thermal);

        let settlement = arbiter.on_retrieve_complete(&mut probes);
        assert_eq!(settlement.objects, 1);
        assert_eq!(settlement.harvest.score, 10);
        assert_eq!(probes.0[0].harvested, 1);
        assert_eq!(probes.0[0].released, 0);
        assert!(!arbiter.has_active_grab());
        assert_eq!(arbiter.grabbed_mass(), 0.0);
        assert!(arbiter.state().grabbed_objects.is_empty());
    }

    #[test]
    fn test_force_release_does_not_harvest() {
        let (mut arbiter, mut thermal) = setup();
        let mut probes = Probes(vec![Probe {
            mass: 2.0,
            ..Default::default()
        }]);
        arbiter.try_grab(ObjectId(0), &mut probes.0[0], MotionState::Launching, &mut thermal);

        let settlement = arbiter.force_release_all(&mut probes);
        assert_eq!(settlement.objects, 1);
        assert_eq!(settlement.harvest, Harvest::default());
        assert_eq!(probes.0[0].released, 1);
        assert_eq!(probes.0[0].harvested, 0);
        assert_eq!(probes.0[0].state, ObjectState::FreeFloating);
        assert!(!arbiter.has_active_grab());

        // Slot is free again
        let outcome = arbiter.try_grab(ObjectId(0), &mut probes.0[0], MotionState::Launching, &mut thermal);
        assert_eq!(outcome, GrabOutcome::Accepted);
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let (mut arbiter, mut thermal) = setup();
        let mut probe = Probe {
            mass: 1.0,
            ..Default::default()
        };
        arbiter.try_grab(ObjectId(7), &mut probe, MotionState::Launching, &mut thermal);

        let mut empty = Probes(Vec::new());
        let settlement = arbiter.on_retrieve_complete(&mut empty);
        assert_eq!(settlement.objects, 0);
        assert!(!arbiter.has_active_grab());
    }
}
