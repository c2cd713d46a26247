//! Hook state machine and fixed timestep tick
//!
//! `HookStateMachine::simulate` advances one tick in a fixed order:
//! commands -> motion -> contacts/grab -> thermal -> grab interrupts -> smoothing.
//! `sync_visuals` then reports the geometry for the frame.

use glam::Vec2;

use super::grab::{GrabArbiter, GrabOutcome, ObjectId, RejectReason, TargetLookup};
use super::impact::{HookVisual, hook_momentum, tip_position};
use super::state::{HookEntity, HookEvent, HookSnapshot, MotionState, RetrieveCause};
use super::thermal::{HeatLoad, ThermalEvents, ThermalModel};
use crate::normalize_degrees;
use crate::tuning::HookTuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Launch when parked, recall when launching (edge-triggered)
    pub toggle_launch: bool,
    /// Flip rotation direction (edge-triggered)
    pub toggle_direction: bool,
    /// Accelerate button held (level-triggered)
    pub accelerate_held: bool,
    /// Objects overlapping the hook tip this tick, in arbitration order
    pub contacts: Vec<ObjectId>,
}

/// Everything the hook needs from the world around it
pub trait HookWorld: TargetLookup {
    /// Polled once per tick while launching
    fn tip_left_play_field(&self, tip: Vec2) -> bool;
}

/// What happened during one tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<HookEvent>,
    pub thermal: ThermalEvents,
}

impl TickReport {
    /// Overheat window ran out this tick (shield shutdown hook)
    pub fn entered_cooling(&self) -> bool {
        self.thermal.entered_cooling
    }

    pub fn contains(&self, event: &HookEvent) -> bool {
        self.events.contains(event)
    }
}

/// Top-level per-session hook controller
#[derive(Debug, Clone)]
pub struct HookStateMachine {
    tuning: HookTuning,
    /// Ship position the hook rotates around
    origin: Vec2,
    pub(crate) hook: HookEntity,
    pub(crate) thermal: ThermalModel,
    pub(crate) grab: GrabArbiter,
    /// Events raised by collaborator calls between ticks
    pending: Vec<HookEvent>,
    /// Hazards overlapping the tip last tick; struck only on contact entry
    touching: Vec<ObjectId>,
}

impl HookStateMachine {
    pub fn new(tuning: HookTuning) -> Self {
        let hook = HookEntity::new(&tuning);
        let thermal = ThermalModel::new(&tuning.thermal, tuning.hook_tip_mass);
        let grab = GrabArbiter::new(&tuning.grab);
        Self {
            tuning,
            origin: Vec2::ZERO,
            hook,
            thermal,
            grab,
            pending: Vec::new(),
            touching: Vec::new(),
        }
    }

    /// Reset every mutable field to session-start values
    pub fn init(&mut self) {
        self.hook = HookEntity::new(&self.tuning);
        self.thermal.reset();
        self.grab.reset();
        self.pending.clear();
        self.touching.clear();
    }

    pub fn tuning(&self) -> &HookTuning {
        &self.tuning
    }

    pub fn hook(&self) -> &HookEntity {
        &self.hook
    }

    pub fn thermal(&self) -> &ThermalModel {
        &self.thermal
    }

    pub fn grab(&self) -> &GrabArbiter {
        &self.grab
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Move the ship the hook is anchored to
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    pub fn tip_position(&self) -> Vec2 {
        tip_position(self.origin, self.hook.rotation_angle, self.hook.length)
    }

    pub fn current_launch_speed(&self) -> f32 {
        self.hook.launch_speed
    }

    pub fn hook_tip_mass(&self) -> f32 {
        self.tuning.hook_tip_mass
    }

    /// Momentum the tip hits with (launch speed x tip mass)
    pub fn hook_momentum(&self) -> f32 {
        hook_momentum(self.hook.launch_speed, self.tuning.hook_tip_mass)
    }

    pub fn is_defeated(&self) -> bool {
        self.hook.health <= 0.0
    }

    /// Inject heat from weapons or other subsystems
    pub fn add_heat(&mut self, amount: f32) {
        self.thermal.add_heat(amount);
    }

    pub fn add_score(&mut self, amount: i32) {
        self.hook.score += i64::from(amount);
    }

    /// Apply damage to the ship; returns true if this hit defeated it
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.hook.health > 0.0;
        self.hook.health = (self.hook.health - amount).clamp(0.0, self.tuning.max_health);
        if was_alive && self.hook.health <= 0.0 {
            log::warn!("Ship destroyed");
            self.pending.push(HookEvent::Defeated);
            return true;
        }
        false
    }

    /// Snap a launching hook back; no-op in other states
    pub fn force_retrieve(&mut self) -> bool {
        let mut events = std::mem::take(&mut self.pending);
        let started = self.begin_retrieve(RetrieveCause::External, &mut events);
        self.pending = events;
        started
    }

    /// Retrieve-speed target: base (or accelerated) speed slowed by grabbed mass
    pub fn target_retrieve_speed(&self) -> f32 {
        let base = if self.hook.is_accelerating {
            self.tuning.accelerate_retrieve_speed
        } else {
            self.tuning.base_retrieve_speed
        };
        let mass = self.grab.grabbed_mass();
        let resistance = 1.0 + mass * mass;
        (base * 2.0 / resistance).max(0.1 * base)
    }

    pub fn snapshot(&self) -> HookSnapshot {
        HookSnapshot {
            motion_state: self.hook.motion_state,
            direction: self.hook.direction,
            length: self.hook.length,
            rotation_angle: self.hook.rotation_angle,
            temperature: self.thermal.temperature(),
            overheat_phase: self.thermal.phase(),
            health: self.hook.health,
            score: self.hook.score,
            grabbed_mass: self.grab.grabbed_mass(),
            is_accelerating: self.hook.is_accelerating,
        }
    }

    /// Renderer-facing geometry (second phase of a frame)
    pub fn sync_visuals(&self) -> HookVisual {
        HookVisual::new(self.origin, self.hook.rotation_angle, self.hook.length)
    }

    /// Advance the simulation by one timestep
    pub fn simulate<W: HookWorld + ?Sized>(
        &mut self,
        input: &TickInput,
        world: &mut W,
        dt: f32,
    ) -> TickReport {
        debug_assert!(dt.is_finite() && dt >= 0.0, "bad timestep {dt}");
        let mut events = std::mem::take(&mut self.pending);

        self.hook.cooldowns.advance(dt);
        self.handle_commands(input, &mut events);
        self.update_motion(world, dt, &mut events);
        self.resolve_contacts(&input.contacts, world, &mut events);
        let thermal = self.update_thermal(world, dt, &mut events);
        self.update_speed_smoothing(dt);

        TickReport { events, thermal }
    }

    fn handle_commands(&mut self, input: &TickInput, events: &mut Vec<HookEvent>) {
        if input.toggle_launch {
            match self.hook.motion_state {
                MotionState::ReadyToLaunch => {
                    self.hook.motion_state = MotionState::Launching;
                    events.push(HookEvent::Launched);
                    log::debug!("Hook launched at {:.1}°", self.hook.rotation_angle);
                }
                MotionState::Launching => {
                    self.begin_retrieve(RetrieveCause::Manual, events);
                }
                MotionState::Retrieving => {}
            }
        }

        if input.toggle_direction
            && !self.hook.is_switching_dir
            && self.thermal.is_normal()
            && self.hook.cooldowns.direction_switch <= 0.0
        {
            self.start_direction_switch(events);
        }

        if input.accelerate_held
            && !self.hook.is_accelerating
            && self.thermal.is_normal()
            && self.hook.cooldowns.accelerate <= 0.0
        {
            self.hook.is_accelerating = true;
            events.push(HookEvent::AccelerationStarted);
        } else if !input.accelerate_held && self.hook.is_accelerating {
            self.stop_accelerating(events);
        }
    }

    fn start_direction_switch(&mut self, events: &mut Vec<HookEvent>) {
        let speed = if self.hook.is_accelerating {
            self.tuning.accelerate_rotate_speed
        } else {
            self.tuning.base_rotate_speed
        };
        self.hook.is_switching_dir = true;
        self.hook.direction = self.hook.direction.flipped();
        self.hook.target_rotate_speed = speed * self.hook.direction.sign();
        self.thermal.add_heat(self.tuning.thermal.rotate_switch_heat);
        self.hook.cooldowns.direction_switch = self.tuning.rotate_switch_cooldown;
        events.push(HookEvent::DirectionSwitched {
            dir: self.hook.direction,
        });
    }

    fn stop_accelerating(&mut self, events: &mut Vec<HookEvent>) {
        if self.hook.is_accelerating {
            events.push(HookEvent::AccelerationStopped);
        }
        self.hook.is_accelerating = false;
        self.hook.cooldowns.accelerate = self.tuning.accelerate_cooldown;
        if self.hook.is_switching_dir {
            self.hook.target_rotate_speed =
                self.tuning.base_rotate_speed * self.hook.direction.sign();
        }
    }

    /// Launching -> Retrieving; false if the hook was not launching
    fn begin_retrieve(&mut self, cause: RetrieveCause, events: &mut Vec<HookEvent>) -> bool {
        if self.hook.motion_state != MotionState::Launching {
            return false;
        }
        self.hook.motion_state = MotionState::Retrieving;
        events.push(HookEvent::RetrieveStarted { cause });
        log::debug!("Retrieving ({:?}) at length {:.2}", cause, self.hook.length);
        true
    }

    fn update_motion<W: HookWorld + ?Sized>(
        &mut self,
        world: &mut W,
        dt: f32,
        events: &mut Vec<HookEvent>,
    ) {
        match self.hook.motion_state {
            MotionState::ReadyToLaunch => {
                self.hook.rotation_angle =
                    normalize_degrees(self.hook.rotation_angle + self.hook.rotate_speed * dt);
            }
            MotionState::Launching => {
                self.hook.length += self.hook.launch_speed * dt;
                if self.hook.length >= self.tuning.max_length {
                    self.hook.length = self.tuning.max_length;
                    self.begin_retrieve(RetrieveCause::MaxLength, events);
                } else if world.tip_left_play_field(self.tip_position()) {
                    self.begin_retrieve(RetrieveCause::OutOfBounds, events);
                }
            }
            MotionState::Retrieving => {
                if let Some(remaining) = self.hook.pending_resume_after {
                    let remaining = remaining - dt;
                    self.hook.pending_resume_after = (remaining > 0.0).then_some(remaining);
                    return;
                }

                self.hook.length -= self.hook.retrieve_speed * dt;
                if self.hook.length <= self.tuning.standby_distance {
                    self.hook.length = self.tuning.standby_distance;
                    self.hook.motion_state = MotionState::ReadyToLaunch;
                    events.push(HookEvent::Docked);

                    let settlement = self.grab.on_retrieve_complete(world);
                    if settlement.objects > 0 {
                        self.add_score(settlement.harvest.score);
                        events.push(HookEvent::Harvested {
                            objects: settlement.objects,
                            score: settlement.harvest.score,
                        });
                    }
                }
            }
        }
    }

    fn resolve_contacts<W: HookWorld + ?Sized>(
        &mut self,
        contacts: &[ObjectId],
        world: &mut W,
        events: &mut Vec<HookEvent>,
    ) {
        let mut touching = Vec::new();
        for &id in contacts {
            let momentum = self.hook_momentum();
            let tip = self.tip_position();
            let Some(target) = world.target_mut(id) else {
                continue;
            };

            if target.is_grabbable() {
                target.on_hook_collision(momentum);
                if self.hook.motion_state != MotionState::Launching {
                    continue;
                }

                let mass = target.mass();
                let motion = self.hook.motion_state;
                let outcome = self.grab.try_grab(id, target, motion, &mut self.thermal);
                match outcome {
                    GrabOutcome::Accepted => {
                        events.push(HookEvent::GrabAccepted { id, mass });
                    }
                    GrabOutcome::Rejected(reason) => {
                        events.push(HookEvent::GrabRejected { id, reason });
                    }
                }
                if outcome.forces_retrieve() {
                    let cause = match outcome {
                        GrabOutcome::Rejected(RejectReason::TooHeavy) => RetrieveCause::Overweight,
                        _ => RetrieveCause::Grabbed,
                    };
                    self.begin_retrieve(cause, events);
                }
            } else {
                if target.state().is_terminal() {
                    continue;
                }
                touching.push(id);
                if self.touching.contains(&id) {
                    continue;
                }
                target.on_hook_collision(momentum);
                target.take_damage(momentum, tip);
                let bounce = momentum
                    >= self.tuning.impact_retrieve_fraction * target.destroyed_momentum();
                events.push(HookEvent::HazardStruck { id, momentum });
                if bounce {
                    self.begin_retrieve(RetrieveCause::Impact, events);
                }
            }
        }
        self.touching = touching;
    }

    fn update_thermal<W: HookWorld + ?Sized>(
        &mut self,
        world: &mut W,
        dt: f32,
        events: &mut Vec<HookEvent>,
    ) -> ThermalEvents {
        let load = HeatLoad {
            motion: self.hook.motion_state,
            speed: self.hook.motion_speed(),
            grabbed_mass: self.grab.grabbed_mass(),
        };
        let thermal = self.thermal.tick(dt, load);

        if thermal.entered_overheat {
            events.push(HookEvent::OverheatEntered);
            self.stop_accelerating(events);
            if self.grab.has_active_grab() {
                self.begin_retrieve(RetrieveCause::Overheat, events);
                self.release_grab(world, events);
            }
        }

        if thermal.entered_cooling {
            events.push(HookEvent::CoolingEntered);
            self.hook.is_accelerating = false;
            if self.grab.has_active_grab() {
                self.release_grab(world, events);
            }
        }

        if thermal.entered_normal {
            events.push(HookEvent::NormalRestored);
        }

        thermal
    }

    fn release_grab<W: HookWorld + ?Sized>(&mut self, world: &mut W, events: &mut Vec<HookEvent>) {
        let settlement = self.grab.force_release_all(world);
        if settlement.objects > 0 {
            events.push(HookEvent::Released {
                objects: settlement.objects,
            });
        }

        let delay = self.tuning.grab.release_resume_delay;
        if self.hook.motion_state == MotionState::Retrieving && delay > 0.0 {
            self.hook.pending_resume_after = Some(delay);
        }
    }

    fn update_speed_smoothing(&mut self, dt: f32) {
        if !self.hook.is_switching_dir {
            let speed = if self.hook.is_accelerating {
                self.tuning.accelerate_rotate_speed
            } else {
                self.tuning.base_rotate_speed
            };
            self.hook.target_rotate_speed = speed * self.hook.direction.sign();
        }

        let rate = if self.hook.is_switching_dir {
            self.tuning.switch_dir_smooth_rate
        } else {
            self.tuning.rotation_smooth_rate
        };
        let max_change = rate * dt;
        let diff = self.hook.target_rotate_speed - self.hook.rotate_speed;
        if diff.abs() > max_change {
            self.hook.rotate_speed += diff.signum() * max_change;
        } else {
            self.hook.rotate_speed = self.hook.target_rotate_speed;
            self.hook.is_switching_dir = false;
        }

        let length_step = self.tuning.length_smooth_rate * dt;
        let target_launch = if self.hook.is_accelerating {
            self.tuning.accelerate_launch_speed
        } else {
            self.tuning.base_launch_speed
        };
        self.hook.launch_speed = move_towards(self.hook.launch_speed, target_launch, length_step);
        let target_retrieve = self.target_retrieve_speed();
        self.hook.retrieve_speed =
            move_towards(self.hook.retrieve_speed, target_retrieve, length_step);
    }
}

/// Step `current` toward `target` by at most `max_delta`
#[inline]
fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Run both phases of a frame: simulate, then sync visuals
pub fn tick<W: HookWorld + ?Sized>(
    system: &mut HookStateMachine,
    input: &TickInput,
    world: &mut W,
    dt: f32,
) -> (TickReport, HookVisual) {
    let report = system.simulate(input, world, dt);
    (report, system.sync_visuals())
}
