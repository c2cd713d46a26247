//! Deterministic simulation module
//!
//! All hook logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (contacts nearest-first, ties by object id)
//! - No rendering or platform dependencies

pub mod field;
pub mod grab;
pub mod impact;
pub mod state;
pub mod thermal;
pub mod tick;

pub use field::{Body, Collectible, CollectibleKind, Field, FieldObject, Obstacle};
pub use grab::{
    GrabArbiter, GrabOutcome, GrabState, Harvest, HookTarget, ObjectId, ObjectState, RejectReason,
    Settlement, TargetLookup,
};
pub use impact::{HookVisual, PlayField, hook_momentum, impact_damage, reduced_mass, tip_position};
pub use state::{
    Cooldowns, HookEntity, HookEvent, HookSnapshot, MotionState, RetrieveCause, RotationDir,
};
pub use thermal::{HeatLoad, OverheatPhase, ThermalEvents, ThermalModel, ThermalState};
pub use tick::{HookStateMachine, HookWorld, TickInput, TickReport, tick};
