//! Reference collaborators
//!
//! A small free-floating object field (collectibles and obstacles) that
//! implements the hook's collaborator traits. Headless hosts and tests drive
//! the hook against it; an engine-bound host would supply its own world.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grab::{Harvest, HookTarget, ObjectId, ObjectState, TargetLookup};
use super::impact::{PlayField, impact_damage};
use super::tick::HookWorld;

/// Collectible flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Resource,
    Prop,
    Garbage,
}

/// Something the hook can seize and bring home
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub score_value: i32,
    pub mass: f32,
    /// Hook momentum that smashes it instead of grabbing it
    pub destroyed_momentum: f32,
    pub state: ObjectState,
}

impl Collectible {
    pub fn new(kind: CollectibleKind, mass: f32) -> Self {
        let score_value = match kind {
            CollectibleKind::Resource => 30,
            CollectibleKind::Prop => 20,
            CollectibleKind::Garbage => 5,
        };
        Self {
            kind,
            score_value,
            mass,
            destroyed_momentum: 8.0,
            state: ObjectState::FreeFloating,
        }
    }
}

impl HookTarget for Collectible {
    fn mass(&self) -> f32 {
        self.mass
    }

    fn state(&self) -> ObjectState {
        self.state
    }

    fn destroyed_momentum(&self) -> f32 {
        self.destroyed_momentum
    }

    fn on_hook_collision(&mut self, hook_momentum: f32) {
        if self.state.is_terminal() {
            return;
        }
        self.state = if hook_momentum >= self.destroyed_momentum {
            ObjectState::Destroyed
        } else {
            ObjectState::Colliding
        };
    }

    fn on_grabbed(&mut self) -> bool {
        match self.state {
            ObjectState::FreeFloating | ObjectState::Colliding => {
                self.state = ObjectState::Grabbed;
                true
            }
            _ => false,
        }
    }

    fn on_harvested(&mut self) -> Harvest {
        self.state = ObjectState::Harvested;
        Harvest {
            score: self.score_value,
        }
    }

    fn on_released(&mut self) {
        if self.state == ObjectState::Grabbed {
            self.state = ObjectState::FreeFloating;
        }
    }

    fn take_damage(&mut self, amount: f32, _point: Vec2) {
        if !self.state.is_terminal() && amount >= self.destroyed_momentum {
            self.state = ObjectState::Destroyed;
        }
    }
}

/// A drifting hazard: hurts the ship, can be broken by the hook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub health: f32,
    /// Damage dealt to the ship on contact
    pub contact_damage: f32,
    pub mass: f32,
    pub destroyed_momentum: f32,
    pub state: ObjectState,
}

impl Obstacle {
    pub fn new(mass: f32) -> Self {
        Self {
            health: 10.0,
            contact_damage: 5.0,
            mass,
            destroyed_momentum: 5.0,
            state: ObjectState::FreeFloating,
        }
    }
}

impl HookTarget for Obstacle {
    fn mass(&self) -> f32 {
        self.mass
    }

    fn state(&self) -> ObjectState {
        self.state
    }

    fn destroyed_momentum(&self) -> f32 {
        self.destroyed_momentum
    }

    fn is_grabbable(&self) -> bool {
        false
    }

    fn on_hook_collision(&mut self, _hook_momentum: f32) {
        if !self.state.is_terminal() {
            self.state = ObjectState::Colliding;
        }
    }

    fn on_grabbed(&mut self) -> bool {
        false
    }

    fn on_harvested(&mut self) -> Harvest {
        Harvest::default()
    }

    fn on_released(&mut self) {}

    fn take_damage(&mut self, amount: f32, _point: Vec2) {
        if self.state.is_terminal() {
            return;
        }
        self.health -= amount;
        if self.health <= 0.0 || amount >= self.destroyed_momentum {
            self.state = ObjectState::Destroyed;
            log::debug!("Obstacle destroyed (hit {:.2})", amount);
        }
    }
}

/// What a field object is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Body {
    Collectible(Collectible),
    Obstacle(Obstacle),
}

impl Body {
    fn target(&self) -> &dyn HookTarget {
        match self {
            Body::Collectible(c) => c as &dyn HookTarget,
            Body::Obstacle(o) => o as &dyn HookTarget,
        }
    }

    fn target_mut(&mut self) -> &mut dyn HookTarget {
        match self {
            Body::Collectible(c) => c as &mut dyn HookTarget,
            Body::Obstacle(o) => o as &mut dyn HookTarget,
        }
    }
}

/// A positioned object in the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldObject {
    pub id: ObjectId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub body: Body,
}

impl FieldObject {
    pub fn state(&self) -> ObjectState {
        self.body.target().state()
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self.state(), ObjectState::Harvested | ObjectState::Destroyed)
    }
}

/// Free-floating objects around the ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub bounds: PlayField,
    /// Sorted by id for deterministic iteration
    pub objects: Vec<FieldObject>,
    next_id: u32,
}

impl Field {
    pub fn new(bounds: PlayField) -> Self {
        Self {
            bounds,
            objects: Vec::new(),
            next_id: 1,
        }
    }

    /// Seeded field of `count` objects inside the hook's reach band
    pub fn scatter(seed: u64, count: usize, bounds: PlayField, reach: (f32, f32)) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut field = Self::new(bounds);

        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let dist = rng.random_range(reach.0..reach.1);
            let pos = Vec2::new(angle.cos(), angle.sin()) * dist;
            let drift = Vec2::new(rng.random_range(-0.3..0.3), rng.random_range(-0.3..0.3));

            let roll = rng.random_range(0..100);
            if roll < 25 {
                let mut obstacle = Obstacle::new(rng.random_range(1.0..4.0));
                obstacle.health = rng.random_range(5.0..15.0);
                field.spawn(pos, drift, 0.6, Body::Obstacle(obstacle));
            } else {
                let kind = match roll {
                    25..=59 => CollectibleKind::Resource,
                    60..=79 => CollectibleKind::Prop,
                    _ => CollectibleKind::Garbage,
                };
                // Some catches are too heavy for the default grab limit
                let mass = rng.random_range(0.5..7.0);
                field.spawn(pos, drift, 0.5, Body::Collectible(Collectible::new(kind, mass)));
            }
        }

        log::info!("Scattered {} objects (seed {})", field.objects.len(), seed);
        field
    }

    /// Add an object, returning its handle
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, radius: f32, body: Body) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(FieldObject {
            id,
            pos,
            vel,
            radius,
            body,
        });
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&FieldObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Live objects overlapping the hook tip, nearest first (ties by id)
    pub fn contacts(&self, tip: Vec2, tip_radius: f32) -> Vec<ObjectId> {
        let mut hits: Vec<(f32, ObjectId)> = self
            .objects
            .iter()
            .filter(|o| o.is_alive() && o.state() != ObjectState::Grabbed)
            .map(|o| (o.pos.distance(tip), o))
            .filter(|(dist, o)| *dist <= o.radius + tip_radius)
            .map(|(dist, o)| (dist, o.id))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Drift free objects and resolve obstacle hits on the ship
    ///
    /// Returns the damage the ship took this step.
    pub fn advance(&mut self, dt: f32, ship_pos: Vec2, ship_radius: f32, ship_mass: f32) -> f32 {
        let mut ship_damage = 0.0;

        for object in &mut self.objects {
            if !object.is_alive() || object.state() == ObjectState::Grabbed {
                continue;
            }
            object.pos += object.vel * dt;

            if let Body::Obstacle(obstacle) = &mut object.body {
                let offset = object.pos - ship_pos;
                let closing = offset.dot(object.vel) < 0.0;
                if closing && offset.length() <= ship_radius + object.radius {
                    ship_damage += obstacle.contact_damage;
                    let speed = object.vel.length();
                    obstacle.take_damage(impact_damage(ship_mass, obstacle.mass, speed), object.pos);
                    // Bounce outward; only closing objects can hit
                    object.vel = offset.normalize_or_zero() * speed.max(0.5);
                }
            }
        }

        ship_damage
    }

    /// Pin grabbed objects to the hook tip
    pub fn carry_grabbed(&mut self, tip: Vec2) {
        for object in &mut self.objects {
            if object.state() == ObjectState::Grabbed {
                object.pos = tip;
                object.vel = Vec2::ZERO;
            }
        }
    }

    /// Drop harvested and destroyed objects
    pub fn sweep(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| o.is_alive());
        before - self.objects.len()
    }

    pub fn live_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_alive()).count()
    }
}

impl TargetLookup for Field {
    fn target_mut(&mut self, id: ObjectId) -> Option<&mut dyn HookTarget> {
        self.objects
            .iter_mut()
            .find(|o| o.id == id)
            .map(|o| o.body.target_mut())
    }
}

impl HookWorld for Field {
    fn tip_left_play_field(&self, tip: Vec2) -> bool {
        self.bounds.is_outside(tip)
    }
}
