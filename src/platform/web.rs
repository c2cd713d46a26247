//! Browser binding
//!
//! Exposes a self-contained hook session to JavaScript. The page owns the
//! render loop and calls `frame` from `requestAnimationFrame`.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use super::FixedStepLoop;
use crate::sim::{Field, HookStateMachine, PlayField, TickInput};
use crate::tuning::HookTuning;

const SHIP_RADIUS: f32 = 1.0;
const TIP_RADIUS: f32 = 0.3;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }
    log::info!("Grapple hook core loaded");
}

/// One hook session plus the object field it plays against
#[wasm_bindgen]
pub struct WebHook {
    system: HookStateMachine,
    field: Field,
    fixed: FixedStepLoop,
    input: TickInput,
}

#[wasm_bindgen]
impl WebHook {
    /// New session; `tuning_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, tuning_json: &str) -> Result<WebHook, JsValue> {
        let tuning = if tuning_json.trim().is_empty() {
            HookTuning::default()
        } else {
            HookTuning::from_json(tuning_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        let reach = (tuning.standby_distance + 0.5, tuning.max_length - 0.5);
        let field = Field::scatter(u64::from(seed), 30, PlayField::centered(12.0, 8.0, 0.5), reach);
        log::info!("Session started with seed: {}", seed);

        Ok(Self {
            system: HookStateMachine::new(tuning),
            field,
            fixed: FixedStepLoop::default(),
            input: TickInput::default(),
        })
    }

    pub fn press_launch(&mut self) {
        self.input.toggle_launch = true;
    }

    pub fn press_direction(&mut self) {
        self.input.toggle_direction = true;
    }

    pub fn set_accelerate(&mut self, held: bool) {
        self.input.accelerate_held = held;
    }

    /// Advance by a frame delta in seconds; returns substeps run
    pub fn frame(&mut self, dt: f32) -> u32 {
        let Self {
            system,
            field,
            fixed,
            input,
        } = self;

        fixed.advance(dt, |step| {
            let damage = field.advance(step, system.origin(), SHIP_RADIUS, system.tuning().ship_mass);
            if damage > 0.0 {
                system.take_damage(damage);
            }

            input.contacts = field.contacts(system.tip_position(), TIP_RADIUS);
            let report = system.simulate(input, field, step);
            for event in &report.events {
                log::debug!("{:?}", event);
            }
            field.carry_grabbed(system.tip_position());
            field.sweep();

            // Clear one-shot inputs after processing
            input.toggle_launch = false;
            input.toggle_direction = false;
        })
    }

    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.system.set_origin(Vec2::new(x, y));
    }

    /// Current hook snapshot as JSON
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.system.snapshot()).unwrap_or_default()
    }

    /// Rope and tip geometry as JSON
    pub fn visual_json(&self) -> String {
        serde_json::to_string(&self.system.sync_visuals()).unwrap_or_default()
    }

    /// Live field objects as JSON
    pub fn field_json(&self) -> String {
        serde_json::to_string(&self.field.objects).unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.system.init();
        self.fixed.reset();
        self.input = TickInput::default();
    }
}
