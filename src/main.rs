//! Grapple Hook entry point
//!
//! Native builds run a headless scripted session against a seeded field and
//! print the final hook snapshot as JSON. The browser build is driven from
//! `platform::web` instead.
//!
//! Usage: `grapple-hook [--seed N] [--seconds S] [--tuning FILE]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use grapple_hook::HookTuning;
    use grapple_hook::platform::FixedStepLoop;
    use grapple_hook::sim::{
        Field, HookEvent, HookStateMachine, MotionState, OverheatPhase, PlayField, TickInput,
    };

    const SHIP_RADIUS: f32 = 1.0;
    const TIP_RADIUS: f32 = 0.3;
    /// Frame delta the scripted host pretends to render at
    const FRAME_DT: f32 = 1.0 / 144.0;

    #[derive(Parser, Debug)]
    #[command(name = "grapple-hook")]
    #[command(about = "Run a scripted headless hook session and print the final snapshot")]
    pub struct Args {
        /// Field seed
        #[arg(long, default_value_t = 42)]
        pub seed: u64,

        /// Simulated session length in seconds
        #[arg(long, default_value_t = 60.0)]
        pub seconds: f32,

        /// Tuning JSON file (defaults when omitted)
        #[arg(long)]
        pub tuning: Option<PathBuf>,
    }

    /// Session options resolved from the command line
    pub struct Options {
        pub seed: u64,
        pub seconds: f32,
        pub tuning: HookTuning,
    }

    impl Options {
        pub fn from_args() -> Result<Self, String> {
            let args = Args::parse();
            let tuning = match &args.tuning {
                Some(path) => HookTuning::load(path).map_err(|e| e.to_string())?,
                None => HookTuning::default(),
            };

            Ok(Self {
                seed: args.seed,
                seconds: args.seconds,
                tuning,
            })
        }
    }

    /// Scripted pilot: launch whenever parked, hold boost in bursts, flip now and then
    struct Pilot {
        elapsed: f32,
        last_flip: f32,
    }

    impl Pilot {
        fn input(&mut self, system: &HookStateMachine, dt: f32) -> TickInput {
            self.elapsed += dt;
            let snapshot = system.snapshot();

            let flip = self.elapsed - self.last_flip > 3.7;
            if flip {
                self.last_flip = self.elapsed;
            }

            TickInput {
                toggle_launch: snapshot.motion_state == MotionState::ReadyToLaunch
                    && (self.elapsed % 1.5) < dt,
                toggle_direction: flip,
                accelerate_held: snapshot.overheat_phase == OverheatPhase::Normal
                    && (self.elapsed % 6.0) > 4.0,
                contacts: Vec::new(),
            }
        }
    }

    pub fn run(options: Options) {
        let reach = (
            options.tuning.standby_distance + 0.5,
            options.tuning.max_length - 0.5,
        );
        let mut field = Field::scatter(
            options.seed,
            30,
            PlayField::centered(12.0, 8.0, 0.5),
            reach,
        );
        let ship_mass = options.tuning.ship_mass;
        let mut system = HookStateMachine::new(options.tuning);
        let mut fixed = FixedStepLoop::default();
        let mut pilot = Pilot {
            elapsed: 0.0,
            last_flip: 0.0,
        };

        let frames = (options.seconds / FRAME_DT).ceil() as u64;
        let mut ticks = 0u64;
        for _ in 0..frames {
            let mut defeated = false;
            ticks += u64::from(fixed.advance(FRAME_DT, |step| {
                if defeated {
                    return;
                }
                let damage = field.advance(step, system.origin(), SHIP_RADIUS, ship_mass);
                if damage > 0.0 {
                    system.take_damage(damage);
                }

                let mut input = pilot.input(&system, step);
                input.contacts = field.contacts(system.tip_position(), TIP_RADIUS);
                let report = system.simulate(&input, &mut field, step);
                field.carry_grabbed(system.tip_position());
                field.sweep();

                for event in &report.events {
                    match event {
                        HookEvent::Defeated => defeated = true,
                        HookEvent::Harvested { score, .. } => {
                            log::info!("+{} (total {})", score, system.snapshot().score)
                        }
                        _ => log::debug!("{:?}", event),
                    }
                }
            }));

            if defeated {
                log::warn!("Ship lost after {} ticks", ticks);
                break;
            }
            if field.live_count() == 0 {
                log::info!("Field cleared after {} ticks", ticks);
                break;
            }
        }

        log::info!(
            "Session over: {} ticks, {} objects left",
            ticks,
            field.live_count()
        );
        match serde_json::to_string_pretty(&system.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to encode snapshot: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Grapple Hook (native) starting...");

    let options = match headless::Options::from_args() {
        Ok(options) => options,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };
    log::info!("Session started with seed: {}", options.seed);
    headless::run(options);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
