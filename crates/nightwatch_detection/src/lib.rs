//! Nightwatch Detection Core
//!
//! Stealth detection на Bevy 0.16: suspicion meter, alert FSM,
//! alert window с permanent buffs и propagation тревоги между охранниками.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = detection state, суждения агентов (кого видим, насколько встревожены)
//! - Хост = навигация, анимация, звук, бой (через MovementCommand, события)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod detection;
pub mod error;
pub mod logger;
pub mod profile;

// Re-export базовых типов для удобства
pub use components::*;
pub use detection::{
    AgentHit, AlertPropagated, DetectionAgent, DetectionPlugin, DetectionState, DetectionStateEntered, HitKind,
    NoiseEmitted, StimulusIndex,
};
pub use error::DetectionError;
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use profile::{load_profile, DetectionProfile};

/// Главный plugin (fixed timestep + detection)
pub struct NightwatchPlugin;

impl Plugin for NightwatchPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для detection tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(DetectionPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Прогнать `ticks` шагов FixedUpdate без реального времени
pub fn run_fixed_ticks(app: &mut App, ticks: u32) {
    let timestep = app.world().resource::<Time<Fixed>>().timestep();
    for _ in 0..ticks {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(timestep);
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Snapshot компонентов для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| *entity);

    let mut snapshot = Vec::new();
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.to_bits().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }
    snapshot
}
