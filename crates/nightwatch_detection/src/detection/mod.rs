//! Stealth detection module
//!
//! Per-agent suspicion meter + дискретная alert FSM:
//! - SensorProfile (`sensor`): радиус/углы от состояния, buffs, дыма
//! - PerceptionSampler (`perception`): что агент видит/слышит
//! - SuspicionAccumulator (`suspicion`): рост и спад suspicion
//! - StateMachine (`state_machine`) + alert window (`alert_window`)
//! - AlertPropagator (`propagation`): тревога соседям
//!
//! Ядро не зависит от ECS (collaborators через trait'ы), ECS shell в `systems`.

use bevy::prelude::*;

pub mod alert_window;
pub mod collaborators;
pub mod components;
pub mod events;
pub mod perception;
pub mod pipeline;
pub mod propagation;
pub mod sensor;
pub mod state_machine;
pub mod stimulus;
pub mod suspicion;
pub mod systems;

#[cfg(test)]
mod test_support;


pub use alert_window::{AggroSource, WindowTick};
pub use collaborators::{AgentServices, AgentServicesBuilder, Combat, Mobility, Presentation, TaskControl, WorldQuery};
pub use components::*;
pub use events::*;
pub use perception::{AgentPose, PerceptionSampler};
pub use pipeline::{TickContext, TickReport};
pub use propagation::{AlertBroadcast, AlertPropagator, AlertTransfer, PeerHandle};
pub use state_machine::{classify, StateMachine, StateTransition};
pub use stimulus::{SensedEntity, SensedPayload, StimulusEvent, StimulusKind, Zone};
pub use suspicion::{Accumulation, SuspicionAccumulator};
pub use systems::StimulusIndex;

/// Detection Plugin
///
/// Регистрирует detection системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. tick_incapacitation: отсчёт оглушения
/// 2. rebuild_stimulus_index: снимок целей/трупов/дыма/шума/стен
/// 3. apply_instant_aggro: удары этого tick'а
/// 4. run_detection_tick: Sample → Accumulate → Classify → Propagate
/// 5. sync_locomotion: множители скорости для хоста
pub struct DetectionPlugin;

impl Plugin for DetectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StimulusIndex>()
            .init_resource::<crate::DeterministicRng>()
            .add_event::<DetectionStateEntered>()
            .add_event::<AgentHit>()
            .add_event::<NoiseEmitted>()
            .add_event::<AlertPropagated>()
            .add_systems(
                FixedUpdate,
                (
                    systems::tick_incapacitation,
                    systems::rebuild_stimulus_index,
                    systems::apply_instant_aggro,
                    systems::run_detection_tick,
                    systems::sync_locomotion,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            );
    }
}
