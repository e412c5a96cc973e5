//! Detection Events: граница между хостом и detection
//!
//! Вход: AgentHit (бой хоста), NoiseEmitted (шаги/выстрелы цели).
//! Выход: DetectionStateEntered (звук/иконка/анимация), AlertPropagated.

use bevy::prelude::*;

use crate::detection::components::DetectionState;
use crate::detection::propagation::AlertTransfer;

/// Радиус слышимости шагов (метры)
pub const WALK_NOISE_RADIUS: f32 = 5.0;
pub const RUN_NOISE_RADIUS: f32 = 10.0;

/// Агент сменил состояние (one-shot на переход)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DetectionStateEntered {
    pub agent: Entity,
    pub from: DetectionState,
    pub to: DetectionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Melee,
    Ranged,
}

/// Агента ударили/подстрелили → instant aggro
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentHit {
    pub agent: Entity,
    pub kind: HitKind,
    pub attacker_position: Vec3,
}

/// Шум, который слышат агенты в `audible_radius`
#[derive(Event, Debug, Clone, Copy)]
pub struct NoiseEmitted {
    pub source: Entity,
    pub position: Vec3,
    pub audible_radius: f32,
    pub is_walking: bool,
}

impl NoiseEmitted {
    pub fn footstep(source: Entity, position: Vec3, is_walking: bool) -> Self {
        Self {
            source,
            position,
            audible_radius: if is_walking {
                WALK_NOISE_RADIUS
            } else {
                RUN_NOISE_RADIUS
            },
            is_walking,
        }
    }
}

/// Buffed агент передал тревогу peer'у
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AlertPropagated {
    pub source: Entity,
    pub peer: Entity,
    pub transfer: AlertTransfer,
}
