//! Стимулы: что агент заметил за tick

use bevy::prelude::*;

/// Вид стимула. Порядок = порядок опроса в PerceptionSampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub enum StimulusKind {
    Target,
    Corpse,
    Smoke,
    Noise,
}

impl StimulusKind {
    pub const VISUAL: [StimulusKind; 3] = [StimulusKind::Target, StimulusKind::Corpse, StimulusKind::Smoke];
}

/// Зона, в которой пойман стимул
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Zone {
    /// Узкий конус, быстрый рост
    Primary,
    /// Широкий конус, медленный рост
    Secondary,
    /// Слух (без конуса и окклюзии)
    Audible,
}

/// Кандидат из WorldQuery
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensedEntity {
    pub entity: Entity,
    pub position: Vec3,
    pub payload: SensedPayload,
}

/// Kind-специфичные данные кандидата
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensedPayload {
    Body,
    SmokeCloud { radius: f32 },
    Sound { audible_radius: f32, is_walking: bool },
}

impl SensedEntity {
    pub fn body(entity: Entity, position: Vec3) -> Self {
        Self {
            entity,
            position,
            payload: SensedPayload::Body,
        }
    }

    pub fn smoke(entity: Entity, position: Vec3, radius: f32) -> Self {
        Self {
            entity,
            position,
            payload: SensedPayload::SmokeCloud { radius },
        }
    }

    pub fn sound(entity: Entity, position: Vec3, audible_radius: f32, is_walking: bool) -> Self {
        Self {
            entity,
            position,
            payload: SensedPayload::Sound {
                audible_radius,
                is_walking,
            },
        }
    }
}

/// Принятый стимул (живёт один tick)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StimulusEvent {
    pub kind: StimulusKind,
    pub zone: Zone,
    pub distance: f32,
    /// Только для Noise
    pub is_walking: Option<bool>,
    pub source: Entity,
    pub position: Vec3,
}
