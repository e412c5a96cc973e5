//! World маркеры: всё, что агент может увидеть или что мешает видеть

use bevy::prelude::*;

/// Цель детекции (игрок)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct DetectionTarget;

/// Труп. Хост вешает на умершего агента: detection его больше не тикает,
/// а живые агенты видят его как Corpse стимул.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Corpse;

/// Облако дыма (сфера)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct SmokeVolume {
    pub radius: f32,
}

impl Default for SmokeVolume {
    fn default() -> Self {
        Self { radius: 3.0 }
    }
}

impl SmokeVolume {
    pub fn contains(&self, center: Vec3, point: Vec3) -> bool {
        center.distance_squared(point) <= self.radius * self.radius
    }
}

/// Непрозрачный axis-aligned box (стены, ящики): режет линию видимости
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Occluder {
    pub half_extents: Vec3,
}

impl Default for Occluder {
    fn default() -> Self {
        Self {
            half_extents: Vec3::splat(0.5),
        }
    }
}
