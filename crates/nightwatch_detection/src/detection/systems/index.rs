//! StimulusIndex: снимок сенсорных сущностей мира на tick
//!
//! Пересобирается в начале каждого FixedUpdate. Реализует WorldQuery и
//! линию видимости (отрезок против AABB окклюдеров).

use bevy::prelude::*;

use crate::components::{Corpse, DetectionTarget, Occluder, SmokeVolume};
use crate::detection::collaborators::WorldQuery;
use crate::detection::events::NoiseEmitted;
use crate::detection::stimulus::{SensedEntity, SensedPayload, StimulusKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccluderBox {
    pub entity: Entity,
    pub min: Vec3,
    pub max: Vec3,
}

impl OccluderBox {
    pub fn new(entity: Entity, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            entity,
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Slab test: пересекает ли отрезок from→to этот box
    pub fn blocks(&self, from: Vec3, to: Vec3) -> bool {
        let dir = to - from;
        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;

        for axis in 0..3 {
            let origin = from[axis];
            let step = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if step.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / step;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct StimulusIndex {
    entries: Vec<(StimulusKind, SensedEntity)>,
    occluders: Vec<OccluderBox>,
}

impl StimulusIndex {
    pub fn clear(&mut self) {
        self.entries.clear();
        self.occluders.clear();
    }

    pub fn insert(&mut self, kind: StimulusKind, sensed: SensedEntity) {
        self.entries.push((kind, sensed));
    }

    pub fn insert_occluder(&mut self, occluder: OccluderBox) {
        self.occluders.push(occluder);
    }

    /// Стабильный порядок (kind, entity) для детерминизма
    pub fn sort(&mut self) {
        self.entries
            .sort_by_key(|(kind, sensed)| (*kind, sensed.entity));
        self.occluders.sort_by_key(|occluder| occluder.entity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn line_of_sight(&self, from: Vec3, to: Vec3) -> bool {
        !self.occluders.iter().any(|occluder| occluder.blocks(from, to))
    }

    /// Ближайшая сущность вида `kind`
    pub fn nearest(&self, kind: StimulusKind, origin: Vec3) -> Option<Vec3> {
        self.entries
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, sensed)| sensed.position)
            .min_by(|a, b| origin.distance_squared(*a).total_cmp(&origin.distance_squared(*b)))
    }

    /// Точка внутри хотя бы одного облака дыма
    pub fn inside_smoke(&self, point: Vec3) -> bool {
        self.entries.iter().any(|(kind, sensed)| match (kind, sensed.payload) {
            (StimulusKind::Smoke, SensedPayload::SmokeCloud { radius }) => {
                SmokeVolume { radius }.contains(sensed.position, point)
            }
            _ => false,
        })
    }
}

impl WorldQuery for StimulusIndex {
    fn find_entities(&self, kind: StimulusKind, radius: f32, origin: Vec3) -> Vec<SensedEntity> {
        let radius_sq = radius * radius;
        self.entries
            .iter()
            .filter(|(k, sensed)| *k == kind && sensed.position.distance_squared(origin) <= radius_sq)
            .map(|(_, sensed)| *sensed)
            .collect()
    }
}

/// System: пересобрать StimulusIndex из мира и шумов этого tick'а
pub fn rebuild_stimulus_index(
    mut index: ResMut<StimulusIndex>,
    targets: Query<(Entity, &Transform), (With<DetectionTarget>, Without<Corpse>)>,
    corpses: Query<(Entity, &Transform), With<Corpse>>,
    smoke: Query<(Entity, &Transform, &SmokeVolume)>,
    occluders: Query<(Entity, &Transform, &Occluder)>,
    mut noises: EventReader<NoiseEmitted>,
) {
    index.clear();

    for (entity, transform) in targets.iter() {
        index.insert(StimulusKind::Target, SensedEntity::body(entity, transform.translation));
    }
    for (entity, transform) in corpses.iter() {
        index.insert(StimulusKind::Corpse, SensedEntity::body(entity, transform.translation));
    }
    for (entity, transform, volume) in smoke.iter() {
        index.insert(
            StimulusKind::Smoke,
            SensedEntity::smoke(entity, transform.translation, volume.radius),
        );
    }
    for noise in noises.read() {
        index.insert(
            StimulusKind::Noise,
            SensedEntity::sound(noise.source, noise.position, noise.audible_radius, noise.is_walking),
        );
    }
    for (entity, transform, occluder) in occluders.iter() {
        index.insert_occluder(OccluderBox::new(entity, transform.translation, occluder.half_extents));
    }

    index.sort();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_blocks_sight_line() {
        let wall = OccluderBox::new(Entity::from_raw(1), Vec3::new(0.0, 0.0, -5.0), Vec3::new(2.0, 2.0, 0.25));

        assert!(wall.blocks(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0)));
        // Отрезок кончается перед стеной
        assert!(!wall.blocks(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0)));
        // Мимо стены
        assert!(!wall.blocks(Vec3::new(5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, -10.0)));
    }

    #[test]
    fn test_find_entities_filters_kind_and_radius() {
        let mut index = StimulusIndex::default();
        index.insert(StimulusKind::Target, SensedEntity::body(Entity::from_raw(1), Vec3::new(0.0, 0.0, -5.0)));
        index.insert(StimulusKind::Target, SensedEntity::body(Entity::from_raw(2), Vec3::new(0.0, 0.0, -50.0)));
        index.insert(StimulusKind::Corpse, SensedEntity::body(Entity::from_raw(3), Vec3::ZERO));

        let found = index.find_entities(StimulusKind::Target, 10.0, Vec3::ZERO);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entity, Entity::from_raw(1));
        assert_eq!(index.nearest(StimulusKind::Target, Vec3::ZERO), Some(Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_inside_smoke() {
        let mut index = StimulusIndex::default();
        index.insert(StimulusKind::Smoke, SensedEntity::smoke(Entity::from_raw(9), Vec3::ZERO, 3.0));

        assert!(index.inside_smoke(Vec3::new(1.0, 0.0, 1.0)));
        assert!(!index.inside_smoke(Vec3::new(4.0, 0.0, 0.0)));
    }
}
