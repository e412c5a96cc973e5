//! PerceptionSampler: какие стимулы агент воспринимает в этот tick
//!
//! Визуальные виды (Target, Corpse, Smoke): сфера effective radius →
//! угол к forward → зона → линия видимости. Noise: всенаправленно,
//! только audible radius источника.

use bevy::prelude::*;

use crate::detection::collaborators::AgentServices;
use crate::detection::components::DetectionAgent;
use crate::detection::stimulus::{SensedEntity, SensedPayload, StimulusEvent, StimulusKind, Zone};
use crate::logger;
use crate::profile::DetectionProfile;

/// Позиция и ориентация агента на время tick'а (forward = -Z)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl AgentPose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_transform(transform: &Transform) -> Self {
        Self::new(transform.translation, transform.rotation)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

/// Угол (градусы) между forward и направлением на точку.
/// Точка в позиции агента = прямо перед ним (0°).
pub fn angle_to(pose: &AgentPose, point: Vec3) -> f32 {
    let offset = point - pose.position;
    if offset.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    pose.forward().angle_between(offset).to_degrees()
}

/// Зона по углу. None = вне обоих конусов.
pub fn classify_zone(angle: f32, primary_half_angle: f32, secondary_half_angle: f32) -> Option<Zone> {
    if angle <= primary_half_angle {
        Some(Zone::Primary)
    } else if angle <= secondary_half_angle {
        Some(Zone::Secondary)
    } else {
        None
    }
}

/// Yaw-only ориентация "смотреть на точку" (None если точка над/под агентом)
pub fn facing_towards(position: Vec3, point: Vec3) -> Option<Quat> {
    let dir = (point - position).with_y(0.0);
    if dir.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-dir.x, -dir.z)))
}

/// Повернуть `from` к `to` не больше чем на `max_angle` радиан
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        return to;
    }
    from.slerp(to, max_angle / angle)
}

pub struct PerceptionSampler;

impl PerceptionSampler {
    /// Опросить мир и вернуть принятые стимулы (в порядке Target, Corpse, Smoke, Noise).
    ///
    /// Сбрасывает и заново выставляет visibility флаги агента,
    /// обновляет last-known позицию и grace таймеры.
    pub fn sample(
        agent: &mut DetectionAgent,
        profile: &DetectionProfile,
        pose: &AgentPose,
        services: &AgentServices<'_>,
    ) -> Vec<StimulusEvent> {
        agent.target_visible = false;
        agent.corpse_visible = false;
        agent.smoke_exposed = false;

        let sensor = agent.sensor_state();
        let radius = profile.effective_radius(sensor);
        let primary_half = profile.primary_half_angle(sensor);
        let secondary_half = profile.secondary_half_angle(sensor);

        let mut events = Vec::new();
        let mut blind_candidates = 0usize;

        for kind in StimulusKind::VISUAL {
            for candidate in services.world().find_entities(kind, radius, pose.position) {
                if kind == StimulusKind::Corpse && agent.has_seen_corpse(candidate.entity) {
                    continue;
                }

                let angle = angle_to(pose, candidate.position);
                let Some(zone) = classify_zone(angle, primary_half, secondary_half) else {
                    continue;
                };

                // Нет mobility → нет линии видимости
                let Some(mobility) = services.mobility_ref() else {
                    blind_candidates += 1;
                    continue;
                };
                if !mobility.has_line_of_sight(pose.position, candidate.position) {
                    continue;
                }

                Self::register_sighting(agent, kind, &candidate, pose);
                events.push(StimulusEvent {
                    kind,
                    zone,
                    distance: pose.position.distance(candidate.position),
                    is_walking: None,
                    source: candidate.entity,
                    position: candidate.position,
                });
            }
        }

        if blind_candidates > 0 {
            logger::log(&format!(
                "👁️ No mobility collaborator: {} visual candidate(s) rejected (no sight line)",
                blind_candidates
            ));
        }

        let hearing = profile.suspicion.hearing_radius;
        for candidate in services.world().find_entities(StimulusKind::Noise, hearing, pose.position) {
            let SensedPayload::Sound {
                audible_radius,
                is_walking,
            } = candidate.payload
            else {
                continue;
            };

            let distance = pose.position.distance(candidate.position);
            if distance > audible_radius {
                continue;
            }

            agent.noise_heard_timer = 0.0;
            if !agent.target_visible && agent.suspicion >= profile.thresholds.aware {
                agent.last_known_target_position = candidate.position;
            }

            events.push(StimulusEvent {
                kind: StimulusKind::Noise,
                zone: Zone::Audible,
                distance,
                is_walking: Some(is_walking),
                source: candidate.entity,
                position: candidate.position,
            });
        }

        events
    }

    fn register_sighting(agent: &mut DetectionAgent, kind: StimulusKind, candidate: &SensedEntity, pose: &AgentPose) {
        match kind {
            StimulusKind::Target => {
                agent.target_visible = true;
                agent.last_known_target_position = candidate.position;
                agent.out_of_sight_timer = 0.0;
            }
            StimulusKind::Corpse => {
                agent.corpse_visible = true;
                agent.last_known_target_position = candidate.position;
            }
            StimulusKind::Smoke => {
                agent.smoke_exposed = true;
                // Точка перед облаком (со стороны агента)
                let radius = match candidate.payload {
                    SensedPayload::SmokeCloud { radius } => radius,
                    _ => 0.0,
                };
                let dir = (candidate.position - pose.position).normalize_or_zero();
                agent.last_known_target_position = candidate.position - dir * (radius + 1.0);
            }
            StimulusKind::Noise => {}
        }
    }

    /// Трупы, увиденные на alert пороге, больше не считаются
    /// (вызывается после накопления suspicion за tick)
    pub fn commit_corpses(agent: &mut DetectionAgent, profile: &DetectionProfile, events: &[StimulusEvent]) {
        if !agent.is_at_alert(&profile.thresholds) {
            return;
        }
        for event in events.iter().filter(|e| e.kind == StimulusKind::Corpse) {
            if agent.corpses_seen.insert(event.source) {
                logger::log(&format!("💀 Corpse {:?} registered as seen", event.source));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_forward_is_negative_z() {
        let pose = AgentPose::new(Vec3::ZERO, Quat::IDENTITY);
        assert_eq!(pose.forward(), Vec3::NEG_Z);
        assert!(angle_to(&pose, Vec3::new(0.0, 0.0, -5.0)) < 1e-3);
        assert!((angle_to(&pose, Vec3::new(5.0, 0.0, 0.0)) - 90.0).abs() < 1e-3);
        assert!((angle_to(&pose, Vec3::new(0.0, 0.0, 5.0)) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_point_blank_is_dead_ahead() {
        let pose = AgentPose::new(Vec3::new(1.0, 0.0, 1.0), Quat::from_rotation_y(FRAC_PI_2));
        assert_eq!(angle_to(&pose, pose.position), 0.0);
    }

    #[test]
    fn test_classify_zone_boundaries() {
        assert_eq!(classify_zone(0.0, 32.5, 55.0), Some(Zone::Primary));
        assert_eq!(classify_zone(32.5, 32.5, 55.0), Some(Zone::Primary));
        assert_eq!(classify_zone(40.0, 32.5, 55.0), Some(Zone::Secondary));
        assert_eq!(classify_zone(55.0, 32.5, 55.0), Some(Zone::Secondary));
        assert_eq!(classify_zone(55.1, 32.5, 55.0), None);
    }

    #[test]
    fn test_facing_towards_points_forward_at_target() {
        let position = Vec3::new(2.0, 0.0, 2.0);
        let point = Vec3::new(7.0, 3.0, 2.0);
        let rotation = facing_towards(position, point).unwrap();
        let forward = rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5);

        assert!(facing_towards(position, position + Vec3::Y).is_none());
    }

    #[test]
    fn test_rotate_towards_is_rate_limited() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_y(FRAC_PI_2);

        let step = rotate_towards(from, to, 0.5);
        assert!((from.angle_between(step) - 0.5).abs() < 1e-3);

        let done = rotate_towards(step, to, 10.0);
        assert_eq!(done, to);
    }
}
