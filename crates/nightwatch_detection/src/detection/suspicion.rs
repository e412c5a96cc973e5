//! SuspicionAccumulator: стимулы → рост suspicion, тишина → спад

use crate::detection::components::DetectionAgent;
use crate::detection::stimulus::{StimulusEvent, StimulusKind, Zone};
use crate::profile::{DetectionProfile, DistanceScaling};

/// Что случилось с suspicion за tick (рост и спад взаимоисключающие)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accumulation {
    Increased(f32),
    Decayed(f32),
    /// Ни роста, ни спада (grace period, ноль, Alerted)
    Held,
    /// Alert window держит suspicion
    Paused,
}

pub struct SuspicionAccumulator;

impl SuspicionAccumulator {
    /// 1 + (peak/100 - 1) * (1 - d/r): peak вплотную, ×1 на краю радиуса
    pub fn distance_factor(peak_percent: f32, distance: f32, radius: f32) -> f32 {
        if radius <= 0.0 {
            return 1.0;
        }
        let clamped = distance.clamp(0.0, radius);
        1.0 + (peak_percent / 100.0 - 1.0) * (1.0 - clamped / radius)
    }

    /// Скорость роста (suspicion/сек) для одного стимула
    pub fn increase_rate(
        event: &StimulusEvent,
        agent: &DetectionAgent,
        profile: &DetectionProfile,
        radius: f32,
    ) -> f32 {
        let tuning = &profile.suspicion;

        let base = match event.kind {
            StimulusKind::Noise => {
                if event.is_walking.unwrap_or(true) {
                    tuning.noise_walk_rate
                } else {
                    tuning.noise_run_rate
                }
            }
            _ => match event.zone {
                Zone::Primary => tuning.primary_rate,
                Zone::Secondary | Zone::Audible => tuning.secondary_rate,
            },
        };

        let kind_constant = match event.kind {
            StimulusKind::Corpse => tuning.corpse_multiplier,
            StimulusKind::Smoke => tuning.smoke_multiplier,
            StimulusKind::Target | StimulusKind::Noise => 1.0,
        };

        let mut rate = base * profile.suspicion_multiplier(agent.current_state) * kind_constant;
        if agent.sensor_state().buffs_apply() {
            rate *= tuning.buff_multiplier;
        }

        let scaling = Self::scaling(profile, event.kind);
        if scaling.enabled {
            rate *= Self::distance_factor(scaling.peak_percent, event.distance, radius);
        }
        rate
    }

    fn scaling(profile: &DetectionProfile, kind: StimulusKind) -> DistanceScaling {
        let tuning = &profile.suspicion;
        match kind {
            StimulusKind::Target => tuning.target_scaling,
            StimulusKind::Corpse => tuning.corpse_scaling,
            StimulusKind::Smoke => tuning.smoke_scaling,
            StimulusKind::Noise => tuning.noise_scaling,
        }
    }

    /// Принимается ли стимул к росту suspicion прямо сейчас
    fn accepts(agent: &DetectionAgent, profile: &DetectionProfile, event: &StimulusEvent) -> bool {
        match event.kind {
            // Один дым не дотягивает до Alerted
            StimulusKind::Smoke => {
                agent.suspicion < profile.thresholds.alert - profile.alert.smoke_ceiling_margin
            }
            StimulusKind::Noise => !agent.target_visible,
            StimulusKind::Target | StimulusKind::Corpse => true,
        }
    }

    /// Применить стимулы tick'а. Нет принятых стимулов → путь спада.
    pub fn accumulate(
        agent: &mut DetectionAgent,
        profile: &DetectionProfile,
        events: &[StimulusEvent],
        delta: f32,
    ) -> Accumulation {
        if agent.alert_window.paused {
            return Accumulation::Paused;
        }

        let radius = profile.effective_radius(agent.sensor_state());
        let ceiling = profile.thresholds.alert;
        let before = agent.suspicion;
        let mut accepted = false;

        for event in events {
            if !Self::accepts(agent, profile, event) {
                continue;
            }
            accepted = true;
            let rate = Self::increase_rate(event, agent, profile, radius);
            agent.suspicion = (agent.suspicion + rate * delta).min(ceiling);
        }

        if accepted {
            return Accumulation::Increased(agent.suspicion - before);
        }

        Self::decay(agent, profile, delta)
    }

    fn decay(agent: &mut DetectionAgent, profile: &DetectionProfile, delta: f32) -> Accumulation {
        agent.out_of_sight_timer += delta;
        agent.noise_heard_timer += delta;

        if agent.suspicion <= 0.0 {
            return Accumulation::Held;
        }

        let state = agent.current_state;
        if agent.out_of_sight_timer < profile.decay_delay(state)
            || agent.noise_heard_timer < profile.decay.noise_delay
        {
            return Accumulation::Held;
        }

        let rate = profile.decay_rate(state, agent.out_of_sight_timer);
        if rate <= 0.0 {
            return Accumulation::Held;
        }

        let before = agent.suspicion;
        agent.suspicion = (agent.suspicion - rate * delta).max(0.0);
        Accumulation::Decayed(before - agent.suspicion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::components::DetectionState;
    use bevy::prelude::*;

    fn target_event(zone: Zone, distance: f32) -> StimulusEvent {
        StimulusEvent {
            kind: StimulusKind::Target,
            zone,
            distance,
            is_walking: None,
            source: Entity::from_raw(1),
            position: Vec3::ZERO,
        }
    }

    fn noise_event(is_walking: bool, distance: f32) -> StimulusEvent {
        StimulusEvent {
            kind: StimulusKind::Noise,
            zone: Zone::Audible,
            distance,
            is_walking: Some(is_walking),
            source: Entity::from_raw(2),
            position: Vec3::ZERO,
        }
    }

    #[test]
    fn test_distance_factor_endpoints() {
        assert_eq!(SuspicionAccumulator::distance_factor(300.0, 0.0, 10.0), 3.0);
        assert_eq!(SuspicionAccumulator::distance_factor(300.0, 10.0, 10.0), 1.0);
        assert_eq!(SuspicionAccumulator::distance_factor(300.0, 25.0, 10.0), 1.0);
        assert_eq!(SuspicionAccumulator::distance_factor(300.0, 5.0, 10.0), 2.0);
    }

    #[test]
    fn test_point_blank_primary_hit_first_tick() {
        let mut profile = DetectionProfile::default();
        profile.suspicion.primary_rate = 8.0;
        let mut agent = DetectionAgent::default();

        let outcome = SuspicionAccumulator::accumulate(
            &mut agent,
            &profile,
            &[target_event(Zone::Primary, 0.0)],
            0.1,
        );

        assert!((agent.suspicion - 2.4).abs() < 1e-4);
        assert!(matches!(outcome, Accumulation::Increased(_)));
    }

    #[test]
    fn test_increase_clamped_to_alert_threshold() {
        let profile = DetectionProfile::default();
        let mut agent = DetectionAgent {
            suspicion: 149.9,
            ..Default::default()
        };

        SuspicionAccumulator::accumulate(&mut agent, &profile, &[target_event(Zone::Primary, 0.0)], 1.0);
        assert_eq!(agent.suspicion, profile.thresholds.alert);
    }

    #[test]
    fn test_paused_ignores_stimuli_and_decay() {
        let profile = DetectionProfile::default();
        let mut agent = DetectionAgent {
            suspicion: 150.0,
            ..Default::default()
        };
        agent.alert_window.paused = true;

        let outcome =
            SuspicionAccumulator::accumulate(&mut agent, &profile, &[target_event(Zone::Primary, 0.0)], 1.0);
        assert_eq!(outcome, Accumulation::Paused);
        assert_eq!(agent.suspicion, 150.0);

        let outcome = SuspicionAccumulator::accumulate(&mut agent, &profile, &[], 100.0);
        assert_eq!(outcome, Accumulation::Paused);
        assert_eq!(agent.out_of_sight_timer, 0.0);
    }

    #[test]
    fn test_decay_waits_for_both_grace_periods() {
        let profile = DetectionProfile::default();
        let mut agent = DetectionAgent {
            suspicion: 80.0,
            current_state: DetectionState::Aware,
            out_of_sight_timer: 10.0,
            noise_heard_timer: 0.0,
            ..Default::default()
        };

        // Шум слышали только что: спада нет
        assert_eq!(
            SuspicionAccumulator::accumulate(&mut agent, &profile, &[], 1.0),
            Accumulation::Held
        );
        assert_eq!(agent.suspicion, 80.0);

        agent.noise_heard_timer = 5.0;
        let outcome = SuspicionAccumulator::accumulate(&mut agent, &profile, &[], 0.5);
        assert_eq!(outcome, Accumulation::Decayed(4.0));
        assert_eq!(agent.suspicion, 76.0);
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let profile = DetectionProfile::default();
        let mut agent = DetectionAgent {
            suspicion: 1.0,
            current_state: DetectionState::Aware,
            out_of_sight_timer: 20.0,
            noise_heard_timer: 20.0,
            ..Default::default()
        };

        SuspicionAccumulator::accumulate(&mut agent, &profile, &[], 5.0);
        assert_eq!(agent.suspicion, 0.0);
    }

    #[test]
    fn test_increase_and_decay_never_both() {
        let profile = DetectionProfile::default();
        let mut agent = DetectionAgent {
            suspicion: 60.0,
            current_state: DetectionState::Aware,
            out_of_sight_timer: 20.0,
            noise_heard_timer: 20.0,
            ..Default::default()
        };

        let outcome = SuspicionAccumulator::accumulate(
            &mut agent,
            &profile,
            &[target_event(Zone::Secondary, 10.0)],
            0.1,
        );
        assert!(matches!(outcome, Accumulation::Increased(_)));
        assert!(agent.suspicion > 60.0);
        // Таймеры спада не двигались
        assert_eq!(agent.out_of_sight_timer, 20.0);
    }

    #[test]
    fn test_smoke_stops_just_below_alert() {
        let profile = DetectionProfile::default();
        let mut agent = DetectionAgent {
            suspicion: 149.0,
            current_state: DetectionState::Investigating,
            ..Default::default()
        };
        let smoke = StimulusEvent {
            kind: StimulusKind::Smoke,
            zone: Zone::Primary,
            distance: 3.0,
            is_walking: None,
            source: Entity::from_raw(3),
            position: Vec3::ZERO,
        };

        let outcome = SuspicionAccumulator::accumulate(&mut agent, &profile, &[smoke], 1.0);
        assert!(!matches!(outcome, Accumulation::Increased(_)));
        assert!(agent.suspicion <= 149.0);
    }

    #[test]
    fn test_noise_ignored_while_target_visible() {
        let profile = DetectionProfile::default();
        let mut agent = DetectionAgent {
            target_visible: true,
            ..Default::default()
        };

        SuspicionAccumulator::accumulate(&mut agent, &profile, &[noise_event(false, 1.0)], 0.1);
        assert_eq!(agent.suspicion, 0.0);

        agent.target_visible = false;
        SuspicionAccumulator::accumulate(&mut agent, &profile, &[noise_event(false, 1.0)], 0.1);
        assert!(agent.suspicion > 0.0);
    }

    #[test]
    fn test_running_noise_louder_than_walking() {
        let profile = DetectionProfile::default();
        let agent = DetectionAgent::default();

        let walk = SuspicionAccumulator::increase_rate(&noise_event(true, 4.0), &agent, &profile, 16.5);
        let run = SuspicionAccumulator::increase_rate(&noise_event(false, 4.0), &agent, &profile, 16.5);
        assert!(run > walk);
    }

    #[test]
    fn test_buff_multiplier_only_outside_alert_window() {
        let profile = DetectionProfile::default();
        let event = target_event(Zone::Secondary, 16.5);

        let plain = DetectionAgent::default();
        let mut buffed = DetectionAgent {
            has_permanent_buffs: true,
            ..Default::default()
        };

        let base = SuspicionAccumulator::increase_rate(&event, &plain, &profile, 16.5);
        let boosted = SuspicionAccumulator::increase_rate(&event, &buffed, &profile, 16.5);
        assert!((boosted - base * 1.4).abs() < 1e-4);

        buffed.alert_window.active = true;
        let in_window = SuspicionAccumulator::increase_rate(&event, &buffed, &profile, 16.5);
        assert_eq!(in_window, base);
    }
}
