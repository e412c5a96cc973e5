//! StateMachine: suspicion + gate → дискретное состояние и его побочные эффекты
//!
//! Level-triggered: классификация каждый tick. Enter/exit эффекты только на
//! смене состояния, sustain (движение, engagement, повороты) каждый tick.

use bevy::prelude::*;
use rand::Rng;

use crate::detection::collaborators::AgentServices;
use crate::detection::components::{AlertGate, DetectionAgent, DetectionState, LookAround};
use crate::detection::perception::{facing_towards, rotate_towards, AgentPose};
use crate::logger;
use crate::profile::{DetectionProfile, Thresholds};

/// Ближе этого считаем, что дошли (если хост не выставил флаг сам)
const ARRIVAL_TOLERANCE: f32 = 0.5;
/// Look-around закончен, когда до целевого yaw меньше градуса
const LOOK_AROUND_TOLERANCE_DEG: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: DetectionState,
    pub to: DetectionState,
}

/// Чистая классификация: без побочных эффектов, идемпотентна
pub fn classify(suspicion: f32, thresholds: &Thresholds, gate: AlertGate) -> DetectionState {
    if suspicion >= thresholds.alert {
        if gate.is_open() {
            DetectionState::Alerted
        } else {
            DetectionState::Investigating
        }
    } else if suspicion >= thresholds.investigate {
        DetectionState::Investigating
    } else if suspicion >= thresholds.aware {
        DetectionState::Aware
    } else {
        DetectionState::Normal
    }
}

pub struct StateMachine;

impl StateMachine {
    /// Переклассифицировать агента и прогнать эффекты состояния.
    ///
    /// `can_act == false` (оглушён): переходы и alert window идут,
    /// движение и повороты нет.
    pub fn evaluate<R: Rng>(
        agent: &mut DetectionAgent,
        profile: &DetectionProfile,
        pose: &mut AgentPose,
        services: &mut AgentServices<'_>,
        rng: &mut R,
        delta: f32,
        can_act: bool,
    ) -> Option<StateTransition> {
        let next = classify(agent.suspicion, &profile.thresholds, agent.alert_gate());

        let transition = if next != agent.current_state {
            let from = agent.current_state;
            Self::exit(agent, from, services);

            agent.previous_state = from;
            agent.current_state = next;

            logger::log_info(&format!(
                "🔔 Detection: {} → {} (suspicion {:.1})",
                from.label(),
                next.label(),
                agent.suspicion
            ));
            if let Some(presentation) = services.presentation() {
                presentation.on_state_entered(next);
            }

            Self::enter(agent, next, services);
            Some(StateTransition { from, to: next })
        } else {
            None
        };

        agent.speed_multiplier = profile.movement_multiplier(next, agent.has_permanent_buffs);
        agent.rotation_multiplier = profile.rotation_multiplier(next, agent.has_permanent_buffs);

        Self::sustain(agent, profile, pose, services, rng, delta, can_act);
        transition
    }

    fn exit(agent: &mut DetectionAgent, from: DetectionState, services: &mut AgentServices<'_>) {
        agent.look_around = None;
        agent.investigate_idle_timer = 0.0;

        if from != DetectionState::Alerted {
            return;
        }

        agent.abandon_alert_window();
        if agent.engaged {
            if let Some(combat) = services.combat() {
                combat.exit_engagement();
            }
            agent.engaged = false;
            agent.engagement_exit_timer = 0.0;
        }
    }

    fn enter(agent: &mut DetectionAgent, to: DetectionState, services: &mut AgentServices<'_>) {
        match to {
            DetectionState::Alerted | DetectionState::Investigating => services.task().pause(),
            DetectionState::Aware => {
                services.task().pause();
                match services.mobility() {
                    Some(mobility) => mobility.stop_movement(),
                    None => logger::log_warning("🚶 No mobility collaborator: stop skipped"),
                }
            }
            DetectionState::Normal => {
                services.task().resume();
                agent.engagement_exit_timer = 0.0;
            }
        }
    }

    fn sustain<R: Rng>(
        agent: &mut DetectionAgent,
        profile: &DetectionProfile,
        pose: &mut AgentPose,
        services: &mut AgentServices<'_>,
        rng: &mut R,
        delta: f32,
        can_act: bool,
    ) {
        match agent.current_state {
            DetectionState::Alerted => {
                if agent.is_at_alert(&profile.thresholds) {
                    agent.advance_alert_window(profile, delta);
                }
                Self::update_engagement(agent, profile, services, delta);
                if can_act && !agent.engaged {
                    Self::pursue(agent, profile, pose, services, rng, delta);
                }
            }
            DetectionState::Investigating => {
                // В дыму к last-known не идём
                let has_lead = agent.target_visible || !agent.in_smoke;
                if can_act && !agent.engaged && has_lead {
                    Self::pursue(agent, profile, pose, services, rng, delta);
                }
            }
            DetectionState::Aware | DetectionState::Normal => {}
        }

        if can_act {
            Self::face_interest(agent, profile, pose, services, delta);
            Self::advance_look_around(agent, profile, pose, delta);
        }
    }

    fn update_engagement(
        agent: &mut DetectionAgent,
        profile: &DetectionProfile,
        services: &mut AgentServices<'_>,
        delta: f32,
    ) {
        let Some(combat) = services.combat() else {
            return;
        };
        let in_range = combat.is_in_engagement_range();

        if !agent.engaged {
            if in_range {
                combat.enter_engagement();
                agent.engaged = true;
                agent.engagement_exit_timer = 0.0;
                agent.look_around = None;
                agent.investigate_idle_timer = 0.0;
                logger::log_info("⚔️ Engagement started");
            }
            return;
        }

        if in_range {
            agent.engagement_exit_timer = 0.0;
            if !agent.target_visible {
                if let Some(opponent) = combat.opponent_position() {
                    agent.last_known_target_position = opponent;
                }
            }
            return;
        }

        agent.engagement_exit_timer += delta;
        if agent.engagement_exit_timer >= profile.behaviour.engagement_exit_delay {
            combat.exit_engagement();
            agent.engaged = false;
            agent.engagement_exit_timer = 0.0;
            logger::log_info("⚔️ Engagement ended: opponent out of range");
        }
    }

    /// Идти к цели (last-known = позиция цели, если видна), на месте осматриваться
    fn pursue<R: Rng>(
        agent: &mut DetectionAgent,
        profile: &DetectionProfile,
        pose: &AgentPose,
        services: &mut AgentServices<'_>,
        rng: &mut R,
        delta: f32,
    ) {
        let Some(mobility) = services.mobility() else {
            logger::log("🚶 No mobility collaborator: pursuit skipped");
            return;
        };

        mobility.move_to(agent.last_known_target_position);
        let arrived =
            mobility.has_reached_destination() || mobility.remaining_distance() <= ARRIVAL_TOLERANCE;

        if !arrived || agent.target_visible {
            agent.investigate_idle_timer = 0.0;
            return;
        }
        if agent.look_around.is_some() {
            return;
        }
        let Some((interval, angle)) = profile.look_around(agent.current_state) else {
            return;
        };

        agent.investigate_idle_timer += delta;
        if agent.investigate_idle_timer >= interval {
            let spread = angle.abs();
            let yaw: f32 = rng.gen_range(-spread..=spread);
            agent.look_around = Some(LookAround {
                target: Quat::from_rotation_y(yaw.to_radians()) * pose.rotation,
            });
            logger::log(&format!("👀 Look-around started: yaw {:.1}°", yaw));
        }
    }

    /// Поворот к видимой цели / противнику / last-known (Aware)
    fn face_interest(
        agent: &DetectionAgent,
        profile: &DetectionProfile,
        pose: &mut AgentPose,
        services: &AgentServices<'_>,
        delta: f32,
    ) {
        if agent.look_around.is_some() {
            return;
        }

        let point = if agent.engaged {
            services.combat_ref().and_then(|combat| combat.opponent_position())
        } else if agent.current_state == DetectionState::Normal {
            None
        } else if agent.target_visible || agent.current_state == DetectionState::Aware {
            Some(agent.last_known_target_position)
        } else {
            None
        };

        let Some(facing) = point.and_then(|point| facing_towards(pose.position, point)) else {
            return;
        };
        pose.rotation = rotate_towards(pose.rotation, facing, Self::max_turn(agent, profile, delta));
    }

    fn advance_look_around(agent: &mut DetectionAgent, profile: &DetectionProfile, pose: &mut AgentPose, delta: f32) {
        let Some(look) = agent.look_around else {
            return;
        };

        pose.rotation = rotate_towards(pose.rotation, look.target, Self::max_turn(agent, profile, delta));
        if pose.rotation.angle_between(look.target).to_degrees() < LOOK_AROUND_TOLERANCE_DEG {
            agent.look_around = None;
            agent.investigate_idle_timer = 0.0;
        }
    }

    /// Радианы за tick
    fn max_turn(agent: &DetectionAgent, profile: &DetectionProfile, delta: f32) -> f32 {
        (profile.behaviour.base_rotation_speed * agent.rotation_multiplier * delta).to_radians()
    }
}
