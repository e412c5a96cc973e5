//! AlertPropagator: buffed агент делится тревогой с соседями
//!
//! Планирование (`AlertBroadcast::from_source`) читает источник только
//! через `&DetectionAgent`. Применение идёт к peer'ам, источник не трогается.

use bevy::prelude::*;

use crate::detection::collaborators::Mobility;
use crate::detection::components::DetectionAgent;
use crate::logger;
use crate::profile::DetectionProfile;

/// Что получает peer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertTransfer {
    /// Источник видит цель на alert пороге: peer сразу в тревоге и идёт к цели
    Full { position: Vec3 },
    /// Только permanent buffs
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertBroadcast {
    pub source: Entity,
    pub origin: Vec3,
    pub radius: f32,
    pub transfer: AlertTransfer,
}

impl AlertBroadcast {
    /// None, пока у источника нет permanent buffs
    pub fn from_source(
        source: Entity,
        agent: &DetectionAgent,
        profile: &DetectionProfile,
        origin: Vec3,
    ) -> Option<Self> {
        if !agent.has_permanent_buffs {
            return None;
        }

        let transfer = if agent.target_visible && agent.is_at_alert(&profile.thresholds) {
            AlertTransfer::Full {
                position: agent.last_known_target_position,
            }
        } else {
            AlertTransfer::Passive
        };

        Some(Self {
            source,
            origin,
            radius: profile.spread_radius(agent.alert_window.active),
            transfer,
        })
    }

    /// Peer в радиусе (источник сам себе не peer)
    pub fn reaches(&self, peer: Entity, position: Vec3) -> bool {
        peer != self.source && self.origin.distance(position) <= self.radius
    }

    /// Применить к peer'у. false = peer в бою, пропущен.
    pub fn apply(
        &self,
        peer: &mut DetectionAgent,
        peer_profile: &DetectionProfile,
        mobility: Option<&mut dyn Mobility>,
    ) -> bool {
        if peer.engaged {
            return false;
        }

        match self.transfer {
            AlertTransfer::Full { position } => {
                peer.suspicion = peer_profile.thresholds.alert;
                peer.last_known_target_position = position;
                peer.refresh_grace_timers();
                match mobility {
                    Some(mobility) => mobility.move_to(position),
                    None => logger::log_warning("📣 Alert shared with a peer without mobility"),
                }
            }
            AlertTransfer::Passive => {
                peer.has_permanent_buffs = true;
            }
        }
        true
    }
}

/// Peer для propagation (ECS system собирает их из query)
pub struct PeerHandle<'a> {
    pub entity: Entity,
    pub position: Vec3,
    pub alive: bool,
    pub agent: &'a mut DetectionAgent,
    pub profile: &'a DetectionProfile,
    pub mobility: Option<&'a mut dyn Mobility>,
}

pub struct AlertPropagator;

impl AlertPropagator {
    /// Разослать broadcast. Peer'ы обходятся по возрастанию Entity.
    /// Возвращает тех, кого задело.
    pub fn propagate<'a>(
        broadcast: &AlertBroadcast,
        peers: impl IntoIterator<Item = PeerHandle<'a>>,
    ) -> Vec<Entity> {
        let mut peers: Vec<PeerHandle<'a>> = peers.into_iter().collect();
        peers.sort_by_key(|peer| peer.entity);

        let mut reached = Vec::new();
        for peer in peers {
            if !peer.alive || !broadcast.reaches(peer.entity, peer.position) {
                continue;
            }
            if broadcast.apply(peer.agent, peer.profile, peer.mobility) {
                reached.push(peer.entity);
            }
        }

        if !reached.is_empty() {
            logger::log(&format!(
                "📣 {:?} propagated {:?} to {} peer(s)",
                broadcast.source,
                broadcast.transfer,
                reached.len()
            ));
        }
        reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::test_support::FakeMobility;

    fn buffed_source() -> DetectionAgent {
        DetectionAgent {
            suspicion: 120.0,
            has_permanent_buffs: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_broadcast_without_buffs() {
        let profile = DetectionProfile::default();
        let agent = DetectionAgent {
            suspicion: 150.0,
            target_visible: true,
            ..Default::default()
        };
        assert!(AlertBroadcast::from_source(Entity::from_raw(1), &agent, &profile, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_passive_transfer_only_grants_buffs() {
        let profile = DetectionProfile::default();
        let source = buffed_source();
        let broadcast =
            AlertBroadcast::from_source(Entity::from_raw(1), &source, &profile, Vec3::ZERO).unwrap();
        assert_eq!(broadcast.transfer, AlertTransfer::Passive);
        assert_eq!(broadcast.radius, profile.alert.buffed_spread);

        let mut peer = DetectionAgent {
            suspicion: 30.0,
            last_known_target_position: Vec3::new(1.0, 0.0, 1.0),
            ..Default::default()
        };
        let reached = AlertPropagator::propagate(
            &broadcast,
            [PeerHandle {
                entity: Entity::from_raw(2),
                position: Vec3::new(5.0, 0.0, 0.0),
                alive: true,
                agent: &mut peer,
                profile: &profile,
                mobility: None,
            }],
        );

        assert_eq!(reached, vec![Entity::from_raw(2)]);
        assert!(peer.has_permanent_buffs);
        assert_eq!(peer.suspicion, 30.0);
        assert_eq!(peer.last_known_target_position, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_full_transfer_alerts_and_moves_peer() {
        let profile = DetectionProfile::default();
        let target = Vec3::new(0.0, 0.0, -8.0);
        let source = DetectionAgent {
            suspicion: 150.0,
            has_permanent_buffs: true,
            target_visible: true,
            last_known_target_position: target,
            ..Default::default()
        };
        let broadcast =
            AlertBroadcast::from_source(Entity::from_raw(1), &source, &profile, Vec3::ZERO).unwrap();

        let mut peer = DetectionAgent {
            out_of_sight_timer: 12.0,
            noise_heard_timer: 12.0,
            ..Default::default()
        };
        let mut mobility = FakeMobility::default();
        AlertPropagator::propagate(
            &broadcast,
            [PeerHandle {
                entity: Entity::from_raw(2),
                position: Vec3::new(0.0, 0.0, 6.0),
                alive: true,
                agent: &mut peer,
                profile: &profile,
                mobility: Some(&mut mobility as &mut dyn Mobility),
            }],
        );

        assert_eq!(peer.suspicion, profile.thresholds.alert);
        assert_eq!(peer.last_known_target_position, target);
        assert_eq!(mobility.destination, Some(target));
        // Тревога от соседа = свежее обнаружение
        assert_eq!(peer.out_of_sight_timer, 0.0);
        assert_eq!(peer.noise_heard_timer, 0.0);
    }

    #[test]
    fn test_skips_self_engaged_dead_and_distant_peers() {
        let profile = DetectionProfile::default();
        let source_entity = Entity::from_raw(1);
        let source = buffed_source();
        let broadcast = AlertBroadcast::from_source(source_entity, &source, &profile, Vec3::ZERO).unwrap();

        let mut itself = buffed_source();
        let mut engaged = DetectionAgent {
            engaged: true,
            ..Default::default()
        };
        let mut dead = DetectionAgent::default();
        let mut far = DetectionAgent::default();

        let reached = AlertPropagator::propagate(
            &broadcast,
            [
                PeerHandle {
                    entity: source_entity,
                    position: Vec3::ZERO,
                    alive: true,
                    agent: &mut itself,
                    profile: &profile,
                    mobility: None,
                },
                PeerHandle {
                    entity: Entity::from_raw(2),
                    position: Vec3::X,
                    alive: true,
                    agent: &mut engaged,
                    profile: &profile,
                    mobility: None,
                },
                PeerHandle {
                    entity: Entity::from_raw(3),
                    position: Vec3::X,
                    alive: false,
                    agent: &mut dead,
                    profile: &profile,
                    mobility: None,
                },
                PeerHandle {
                    entity: Entity::from_raw(4),
                    position: Vec3::new(100.0, 0.0, 0.0),
                    alive: true,
                    agent: &mut far,
                    profile: &profile,
                    mobility: None,
                },
            ],
        );

        assert!(reached.is_empty());
        assert!(!engaged.has_permanent_buffs);
        assert!(!dead.has_permanent_buffs);
        assert!(!far.has_permanent_buffs);
        assert_eq!(itself, buffed_source());
    }

    #[test]
    fn test_alert_window_widens_spread() {
        let profile = DetectionProfile::default();
        let mut source = buffed_source();
        source.alert_window.active = true;

        let broadcast = AlertBroadcast::from_source(Entity::from_raw(1), &source, &profile, Vec3::ZERO).unwrap();
        assert_eq!(broadcast.radius, profile.alert.alert_spread);
        assert!(broadcast.reaches(Entity::from_raw(2), Vec3::new(20.0, 0.0, 0.0)));
        assert!(!broadcast.reaches(Entity::from_raw(2), Vec3::new(22.0, 0.0, 0.0)));
    }
}
