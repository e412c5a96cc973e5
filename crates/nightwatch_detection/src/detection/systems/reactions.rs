//! Реакции на события хоста: удары, оглушение, скорость

use bevy::prelude::*;

use crate::components::{Corpse, Incapacitated, Locomotion};
use crate::detection::alert_window::AggroSource;
use crate::detection::components::DetectionAgent;
use crate::detection::events::{AgentHit, HitKind};
use crate::profile::DetectionProfile;

/// System: удар/попадание → instant aggro
///
/// Мёртвых (Corpse) не трогаем.
pub fn apply_instant_aggro(
    mut hits: EventReader<AgentHit>,
    mut agents: Query<(&mut DetectionAgent, &DetectionProfile, &Transform), Without<Corpse>>,
) {
    for hit in hits.read() {
        let Ok((mut agent, profile, transform)) = agents.get_mut(hit.agent) else {
            continue;
        };

        let source = match hit.kind {
            HitKind::Melee => AggroSource::Melee {
                attacker_position: hit.attacker_position,
            },
            HitKind::Ranged => AggroSource::Ranged,
        };
        agent.instant_aggro(profile, source, transform.translation);
    }
}

/// System: отсчёт оглушения, по окончании снимаем статус
pub fn tick_incapacitation(
    mut commands: Commands,
    mut stunned: Query<(Entity, &mut Incapacitated)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut status) in stunned.iter_mut() {
        status.remaining -= delta;
        if status.remaining <= 0.0 {
            commands.entity(entity).remove::<Incapacitated>();
            crate::logger::log(&format!("💫 {:?} recovered", entity));
        }
    }
}

/// System: detection множители → Locomotion для хоста
pub fn sync_locomotion(
    mut agents: Query<(&DetectionAgent, &DetectionProfile, &mut Locomotion), Changed<DetectionAgent>>,
) {
    for (agent, profile, mut locomotion) in agents.iter_mut() {
        locomotion.speed = locomotion.base_speed * agent.speed_multiplier;
        locomotion.turn_rate = profile.behaviour.base_rotation_speed * agent.rotation_multiplier;
    }
}
