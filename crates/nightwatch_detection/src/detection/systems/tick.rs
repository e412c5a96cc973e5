//! System: detection tick всех агентов
//!
//! Агенты обходятся по возрастанию Entity. Каждый проходит полный цикл
//! (Sample → Accumulate → Classify → Propagate) до следующего, поэтому
//! агент, поднятый раньше в том же кадре, уже обновлён к моменту
//! propagation более поздних. Peer'ы (живые, без Corpse) получают тревогу
//! через `AlertPropagator`.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::components::{Corpse, Engagement, Incapacitated, MovementCommand, NavigationState, TaskActivity};
use crate::detection::collaborators::{AgentServices, Mobility};
use crate::detection::components::DetectionAgent;
use crate::detection::events::{AlertPropagated, DetectionStateEntered};
use crate::detection::perception::AgentPose;
use crate::detection::pipeline::TickContext;
use crate::detection::propagation::{AlertBroadcast, AlertPropagator, PeerHandle};
use crate::detection::stimulus::StimulusKind;
use crate::detection::systems::adapters::{EcsCombat, EcsMobility, StateEntryBuffer};
use crate::detection::systems::index::StimulusIndex;
use crate::profile::DetectionProfile;
use crate::DeterministicRng;

pub type DetectionAgentQuery = (
    Entity,
    &'static mut DetectionAgent,
    &'static DetectionProfile,
    &'static mut Transform,
    &'static mut TaskActivity,
    &'static mut MovementCommand,
    Option<&'static mut NavigationState>,
    Option<&'static mut Engagement>,
    Has<Incapacitated>,
);

/// Живые агенты (труп больше не тикает)
pub type LiveAgents<'w, 's> = Query<'w, 's, DetectionAgentQuery, Without<Corpse>>;

pub fn run_detection_tick(
    mut agents: LiveAgents,
    index: Res<StimulusIndex>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
    mut entered_events: EventWriter<DetectionStateEntered>,
    mut propagated_events: EventWriter<AlertPropagated>,
) {
    let delta = time.delta_secs();

    let mut order: Vec<Entity> = agents.iter().map(|item| item.0).collect();
    order.sort();

    for &entity in &order {
        let Some(broadcast) = tick_agent(
            entity,
            &mut agents,
            &index,
            &mut rng.rng,
            delta,
            &mut entered_events,
        ) else {
            continue;
        };

        propagate_alert(&broadcast, &mut agents, &index, &mut propagated_events);
    }
}

fn tick_agent(
    entity: Entity,
    agents: &mut LiveAgents,
    index: &StimulusIndex,
    rng: &mut ChaCha8Rng,
    delta: f32,
    entered_events: &mut EventWriter<DetectionStateEntered>,
) -> Option<AlertBroadcast> {
    let Ok((_, mut agent, profile, mut transform, mut task, mut command, mut navigation, mut engagement, incapacitated)) =
        agents.get_mut(entity)
    else {
        return None;
    };

    let position = transform.translation;
    agent.in_smoke = index.inside_smoke(position);

    let mut mobility = EcsMobility {
        position,
        command: &mut command,
        navigation: navigation.as_deref_mut(),
        sight: index,
    };
    let mut combat = engagement.as_deref_mut().map(|engagement| EcsCombat {
        position,
        engagement,
        opponent: index.nearest(StimulusKind::Target, position),
    });
    let mut presentation = StateEntryBuffer::default();

    let mut builder = AgentServices::builder()
        .world(index)
        .task(&mut *task)
        .mobility(&mut mobility)
        .presentation(&mut presentation);
    if let Some(combat) = combat.as_mut() {
        builder = builder.combat(combat);
    }
    let mut services = match builder.build() {
        Ok(services) => services,
        Err(err) => {
            crate::logger::log_error(&format!("❌ {:?}: {}", entity, err));
            return None;
        }
    };

    let mut pose = AgentPose::from_transform(&transform);
    let report = agent.tick(
        profile,
        &mut pose,
        &mut services,
        rng,
        TickContext {
            entity,
            delta,
            can_perceive: !incapacitated,
        },
    );
    drop(services);

    if transform.rotation != pose.rotation {
        transform.rotation = pose.rotation;
    }

    for state in presentation.entered.drain(..) {
        entered_events.write(DetectionStateEntered {
            agent: entity,
            from: agent.previous_state,
            to: state,
        });
    }

    report.broadcast
}

fn propagate_alert(
    broadcast: &AlertBroadcast,
    agents: &mut LiveAgents,
    index: &StimulusIndex,
    propagated_events: &mut EventWriter<AlertPropagated>,
) {
    let mut rows: Vec<_> = agents
        .iter_mut()
        .map(|(entity, agent, profile, transform, _, command, navigation, _, _)| {
            let position = transform.translation;
            let mobility = EcsMobility {
                position,
                command: command.into_inner(),
                navigation: navigation.map(Mut::into_inner),
                sight: index,
            };
            (entity, position, agent.into_inner(), profile, mobility)
        })
        .collect();

    let peers = rows
        .iter_mut()
        .map(|(entity, position, agent, profile, mobility)| PeerHandle {
            entity: *entity,
            position: *position,
            alive: true,
            agent: &mut **agent,
            profile: *profile,
            mobility: Some(mobility as &mut dyn Mobility),
        });

    for peer in AlertPropagator::propagate(broadcast, peers) {
        propagated_events.write(AlertPropagated {
            source: broadcast.source,
            peer,
            transfer: broadcast.transfer,
        });
    }
}
