//! Один detection tick агента: Sample → Accumulate → Classify → Propagate(plan)

use bevy::prelude::*;
use rand::Rng;

use crate::detection::collaborators::AgentServices;
use crate::detection::components::DetectionAgent;
use crate::detection::perception::{AgentPose, PerceptionSampler};
use crate::detection::propagation::AlertBroadcast;
use crate::detection::state_machine::{StateMachine, StateTransition};
use crate::detection::stimulus::StimulusEvent;
use crate::detection::suspicion::{Accumulation, SuspicionAccumulator};
use crate::profile::DetectionProfile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub entity: Entity,
    pub delta: f32,
    /// false пока агент оглушён: ни восприятия, ни накопления, ни спада
    pub can_perceive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub stimuli: Vec<StimulusEvent>,
    pub accumulation: Accumulation,
    pub transition: Option<StateTransition>,
    /// Propagation для применения к peer'ам (делает вызывающий)
    pub broadcast: Option<AlertBroadcast>,
}

impl DetectionAgent {
    pub fn tick<R: Rng>(
        &mut self,
        profile: &DetectionProfile,
        pose: &mut AgentPose,
        services: &mut AgentServices<'_>,
        rng: &mut R,
        ctx: TickContext,
    ) -> TickReport {
        let (stimuli, accumulation) = if ctx.can_perceive {
            let stimuli = PerceptionSampler::sample(self, profile, pose, services);
            let accumulation = SuspicionAccumulator::accumulate(self, profile, &stimuli, ctx.delta);
            PerceptionSampler::commit_corpses(self, profile, &stimuli);
            (stimuli, accumulation)
        } else {
            self.target_visible = false;
            self.corpse_visible = false;
            self.smoke_exposed = false;
            (Vec::new(), Accumulation::Held)
        };

        let transition = StateMachine::evaluate(
            self,
            profile,
            pose,
            services,
            rng,
            ctx.delta,
            ctx.can_perceive,
        );
        let broadcast = AlertBroadcast::from_source(ctx.entity, self, profile, pose.position);

        TickReport {
            stimuli,
            accumulation,
            transition,
            broadcast,
        }
    }
}
