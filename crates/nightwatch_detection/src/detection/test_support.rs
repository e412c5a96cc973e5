//! Fake collaborators для unit тестов detection

use bevy::prelude::*;

use crate::detection::collaborators::{Combat, Mobility, Presentation, WorldQuery};
use crate::detection::components::DetectionState;
use crate::detection::stimulus::{SensedEntity, StimulusKind};

#[derive(Default)]
pub struct FakeWorld {
    pub entries: Vec<(StimulusKind, SensedEntity)>,
}

impl FakeWorld {
    pub fn with(mut self, kind: StimulusKind, sensed: SensedEntity) -> Self {
        self.entries.push((kind, sensed));
        self
    }
}

impl WorldQuery for FakeWorld {
    fn find_entities(&self, kind: StimulusKind, radius: f32, origin: Vec3) -> Vec<SensedEntity> {
        self.entries
            .iter()
            .filter(|(k, sensed)| *k == kind && sensed.position.distance(origin) <= radius)
            .map(|(_, sensed)| *sensed)
            .collect()
    }
}

#[derive(Default)]
pub struct FakeMobility {
    pub destination: Option<Vec3>,
    pub stops: usize,
    pub reached: bool,
    pub blocked: bool,
}

impl Mobility for FakeMobility {
    fn move_to(&mut self, position: Vec3) {
        self.destination = Some(position);
    }

    fn stop_movement(&mut self) {
        self.stops += 1;
        self.destination = None;
    }

    fn has_reached_destination(&self) -> bool {
        self.reached
    }

    fn has_line_of_sight(&self, _from: Vec3, _point: Vec3) -> bool {
        !self.blocked
    }

    fn remaining_distance(&self) -> f32 {
        if self.reached {
            0.0
        } else {
            10.0
        }
    }
}

#[derive(Default)]
pub struct FakePresentation {
    pub entered: Vec<DetectionState>,
}

impl Presentation for FakePresentation {
    fn on_state_entered(&mut self, state: DetectionState) {
        self.entered.push(state);
    }
}

#[derive(Default)]
pub struct FakeCombat {
    pub in_range: bool,
    pub engaged: bool,
    pub opponent: Option<Vec3>,
    pub exits: usize,
}

impl Combat for FakeCombat {
    fn is_in_engagement_range(&self) -> bool {
        self.in_range
    }

    fn enter_engagement(&mut self) {
        self.engaged = true;
    }

    fn exit_engagement(&mut self) {
        self.engaged = false;
        self.exits += 1;
    }

    fn opponent_position(&self) -> Option<Vec3> {
        self.opponent
    }
}

/// Набор fake collaborators + детерминированный RNG
pub struct Harness {
    pub world: FakeWorld,
    pub task: crate::components::TaskActivity,
    pub mobility: FakeMobility,
    pub presentation: FakePresentation,
    pub combat: FakeCombat,
    pub rng: rand_chacha::ChaCha8Rng,
    pub with_mobility: bool,
    pub with_combat: bool,
}

impl Harness {
    pub fn new() -> Self {
        use rand::SeedableRng;

        Self {
            world: FakeWorld::default(),
            task: Default::default(),
            mobility: FakeMobility::default(),
            presentation: FakePresentation::default(),
            combat: FakeCombat::default(),
            rng: rand_chacha::ChaCha8Rng::seed_from_u64(42),
            with_mobility: true,
            with_combat: false,
        }
    }

    pub fn split(&mut self) -> (crate::detection::collaborators::AgentServices<'_>, &mut rand_chacha::ChaCha8Rng) {
        let mut builder = crate::detection::collaborators::AgentServices::builder()
            .world(&self.world)
            .task(&mut self.task)
            .presentation(&mut self.presentation);
        if self.with_mobility {
            builder = builder.mobility(&mut self.mobility);
        }
        if self.with_combat {
            builder = builder.combat(&mut self.combat);
        }
        (builder.build().unwrap(), &mut self.rng)
    }
}
