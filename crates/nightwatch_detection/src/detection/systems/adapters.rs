//! ECS реализации collaborators поверх компонентов хоста

use bevy::prelude::*;

use crate::components::{Engagement, MovementCommand, NavigationState};
use crate::detection::collaborators::{Combat, Mobility, Presentation};
use crate::detection::components::DetectionState;
use crate::detection::systems::index::StimulusIndex;

/// Mobility: пишет MovementCommand, читает NavigationState,
/// линия видимости через StimulusIndex
pub struct EcsMobility<'a> {
    pub position: Vec3,
    pub command: &'a mut MovementCommand,
    pub navigation: Option<&'a mut NavigationState>,
    pub sight: &'a StimulusIndex,
}

impl Mobility for EcsMobility<'_> {
    fn move_to(&mut self, position: Vec3) {
        let next = MovementCommand::MoveToPosition { target: position };
        if *self.command == next {
            return;
        }
        *self.command = next;
        if let Some(navigation) = self.navigation.as_deref_mut() {
            navigation.is_target_reached = false;
        }
    }

    fn stop_movement(&mut self) {
        *self.command = MovementCommand::Stop;
    }

    fn has_reached_destination(&self) -> bool {
        self.navigation
            .as_deref()
            .is_some_and(|navigation| navigation.is_target_reached)
    }

    fn has_line_of_sight(&self, from: Vec3, point: Vec3) -> bool {
        self.sight.line_of_sight(from, point)
    }

    fn remaining_distance(&self) -> f32 {
        match &*self.command {
            MovementCommand::MoveToPosition { target } => self.position.distance(*target),
            MovementCommand::Idle | MovementCommand::Stop => 0.0,
        }
    }
}

/// Presentation: копит переходы, система потом пишет их в DetectionStateEntered
#[derive(Debug, Default)]
pub struct StateEntryBuffer {
    pub entered: Vec<DetectionState>,
}

impl Presentation for StateEntryBuffer {
    fn on_state_entered(&mut self, state: DetectionState) {
        self.entered.push(state);
    }
}

/// Combat: engagement по дистанции до ближайшей цели
pub struct EcsCombat<'a> {
    pub position: Vec3,
    pub engagement: &'a mut Engagement,
    pub opponent: Option<Vec3>,
}

impl Combat for EcsCombat<'_> {
    fn is_in_engagement_range(&self) -> bool {
        self.opponent
            .is_some_and(|opponent| self.position.distance(opponent) <= self.engagement.proximity)
    }

    fn enter_engagement(&mut self) {
        self.engagement.engaged = true;
    }

    fn exit_engagement(&mut self) {
        self.engagement.engaged = false;
    }

    fn opponent_position(&self) -> Option<Vec3> {
        self.opponent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_to_resets_navigation_only_on_new_target() {
        let index = StimulusIndex::default();
        let mut command = MovementCommand::Idle;
        let mut navigation = NavigationState {
            is_target_reached: true,
        };
        let target = Vec3::new(4.0, 0.0, 0.0);

        {
            let mut mobility = EcsMobility {
                position: Vec3::ZERO,
                command: &mut command,
                navigation: Some(&mut navigation),
                sight: &index,
            };
            mobility.move_to(target);
            assert!(!mobility.has_reached_destination());
            assert_eq!(mobility.remaining_distance(), 4.0);
        }
        assert_eq!(command, MovementCommand::MoveToPosition { target });

        navigation.is_target_reached = true;
        let mut mobility = EcsMobility {
            position: target,
            command: &mut command,
            navigation: Some(&mut navigation),
            sight: &index,
        };
        mobility.move_to(target);
        assert!(mobility.has_reached_destination());
    }

    #[test]
    fn test_combat_range_uses_proximity() {
        let mut engagement = Engagement::default();
        let mut combat = EcsCombat {
            position: Vec3::ZERO,
            engagement: &mut engagement,
            opponent: Some(Vec3::new(5.0, 0.0, 0.0)),
        };
        assert!(combat.is_in_engagement_range());

        combat.opponent = Some(Vec3::new(6.0, 0.0, 0.0));
        assert!(!combat.is_in_engagement_range());

        combat.enter_engagement();
        assert!(engagement.engaged);
    }
}
