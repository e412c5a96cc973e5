//! Внешние collaborators детекции
//!
//! Движение, презентация, задачи, бой и пространственные запросы живут у
//! хоста. Detection видит их только через эти trait'ы, собранные в
//! `AgentServices` на один tick.

use bevy::prelude::*;

use crate::detection::components::DetectionState;
use crate::detection::stimulus::{SensedEntity, StimulusKind};
use crate::error::{DetectionError, Result};

pub trait Mobility {
    fn move_to(&mut self, position: Vec3);
    fn stop_movement(&mut self);
    fn has_reached_destination(&self) -> bool;
    fn has_line_of_sight(&self, from: Vec3, point: Vec3) -> bool;
    fn remaining_distance(&self) -> f32;
}

/// Fire-and-forget: звук/анимация/иконка состояния
pub trait Presentation {
    fn on_state_entered(&mut self, state: DetectionState);
}

pub trait TaskControl {
    fn pause(&mut self);
    fn resume(&mut self);
}

pub trait Combat {
    fn is_in_engagement_range(&self) -> bool;
    fn enter_engagement(&mut self);
    fn exit_engagement(&mut self);
    fn opponent_position(&self) -> Option<Vec3>;
}

pub trait WorldQuery {
    /// Все кандидаты вида `kind` в сфере `radius` вокруг `origin`
    fn find_entities(&self, kind: StimulusKind, radius: f32, origin: Vec3) -> Vec<SensedEntity>;
}

/// Collaborators одного агента на один tick
///
/// World query и task control обязательны (проверяются в builder'е),
/// остальное опционально: отсутствие = capability выключена.
pub struct AgentServices<'a> {
    world: &'a dyn WorldQuery,
    task: &'a mut dyn TaskControl,
    mobility: Option<&'a mut dyn Mobility>,
    presentation: Option<&'a mut dyn Presentation>,
    combat: Option<&'a mut dyn Combat>,
}

impl<'a> AgentServices<'a> {
    pub fn builder() -> AgentServicesBuilder<'a> {
        AgentServicesBuilder::default()
    }

    pub fn world(&self) -> &'a dyn WorldQuery {
        self.world
    }

    pub fn task(&mut self) -> &mut (dyn TaskControl + 'a) {
        &mut *self.task
    }

    pub fn mobility(&mut self) -> Option<&mut (dyn Mobility + 'a)> {
        self.mobility.as_deref_mut()
    }

    pub fn mobility_ref(&self) -> Option<&(dyn Mobility + 'a)> {
        self.mobility.as_deref()
    }

    pub fn presentation(&mut self) -> Option<&mut (dyn Presentation + 'a)> {
        self.presentation.as_deref_mut()
    }

    pub fn combat(&mut self) -> Option<&mut (dyn Combat + 'a)> {
        self.combat.as_deref_mut()
    }

    pub fn combat_ref(&self) -> Option<&(dyn Combat + 'a)> {
        self.combat.as_deref()
    }
}

#[derive(Default)]
pub struct AgentServicesBuilder<'a> {
    world: Option<&'a dyn WorldQuery>,
    task: Option<&'a mut dyn TaskControl>,
    mobility: Option<&'a mut dyn Mobility>,
    presentation: Option<&'a mut dyn Presentation>,
    combat: Option<&'a mut dyn Combat>,
}

impl<'a> AgentServicesBuilder<'a> {
    pub fn world(mut self, world: &'a dyn WorldQuery) -> Self {
        self.world = Some(world);
        self
    }

    pub fn task(mut self, task: &'a mut dyn TaskControl) -> Self {
        self.task = Some(task);
        self
    }

    pub fn mobility(mut self, mobility: &'a mut dyn Mobility) -> Self {
        self.mobility = Some(mobility);
        self
    }

    pub fn presentation(mut self, presentation: &'a mut dyn Presentation) -> Self {
        self.presentation = Some(presentation);
        self
    }

    pub fn combat(mut self, combat: &'a mut dyn Combat) -> Self {
        self.combat = Some(combat);
        self
    }

    pub fn build(self) -> Result<AgentServices<'a>> {
        let world = self
            .world
            .ok_or(DetectionError::MissingCollaborator("world query"))?;
        let task = self
            .task
            .ok_or(DetectionError::MissingCollaborator("task control"))?;

        Ok(AgentServices {
            world,
            task,
            mobility: self.mobility,
            presentation: self.presentation,
            combat: self.combat,
        })
    }
}
