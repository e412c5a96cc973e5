//! Статусы агента, которыми владеет хост

use bevy::prelude::*;

use crate::detection::collaborators::TaskControl;

/// Текущая рутинная задача агента (патруль, работа и т.п.)
///
/// Detection только ставит её на паузу и возобновляет.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct TaskActivity {
    pub paused: bool,
}

impl TaskControl for TaskActivity {
    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }
}

/// Ближний бой: агент с этим компонентом умеет входить в engagement
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Engagement {
    /// Дистанция до противника, на которой начинается бой (метры)
    pub proximity: f32,
    /// Combat mode хоста
    pub engaged: bool,
}

impl Default for Engagement {
    fn default() -> Self {
        Self {
            proximity: 5.5,
            engaged: false,
        }
    }
}

/// Оглушён / душат: perception выключен, пока `remaining > 0`
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Incapacitated {
    pub remaining: f32,
}
