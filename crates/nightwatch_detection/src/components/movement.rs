//! Movement компоненты: команды перемещения, навигация, скорость

use bevy::prelude::*;

/// Команда движения для агента (исполняет хост: NavigationAgent, steering и т.п.)
///
/// Detection пишет только high-level intent, физику и pathfinding не трогает.
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub enum MovementCommand {
    /// Стоять на месте (target не трогаем)
    #[default]
    Idle,
    /// Двигаться к позиции (world coordinates)
    MoveToPosition { target: Vec3 },
    /// Остановиться немедленно
    Stop,
}

/// Состояние навигации агента
///
/// - `is_target_reached` выставляет хост, когда агент дошёл до target
/// - Сбрасываем флаг при новом MoveToPosition target
/// - Idle/Stop флаг не трогают
#[derive(Component, Default, Clone, Debug)]
pub struct NavigationState {
    pub is_target_reached: bool,
}

/// Скорость движения/поворота агента с учётом detection множителей
///
/// `speed`/`turn_rate` пересчитываются из `DetectionAgent` каждый tick,
/// хост читает их вместо базовых значений.
#[derive(Component, Clone, Copy, Debug)]
pub struct Locomotion {
    /// м/сек без множителей
    pub base_speed: f32,
    pub speed: f32,
    /// градусы/сек
    pub turn_rate: f32,
}

impl Default for Locomotion {
    fn default() -> Self {
        Self {
            base_speed: 2.0, // 2 m/s: шаг патруля
            speed: 2.0,
            turn_rate: 120.0,
        }
    }
}
