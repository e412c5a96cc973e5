//! DetectionAgent: suspicion meter + alert state одного агента

use bevy::prelude::*;
use std::collections::BTreeSet;

use crate::components::{Locomotion, MovementCommand, NavigationState, TaskActivity};
use crate::profile::{DetectionProfile, Thresholds};

/// Дискретное состояние тревоги
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum DetectionState {
    #[default]
    Normal,
    Aware,
    Investigating,
    Alerted,
}

impl DetectionState {
    pub fn label(&self) -> &'static str {
        match self {
            DetectionState::Normal => "Normal",
            DetectionState::Aware => "Aware",
            DetectionState::Investigating => "Investigating",
            DetectionState::Alerted => "Alerted",
        }
    }
}

/// Alert window: пока идёт, suspicion прибит к alert порогу
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct AlertWindow {
    /// "Fully alert": окно идёт прямо сейчас
    pub active: bool,
    /// Пауза накопления/спада suspicion
    pub paused: bool,
    pub timer: f32,
}

/// Look-around sub-state: поворот к случайному yaw на месте
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct LookAround {
    pub target: Quat,
}

/// Gate для Alerted: дым без подтверждения (цель/труп) держит в Investigating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertGate {
    pub smoke_exposed: bool,
    pub target_visible: bool,
    pub corpse_visible: bool,
}

impl AlertGate {
    pub fn is_open(&self) -> bool {
        !self.smoke_exposed || self.target_visible || self.corpse_visible
    }
}

/// Флаги, от которых зависят радиус и углы сенсора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorState {
    pub state: DetectionState,
    pub has_permanent_buffs: bool,
    pub alert_window_active: bool,
    pub in_smoke: bool,
}

impl SensorState {
    /// Buffs не складываются с alert window
    pub fn buffs_apply(&self) -> bool {
        self.has_permanent_buffs && !self.alert_window_active
    }
}

/// Detection агент (охранник)
///
/// Required components дают хосту готовый набор при spawn:
/// профиль, задачу, movement intent и навигацию.
#[derive(Component, Debug, Clone, PartialEq)]
#[require(
    DetectionProfile,
    TaskActivity,
    MovementCommand,
    NavigationState,
    Locomotion,
    Transform
)]
pub struct DetectionAgent {
    /// 0 ≤ suspicion ≤ alert threshold
    pub suspicion: f32,
    pub current_state: DetectionState,
    pub previous_state: DetectionState,
    pub alert_window: AlertWindow,
    /// Latch: ставится при естественном конце alert window, сам не сбрасывается
    pub has_permanent_buffs: bool,

    pub out_of_sight_timer: f32,
    pub noise_heard_timer: f32,
    pub investigate_idle_timer: f32,
    pub last_known_target_position: Vec3,
    /// BTreeSet: стабильный порядок для snapshot'ов
    pub corpses_seen: BTreeSet<Entity>,

    // Пересчитываются PerceptionSampler каждый tick
    pub target_visible: bool,
    pub corpse_visible: bool,
    pub smoke_exposed: bool,

    /// Сам агент стоит в дыму
    pub in_smoke: bool,
    pub engaged: bool,
    pub engagement_exit_timer: f32,
    pub look_around: Option<LookAround>,
    pub speed_multiplier: f32,
    pub rotation_multiplier: f32,
}

impl Default for DetectionAgent {
    fn default() -> Self {
        Self {
            suspicion: 0.0,
            current_state: DetectionState::Normal,
            previous_state: DetectionState::Normal,
            alert_window: AlertWindow::default(),
            has_permanent_buffs: false,
            out_of_sight_timer: 0.0,
            noise_heard_timer: 0.0,
            investigate_idle_timer: 0.0,
            last_known_target_position: Vec3::ZERO,
            corpses_seen: BTreeSet::new(),
            target_visible: false,
            corpse_visible: false,
            smoke_exposed: false,
            in_smoke: false,
            engaged: false,
            engagement_exit_timer: 0.0,
            look_around: None,
            speed_multiplier: 1.0,
            rotation_multiplier: 1.0,
        }
    }
}

impl DetectionAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensor_state(&self) -> SensorState {
        SensorState {
            state: self.current_state,
            has_permanent_buffs: self.has_permanent_buffs,
            alert_window_active: self.alert_window.active,
            in_smoke: self.in_smoke,
        }
    }

    pub fn alert_gate(&self) -> AlertGate {
        AlertGate {
            smoke_exposed: self.smoke_exposed,
            target_visible: self.target_visible,
            corpse_visible: self.corpse_visible,
        }
    }

    pub fn is_at_alert(&self, thresholds: &Thresholds) -> bool {
        self.suspicion >= thresholds.alert
    }

    pub fn has_seen_corpse(&self, corpse: Entity) -> bool {
        self.corpses_seen.contains(&corpse)
    }

    /// Внешний сброс (скриптовая сцена, новый уровень)
    pub fn clear_corpses_seen(&mut self) {
        self.corpses_seen.clear();
    }

    /// Единственный способ снять permanent buffs
    pub fn reset_permanent_buffs(&mut self) {
        self.has_permanent_buffs = false;
    }
}
